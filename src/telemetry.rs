use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging. The env filter honors `RUST_LOG`,
/// falling back to the configured level.
pub fn init_telemetry(log_level: &str, json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json_logs {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }

    tracing::debug!("Telemetry initialized");
    Ok(())
}

/// Span wrapping one workflow operation, so every store write and
/// notification it causes carries the same context.
pub fn operation_span(operation: &str, project_id: &str, actor: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow_operation",
        operation = operation,
        project.id = project_id,
        actor = actor,
    )
}

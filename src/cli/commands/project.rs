use anyhow::Result;
use tracing::Instrument;

use super::build_service;
use crate::config::AlurkerjaConfig;
use crate::engine::{MarkOutcome, OverrideRequest};
use crate::project::Project;
use crate::telemetry::operation_span;

pub async fn new_project_command(
    config: &AlurkerjaConfig,
    name: &str,
    workflow: &str,
    user: &str,
) -> Result<()> {
    let service = build_service(config)?;
    let project = service.create_project(name, workflow, user).await?;
    println!("✅ Project created: {}", project.id);
    print_summary(&project);
    Ok(())
}

pub async fn status_command(config: &AlurkerjaConfig, project: Option<String>) -> Result<()> {
    let service = build_service(config)?;
    match project {
        Some(id) => {
            let project = service.get_project(&id).await?;
            print_summary(&project);
            if !project.division_completions.is_empty() {
                println!(
                    "   divisions done: {}",
                    project
                        .division_completions
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            if !project.history.is_empty() {
                println!("   history:");
                for entry in &project.history {
                    println!(
                        "     {} {:?} '{}' by {} ({}){}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.kind,
                        entry.action,
                        entry.actor,
                        entry.role,
                        entry
                            .note
                            .as_deref()
                            .map(|n| format!(" — {}", n))
                            .unwrap_or_default()
                    );
                }
            }
        }
        None => {
            let projects = service.list_projects().await?;
            if projects.is_empty() {
                println!("No projects. Create one with 'alurkerja new-project'.");
                return Ok(());
            }
            for project in projects {
                println!(
                    "{}  {}  [{}] {} ({}%)",
                    project.id,
                    project.name,
                    project.assigned_division,
                    project.status,
                    project.progress
                );
            }
        }
    }
    Ok(())
}

pub async fn actions_command(config: &AlurkerjaConfig, project: &str, user: &str) -> Result<()> {
    let service = build_service(config)?;
    let actions = service.eligible_actions(project, user).await?;
    if actions.is_empty() {
        println!("No actions available for {} on this project.", user);
    } else {
        for action in actions {
            println!("{}", action);
        }
    }
    Ok(())
}

pub async fn advance_command(
    config: &AlurkerjaConfig,
    project: &str,
    action: &str,
    user: &str,
    note: Option<String>,
) -> Result<()> {
    let service = build_service(config)?;
    let project = service
        .advance(project, action, user, note)
        .instrument(operation_span("advance", project, user))
        .await?;
    println!("✅ Action '{}' fired", action);
    print_summary(&project);
    Ok(())
}

pub async fn complete_command(
    config: &AlurkerjaConfig,
    project: &str,
    division: &str,
    user: &str,
) -> Result<()> {
    let service = build_service(config)?;
    let (project, outcome) = service
        .mark_division_complete(project, division, user)
        .instrument(operation_span("mark_division_complete", project, user))
        .await?;
    match outcome {
        MarkOutcome::AlreadyRecorded => {
            println!("'{}' had already reported; nothing changed.", division)
        }
        MarkOutcome::Recorded { remaining } => println!(
            "✅ '{}' recorded; waiting on {} more division(s).",
            division, remaining
        ),
        MarkOutcome::Transitioned { .. } => {
            println!("✅ '{}' recorded; all divisions done, step advanced.", division)
        }
    }
    print_summary(&project);
    Ok(())
}

pub async fn revise_command(
    config: &AlurkerjaConfig,
    project: &str,
    user: &str,
    note: &str,
) -> Result<()> {
    let service = build_service(config)?;
    let project = service
        .revise(project, user, note)
        .instrument(operation_span("revise", project, user))
        .await?;
    println!("↩️  Project rolled back for revision");
    print_summary(&project);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn override_command(
    config: &AlurkerjaConfig,
    project: &str,
    status: String,
    division: String,
    progress: u8,
    next_action: Option<String>,
    user: &str,
    reason: &str,
) -> Result<()> {
    let service = build_service(config)?;
    let request = OverrideRequest {
        status,
        assigned_division: division,
        next_action,
        progress,
    };
    let project = service
        .manual_override(project, request, user, reason)
        .instrument(operation_span("manual_override", project, user))
        .await?;
    println!("⚠️  Manual override applied");
    print_summary(&project);
    Ok(())
}

fn print_summary(project: &Project) {
    println!(
        "   {} — status '{}', division '{}', progress {}%",
        project.name, project.status, project.assigned_division, project.progress
    );
    if let Some(next) = &project.next_action {
        println!("   next: {}", next);
    }
}

use anyhow::{Context, Result};

use super::build_service;
use crate::config::AlurkerjaConfig;
use crate::workflow::{validation, Workflow};

async fn read_definition(file: &str) -> Result<Workflow> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading workflow file '{}'", file))?;
    let workflow: Workflow =
        serde_json::from_str(&contents).with_context(|| format!("parsing '{}'", file))?;
    Ok(workflow)
}

pub async fn validate_command(file: &str) -> Result<()> {
    let workflow = read_definition(file).await?;
    validation::validate(&workflow)?;
    println!(
        "✅ '{}' is valid: {} steps, {} terminal",
        workflow.id,
        workflow.steps.len(),
        workflow.steps.iter().filter(|s| s.is_terminal()).count()
    );
    Ok(())
}

pub async fn add_command(config: &AlurkerjaConfig, file: &str) -> Result<()> {
    let service = build_service(config)?;
    let workflow = read_definition(file).await?;
    service.catalog().save(&workflow).await?;
    println!("✅ Workflow '{}' added to the catalog", workflow.id);
    Ok(())
}

pub async fn list_command(config: &AlurkerjaConfig) -> Result<()> {
    let service = build_service(config)?;
    let workflows = service.catalog().list().await?;
    if workflows.is_empty() {
        println!("No workflow definitions. Add one with 'alurkerja workflow add <file>'.");
        return Ok(());
    }
    for workflow in workflows {
        println!(
            "{}  {}  ({} steps)",
            workflow.id,
            workflow.name,
            workflow.steps.len()
        );
    }
    Ok(())
}

pub async fn remove_command(config: &AlurkerjaConfig, id: &str) -> Result<()> {
    let service = build_service(config)?;
    service.catalog().delete(id, service.store()).await?;
    println!("✅ Workflow '{}' removed", id);
    Ok(())
}

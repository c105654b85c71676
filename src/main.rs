use anyhow::Result;
use clap::Parser;

use alurkerja::cli::{commands, Cli, Commands, WorkflowCommands};
use alurkerja::config::AlurkerjaConfig;
use alurkerja::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    AlurkerjaConfig::load_env_file().ok();
    let config = AlurkerjaConfig::load()?;
    init_telemetry(
        &config.observability.log_level,
        config.observability.json_logs,
    )?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Init { force } => commands::init::init_command(force).await,
            Commands::NewProject {
                name,
                workflow,
                user,
            } => commands::project::new_project_command(&config, &name, &workflow, &user).await,
            Commands::Status { project } => {
                commands::project::status_command(&config, project).await
            }
            Commands::Actions { project, user } => {
                commands::project::actions_command(&config, &project, &user).await
            }
            Commands::Advance {
                project,
                action,
                user,
                note,
            } => commands::project::advance_command(&config, &project, &action, &user, note).await,
            Commands::Complete {
                project,
                division,
                user,
            } => commands::project::complete_command(&config, &project, &division, &user).await,
            Commands::Revise {
                project,
                user,
                note,
            } => commands::project::revise_command(&config, &project, &user, &note).await,
            Commands::Override {
                project,
                status,
                division,
                progress,
                next_action,
                user,
                reason,
            } => {
                commands::project::override_command(
                    &config,
                    &project,
                    status,
                    division,
                    progress,
                    next_action,
                    &user,
                    &reason,
                )
                .await
            }
            Commands::Workflow { action } => match action {
                WorkflowCommands::Validate { file } => {
                    commands::workflow::validate_command(&file).await
                }
                WorkflowCommands::Add { file } => {
                    commands::workflow::add_command(&config, &file).await
                }
                WorkflowCommands::List => commands::workflow::list_command(&config).await,
                WorkflowCommands::Remove { id } => {
                    commands::workflow::remove_command(&config, &id).await
                }
            },
        }
    })
}

use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "alurkerja")]
#[command(about = "Config-driven project workflow engine over a JSON-file store")]
#[command(long_about = "Alurkerja moves projects through admin-defined multi-step workflows: \
                        each step belongs to a division, exposes a set of actions, and fires \
                        notifications on hand-off. Get started with 'alurkerja init'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory, default config and a starter workflow
    Init {
        /// Force initialization, overwriting existing configuration
        #[arg(long, help = "Overwrite an existing data directory and config")]
        force: bool,
    },
    /// Create a project on the first step of a workflow
    NewProject {
        /// Project name
        name: String,
        /// Workflow id to bind the project to
        #[arg(long)]
        workflow: String,
        /// Acting username
        #[arg(long)]
        user: String,
    },
    /// Show one project's current step and history, or list all projects
    Status {
        /// Project id; omit to list every project
        project: Option<String>,
    },
    /// List the actions the user may fire from the project's current step
    Actions {
        /// Project id
        project: String,
        /// Acting username
        #[arg(long)]
        user: String,
    },
    /// Fire a named action on a project
    Advance {
        /// Project id
        project: String,
        /// Action name, as defined in the current step's transition map
        action: String,
        /// Acting username
        #[arg(long)]
        user: String,
        /// Free-form note recorded in history
        #[arg(long)]
        note: Option<String>,
    },
    /// Report one division's portion of a parallel step as done
    Complete {
        /// Project id
        project: String,
        /// Division reporting completion
        #[arg(long)]
        division: String,
        /// Acting username
        #[arg(long)]
        user: String,
    },
    /// Roll a project back to its configured revision step
    Revise {
        /// Project id
        project: String,
        /// Acting username
        #[arg(long)]
        user: String,
        /// Reason for the revision (recorded in history)
        #[arg(long)]
        note: String,
    },
    /// Set project state directly, bypassing the transition table (admin only)
    Override {
        /// Project id
        project: String,
        /// New display status (not validated against the workflow)
        #[arg(long)]
        status: String,
        /// New owning division
        #[arg(long)]
        division: String,
        /// New progress percentage
        #[arg(long)]
        progress: u8,
        /// New next-action hint
        #[arg(long)]
        next_action: Option<String>,
        /// Acting admin username
        #[arg(long)]
        user: String,
        /// Mandatory reason, recorded in history
        #[arg(long)]
        reason: String,
    },
    /// Manage workflow definitions
    Workflow {
        #[command(subcommand)]
        action: WorkflowCommands,
    },
}

#[derive(Subcommand)]
pub enum WorkflowCommands {
    /// Validate a workflow definition file without saving it
    Validate {
        /// Path to a workflow JSON file
        file: String,
    },
    /// Validate and add a workflow definition to the catalog
    Add {
        /// Path to a workflow JSON file
        file: String,
    },
    /// List workflow definitions in the catalog
    List,
    /// Delete a workflow definition (blocked while projects use it)
    Remove {
        /// Workflow id
        id: String,
    },
}

use anyhow::Result;
use std::sync::Arc;

use crate::auth::Policy;
use crate::config::AlurkerjaConfig;
use crate::directory::FileUserDirectory;
use crate::notify::LogSink;
use crate::project::FileProjectStore;
use crate::service::ProjectService;
use crate::workflow::WorkflowCatalog;

pub mod init;
pub mod project;
pub mod workflow;

/// Wire a `ProjectService` over the configured data directory. Every
/// command goes through this; the CLI is the in-repo stand-in for the
/// external API layer.
pub fn build_service(config: &AlurkerjaConfig) -> Result<ProjectService> {
    let store = Arc::new(FileProjectStore::new(&config.data_dir));
    let directory = Arc::new(FileUserDirectory::new(&config.data_dir));
    let catalog = WorkflowCatalog::new(&config.data_dir);
    let policy = Policy::new(config.admin_roles.clone());
    Ok(ProjectService::new(
        store,
        directory,
        Arc::new(LogSink),
        catalog,
        policy,
        config.notifications.enabled,
    ))
}

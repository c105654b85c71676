use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use super::types::Project;

/// Errors from project persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("project not found: {id}")]
    NotFound { id: String },

    #[error("project already exists: {id}")]
    AlreadyExists { id: String },
}

/// Persistence boundary for project records. The engine never touches disk
/// directly; the service layer drives one load / mutate / save cycle per
/// operation through this trait.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Project, StoreError>;

    async fn save(&self, project: &Project) -> Result<(), StoreError>;

    /// Fails with `AlreadyExists` rather than overwriting.
    async fn create(&self, project: &Project) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Project>, StoreError>;

    /// Whether any stored project is bound to the given workflow. Guards
    /// workflow deletion.
    async fn any_using_workflow(&self, workflow_id: &str) -> Result<bool, StoreError>;
}

/// One pretty-printed JSON file per project under `<data_dir>/projects`.
/// Writes go through a temp file and rename so a crash mid-write never
/// leaves a truncated record.
pub struct FileProjectStore {
    dir: PathBuf,
}

impl FileProjectStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            dir: data_dir.as_ref().join("projects"),
        }
    }

    fn project_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn write_atomic(&self, project: &Project) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.project_path(&project.id);
        let serialized = serde_json::to_string_pretty(project)?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, serialized).await?;
        fs::rename(&temp, &path).await?;
        debug!(project_id = %project.id, file = ?path, "Project record written");
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for FileProjectStore {
    async fn load(&self, id: &str) -> Result<Project, StoreError> {
        let path = self.project_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        let contents = fs::read_to_string(&path).await?;
        let project = serde_json::from_str(&contents)?;
        Ok(project)
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        self.write_atomic(project).await
    }

    async fn create(&self, project: &Project) -> Result<(), StoreError> {
        if self.project_path(&project.id).exists() {
            return Err(StoreError::AlreadyExists {
                id: project.id.clone(),
            });
        }
        self.write_atomic(project).await?;
        info!(
            project_id = %project.id,
            name = %project.name,
            workflow_id = %project.workflow_id,
            "Project created"
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut projects = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            projects.push(serde_json::from_str(&contents)?);
        }
        projects.sort_by(|a: &Project, b: &Project| a.id.cmp(&b.id));
        Ok(projects)
    }

    async fn any_using_workflow(&self, workflow_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .list()
            .await?
            .iter()
            .any(|p| p.workflow_id == workflow_id))
    }
}

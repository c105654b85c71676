//! File-backed workflow catalog.
//!
//! Definitions are stored wholesale, one JSON file per workflow, and
//! validated on both load and save so the engine only ever sees
//! well-formed definitions.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use super::types::Workflow;
use super::validation::{self, ValidationError};
use crate::project::{ProjectStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("workflow not found: {id}")]
    NotFound { id: String },

    #[error("invalid workflow definition: {0}")]
    Invalid(#[from] ValidationError),

    #[error("workflow '{id}' is in use by at least one project and cannot be deleted")]
    WorkflowInUse { id: String },

    #[error("project store error: {0}")]
    Store(#[from] StoreError),
}

pub struct WorkflowCatalog {
    dir: PathBuf,
}

impl WorkflowCatalog {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            dir: data_dir.as_ref().join("workflows"),
        }
    }

    fn workflow_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    pub async fn load(&self, id: &str) -> Result<Workflow, CatalogError> {
        let path = self.workflow_path(id);
        if !path.exists() {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }
        let contents = fs::read_to_string(&path).await?;
        let workflow: Workflow = serde_json::from_str(&contents)?;
        validation::validate(&workflow)?;
        Ok(workflow)
    }

    /// Validates before writing; a definition that would dangle at runtime
    /// never lands on disk.
    pub async fn save(&self, workflow: &Workflow) -> Result<(), CatalogError> {
        validation::validate(workflow)?;
        fs::create_dir_all(&self.dir).await?;
        let path = self.workflow_path(&workflow.id);
        let serialized = serde_json::to_string_pretty(workflow)?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, serialized).await?;
        fs::rename(&temp, &path).await?;
        info!(
            workflow_id = %workflow.id,
            steps = %workflow.steps.len(),
            "Workflow definition saved"
        );
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Workflow>, CatalogError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut workflows = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Workflow>(&contents) {
                Ok(workflow) => workflows.push(workflow),
                Err(e) => {
                    warn!(file = ?path, error = %e, "Skipping unreadable workflow file");
                }
            }
        }
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workflows)
    }

    /// Delete a definition, blocked with `WorkflowInUse` while any stored
    /// project still references it.
    pub async fn delete(
        &self,
        id: &str,
        projects: &dyn ProjectStore,
    ) -> Result<(), CatalogError> {
        let path = self.workflow_path(id);
        if !path.exists() {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }
        if projects.any_using_workflow(id).await? {
            return Err(CatalogError::WorkflowInUse { id: id.to_string() });
        }
        fs::remove_file(&path).await?;
        info!(workflow_id = %id, "Workflow definition deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::FileProjectStore;
    use crate::workflow::types::{Step, Transition};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn linear_workflow(id: &str) -> Workflow {
        let mut draft = Step {
            step_name: "Draft".to_string(),
            status: "Draft".to_string(),
            assigned_division: "Arsitek".to_string(),
            progress: 10,
            next_action: None,
            transitions: BTreeMap::new(),
            revision_target: None,
            parallel: None,
        };
        draft.transitions.insert(
            "submit".to_string(),
            Transition {
                status: "Review".to_string(),
                assigned_division: "Admin".to_string(),
                next_action: None,
                progress: 50,
                notification: None,
            },
        );
        let review = Step {
            step_name: "Review".to_string(),
            status: "Review".to_string(),
            assigned_division: "Admin".to_string(),
            progress: 50,
            next_action: None,
            transitions: BTreeMap::new(),
            revision_target: None,
            parallel: None,
        };
        Workflow {
            id: id.to_string(),
            name: "Linear".to_string(),
            description: String::new(),
            steps: vec![draft, review],
        }
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = WorkflowCatalog::new(temp_dir.path());

        let workflow = linear_workflow("wf-1");
        catalog.save(&workflow).await.unwrap();
        let loaded = catalog.load("wf-1").await.unwrap();
        assert_eq!(loaded, workflow);
    }

    #[tokio::test]
    async fn save_rejects_dangling_transition() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = WorkflowCatalog::new(temp_dir.path());

        let mut workflow = linear_workflow("wf-bad");
        workflow.steps.remove(1);
        let err = catalog.save(&workflow).await.unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
        assert!(catalog.load("wf-bad").await.is_err());
    }

    #[tokio::test]
    async fn delete_blocked_while_workflow_in_use() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = WorkflowCatalog::new(temp_dir.path());
        let store = FileProjectStore::new(temp_dir.path());

        catalog.save(&linear_workflow("wf-1")).await.unwrap();

        let mut project = crate::project::Project {
            id: "p-1".to_string(),
            name: "Gedung A".to_string(),
            workflow_id: "wf-1".to_string(),
            status: "Draft".to_string(),
            assigned_division: "Arsitek".to_string(),
            progress: 10,
            next_action: None,
            current_step: 0,
            division_completions: Default::default(),
            history: vec![],
            files: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        store.create(&project).await.unwrap();

        let err = catalog.delete("wf-1", &store).await.unwrap_err();
        assert!(matches!(err, CatalogError::WorkflowInUse { .. }));

        // Rebind the project elsewhere and the delete goes through.
        project.workflow_id = "wf-other".to_string();
        store.save(&project).await.unwrap();
        catalog.delete("wf-1", &store).await.unwrap();
        assert!(matches!(
            catalog.load("wf-1").await.unwrap_err(),
            CatalogError::NotFound { .. }
        ));
    }
}

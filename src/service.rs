//! `ProjectService` is the facade the API layer (here, the CLI) talks to.
//! It owns the read-modify-write cycle for each operation: resolve the
//! acting user, serialize access to the project, load the record and its
//! workflow, run the engine, persist, and hand notifications to the sink.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::auth::Policy;
use crate::directory::{DirectoryError, UserDirectory};
use crate::engine::{EngineError, MarkOutcome, OverrideRequest, WorkflowEngine};
use crate::notify::NotificationSink;
use crate::project::{HistoryKind, Project, ProjectStore, StoreError, User};
use crate::workflow::{CatalogError, WorkflowCatalog};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("unknown user: {username}")]
    UnknownUser { username: String },
}

pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
    directory: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
    catalog: WorkflowCatalog,
    policy: Policy,
    notifications_enabled: bool,
    /// Per-project write serialization. The source this replaces had an
    /// unguarded read-modify-write race; here two operations on the same
    /// project queue up instead of clobbering each other. Entries are
    /// pruned once their last holder drops, so the map only ever holds
    /// in-flight projects.
    locks: std::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProjectService {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        directory: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
        catalog: WorkflowCatalog,
        policy: Policy,
        notifications_enabled: bool,
    ) -> Self {
        Self {
            store,
            directory,
            sink,
            catalog,
            policy,
            notifications_enabled,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, project_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the project's lock entry if nothing else is waiting on it.
    /// A strong count above one means another operation still holds a
    /// clone, so the entry stays.
    fn release(&self, project_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(project_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(project_id);
        }
    }

    async fn resolve_user(&self, username: &str) -> Result<User, ServiceError> {
        self.directory
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::UnknownUser {
                username: username.to_string(),
            })
    }

    async fn deliver(&self, notification: Option<crate::notify::Notification>) {
        let Some(notification) = notification else {
            return;
        };
        if !self.notifications_enabled {
            return;
        }
        // Delivery is best-effort: the transition is already persisted, so
        // a sink failure is logged, not surfaced.
        if let Err(e) = self.sink.deliver(&notification).await {
            warn!(
                project_id = %notification.project_id,
                error = %e,
                "Notification delivery failed"
            );
        }
    }

    /// Create a project on the first step of the given workflow.
    pub async fn create_project(
        &self,
        name: &str,
        workflow_id: &str,
        username: &str,
    ) -> Result<Project, ServiceError> {
        let user = self.resolve_user(username).await?;
        let workflow = self.catalog.load(workflow_id).await?;
        // Validation rejects empty workflows, so the first step exists.
        let first = &workflow.steps[0];

        let now = chrono::Utc::now();
        let mut project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            workflow_id: workflow_id.to_string(),
            status: first.status.clone(),
            assigned_division: first.assigned_division.clone(),
            progress: first.progress,
            next_action: first.next_action.clone(),
            current_step: 0,
            division_completions: Default::default(),
            history: vec![],
            files: vec![],
            created_at: now,
            updated_at: now,
        };
        let role = user.roles.first().cloned().unwrap_or_default();
        project.record(HistoryKind::Created, &user.username, &role, "create", None);
        self.store.create(&project).await?;
        Ok(project)
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project, ServiceError> {
        Ok(self.store.load(project_id).await?)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn advance(
        &self,
        project_id: &str,
        action: &str,
        username: &str,
        note: Option<String>,
    ) -> Result<Project, ServiceError> {
        let user = self.resolve_user(username).await?;
        let lock = self.lock_for(project_id);
        let result: Result<Project, ServiceError> = async {
            let _guard = lock.lock().await;
            let mut project = self.store.load(project_id).await?;
            let workflow = self.catalog.load(&project.workflow_id).await?;
            let engine = WorkflowEngine::new(&workflow, &self.policy);
            let notification = engine.advance(&mut project, action, &user, note)?;
            self.store.save(&project).await?;
            self.deliver(notification).await;
            Ok(project)
        }
        .await;
        drop(lock);
        self.release(project_id);
        result
    }

    pub async fn revise(
        &self,
        project_id: &str,
        username: &str,
        note: &str,
    ) -> Result<Project, ServiceError> {
        let user = self.resolve_user(username).await?;
        let lock = self.lock_for(project_id);
        let result: Result<Project, ServiceError> = async {
            let _guard = lock.lock().await;
            let mut project = self.store.load(project_id).await?;
            let workflow = self.catalog.load(&project.workflow_id).await?;
            let engine = WorkflowEngine::new(&workflow, &self.policy);
            engine.revise(&mut project, &user, note)?;
            self.store.save(&project).await?;
            Ok(project)
        }
        .await;
        drop(lock);
        self.release(project_id);
        result
    }

    pub async fn mark_division_complete(
        &self,
        project_id: &str,
        division: &str,
        username: &str,
    ) -> Result<(Project, MarkOutcome), ServiceError> {
        let user = self.resolve_user(username).await?;
        let lock = self.lock_for(project_id);
        let result: Result<(Project, MarkOutcome), ServiceError> = async {
            let _guard = lock.lock().await;
            let mut project = self.store.load(project_id).await?;
            let workflow = self.catalog.load(&project.workflow_id).await?;
            let engine = WorkflowEngine::new(&workflow, &self.policy);
            let outcome = engine.mark_division_complete(&mut project, division, &user)?;
            match outcome {
                MarkOutcome::AlreadyRecorded => {}
                _ => self.store.save(&project).await?,
            }
            if let MarkOutcome::Transitioned { ref notification } = outcome {
                self.deliver(notification.clone()).await;
            }
            Ok((project, outcome))
        }
        .await;
        drop(lock);
        self.release(project_id);
        result
    }

    /// Admin-only escape hatch. The policy gate here is the only way into
    /// the engine's unchecked write path.
    pub async fn manual_override(
        &self,
        project_id: &str,
        request: OverrideRequest,
        username: &str,
        reason: &str,
    ) -> Result<Project, ServiceError> {
        let user = self.resolve_user(username).await?;
        let role = self
            .policy
            .admin_role_of(&user)
            .filter(|_| self.policy.can_override(&user))
            .ok_or_else(|| EngineError::Unauthorized {
                username: user.username.clone(),
                action: "apply a manual override".to_string(),
            })?;
        let lock = self.lock_for(project_id);
        let result: Result<Project, ServiceError> = async {
            let _guard = lock.lock().await;
            let mut project = self.store.load(project_id).await?;
            let workflow = self.catalog.load(&project.workflow_id).await?;
            let engine = WorkflowEngine::new(&workflow, &self.policy);
            engine.apply_manual_override(&mut project, request, &user, &role, reason);
            self.store.save(&project).await?;
            Ok(project)
        }
        .await;
        drop(lock);
        self.release(project_id);
        result
    }

    pub async fn eligible_actions(
        &self,
        project_id: &str,
        username: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let user = self.resolve_user(username).await?;
        let project = self.store.load(project_id).await?;
        let workflow = self.catalog.load(&project.workflow_id).await?;
        let engine = WorkflowEngine::new(&workflow, &self.policy);
        Ok(engine.eligible_actions(&project, &user))
    }

    pub fn catalog(&self) -> &WorkflowCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn ProjectStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::FileUserDirectory;
    use crate::notify::LogSink;
    use crate::project::FileProjectStore;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ProjectService {
        ProjectService::new(
            Arc::new(FileProjectStore::new(dir.path())),
            Arc::new(FileUserDirectory::new(dir.path())),
            Arc::new(LogSink),
            WorkflowCatalog::new(dir.path()),
            Policy::new(vec!["Owner".to_string()]),
            false,
        )
    }

    #[test]
    fn lock_map_drops_entries_once_the_last_holder_releases() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let lock = service.lock_for("p-1");
        assert_eq!(service.locks.lock().unwrap().len(), 1);
        drop(lock);
        service.release("p-1");
        assert!(service.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn lock_map_keeps_entries_other_operations_still_hold() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let first = service.lock_for("p-1");
        let second = service.lock_for("p-1");
        assert!(Arc::ptr_eq(&first, &second));

        drop(second);
        service.release("p-1");
        assert_eq!(service.locks.lock().unwrap().len(), 1);

        drop(first);
        service.release("p-1");
        assert!(service.locks.lock().unwrap().is_empty());
    }
}

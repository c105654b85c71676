// Alurkerja - config-driven project workflow engine
// Projects move through admin-defined multi-step workflows across
// organizational divisions, persisted as JSON files on disk.

pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod engine;
pub mod notify;
pub mod project;
pub mod service;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use auth::Policy;
pub use config::AlurkerjaConfig;
pub use directory::{DirectoryError, FileUserDirectory, UserDirectory};
pub use engine::{EngineError, MarkOutcome, OverrideRequest, WorkflowEngine};
pub use notify::{LogSink, Notification, NotificationSink};
pub use project::{
    FileProjectStore, HistoryEntry, HistoryKind, Project, ProjectFile, ProjectStore, StoreError,
    User,
};
pub use service::{ProjectService, ServiceError};
pub use telemetry::init_telemetry;
pub use workflow::{
    CatalogError, DivisionSelector, NotificationSpec, ParallelSpec, Step, Transition,
    ValidationError, Workflow, WorkflowCatalog,
};

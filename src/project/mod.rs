pub mod store;
pub mod types;

pub use store::{FileProjectStore, ProjectStore, StoreError};
pub use types::{HistoryEntry, HistoryKind, Project, ProjectFile, User};

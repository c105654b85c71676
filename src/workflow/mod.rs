pub mod catalog;
pub mod types;
pub mod validation;

pub use catalog::{CatalogError, WorkflowCatalog};
pub use types::{DivisionSelector, NotificationSpec, ParallelSpec, Step, Transition, Workflow};
pub use validation::{validate, ValidationError};

//! Workflow names, the expected-failure set and list resolution.

mod catalog;
mod types;

pub use catalog::{builtin_workflows, BUILTIN_WORKFLOWS};
pub use types::{parse_workflows_csv, resolve_workflows, ExpectedFailureSet, WorkflowName};

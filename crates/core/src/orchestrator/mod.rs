//! Workflow orchestrator.
//!
//! Triggers CI workflows in batches and waits for them:
//! - **Dispatch**: trigger, then discover the run id by polling in-progress runs
//! - **Poll**: fetch run status at a fixed interval until completed
//! - **Schedule**: batches in sequence, workflows within a batch concurrently

mod config;
mod dispatcher;
mod poller;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use dispatcher::Dispatcher;
pub use poller::Poller;
pub use runner::WorkflowOrchestrator;
pub use types::{OrchestratorError, RunHandle, RunOutcome, RunResult, RunStatus, WorkflowError};

//! Types for the workflow orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ci_client::{CiClientError, Conclusion};
use crate::workflow::{ExpectedFailureSet, WorkflowName};

/// Errors that abort a whole orchestration before anything is dispatched.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Nothing to run.
    #[error("no workflows to run: provide WORKFLOWS_CSV, a configured list or the built-in catalogue")]
    EmptyWorkflowList,

    /// Batch size of zero.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
}

/// Per-workflow failures. These never escape the scheduler; each becomes a
/// failed [`RunResult`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The dispatch request itself failed.
    #[error("failed to dispatch {workflow}: {source}")]
    Dispatch {
        workflow: WorkflowName,
        #[source]
        source: CiClientError,
    },

    /// No in-progress run showed up after dispatching.
    #[error("no in-progress run found for {workflow} after {waited:?}")]
    RunNotFound {
        workflow: WorkflowName,
        waited: Duration,
    },

    /// The run did not complete within the configured maximum poll duration.
    #[error("run {run_id} of {workflow} still not completed after {waited:?}")]
    PollTimeout {
        workflow: WorkflowName,
        run_id: u64,
        waited: Duration,
    },
}

impl WorkflowError {
    /// Run id known at the time of failure, 0 if none was observed.
    pub fn run_id(&self) -> u64 {
        match self {
            WorkflowError::PollTimeout { run_id, .. } => *run_id,
            _ => 0,
        }
    }
}

/// A dispatched workflow whose run has been observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub workflow: WorkflowName,
    pub run_id: u64,
}

/// Report label for a finished workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Success,
    AllowedFailure,
    Failure,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::AllowedFailure => "allowed-failure",
            RunStatus::Failure => "failure",
        }
    }

    /// Whether this status counts toward the pass total.
    pub fn is_passing(&self) -> bool {
        !matches!(self, RunStatus::Failure)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub workflow: WorkflowName,
    /// Remote run id, 0 if the run was never found.
    pub run_id: u64,
    pub conclusion: Conclusion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Why the workflow failed locally (dispatch, lookup or poll timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RunResult {
    /// Synthetic failure for a workflow that could not be tracked to completion.
    pub fn failed(workflow: WorkflowName, error: &WorkflowError, duration_ms: u64) -> Self {
        Self {
            workflow,
            run_id: error.run_id(),
            conclusion: Conclusion::Failure,
            html_url: None,
            error: Some(error.to_string()),
            duration_ms,
        }
    }

    /// Classify against the expected-failure set.
    ///
    /// Anything other than success on a workflow in the set is an allowed
    /// failure, regardless of the actual conclusion.
    pub fn status(&self, expected_failures: &ExpectedFailureSet) -> RunStatus {
        if self.conclusion.is_success() {
            RunStatus::Success
        } else if expected_failures.contains(&self.workflow) {
            RunStatus::AllowedFailure
        } else {
            RunStatus::Failure
        }
    }

    pub fn passed(&self, expected_failures: &ExpectedFailureSet) -> bool {
        self.status(expected_failures).is_passing()
    }
}

/// Everything a completed orchestration produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// One entry per submitted workflow, in completion order within each batch.
    pub results: Vec<RunResult>,
    pub all_succeeded: bool,
}

impl RunOutcome {
    pub fn from_results(results: Vec<RunResult>, expected_failures: &ExpectedFailureSet) -> Self {
        let all_succeeded = results.iter().all(|r| r.passed(expected_failures));
        Self {
            results,
            all_succeeded,
        }
    }

    /// Results sorted by workflow name.
    pub fn sorted_results(&self) -> Vec<RunResult> {
        let mut sorted = self.results.clone();
        sorted.sort_by(|a, b| a.workflow.cmp(&b.workflow));
        sorted
    }
}

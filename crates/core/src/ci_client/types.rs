use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::WorkflowName;

/// Remote run status as reported by the CI backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed)
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl Conclusion {
    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Neutral => "neutral",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Stale => "stale",
            Conclusion::StartupFailure => "startup_failure",
            Conclusion::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub status: RunState,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Conclusion of a completed run; a missing value reads as `Unknown`.
    pub fn conclusion_or_unknown(&self) -> Conclusion {
        self.conclusion.unwrap_or(Conclusion::Unknown)
    }
}

/// Errors from a CI backend.
#[derive(Debug, Clone, Error)]
pub enum CiClientError {
    #[error("Connection to CI backend failed: {0}")]
    ConnectionFailed(String),

    #[error("CI backend rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("CI backend API error: {0}")]
    ApiError(String),

    #[error("Invalid response from CI backend: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// Capabilities the orchestrator needs from a CI backend.
///
/// A client is bound to a single repository.
#[async_trait]
pub trait CiClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Request a new run of `workflow` on `git_ref`. Does not return a run id.
    async fn dispatch(&self, workflow: &WorkflowName, git_ref: &str) -> Result<(), CiClientError>;

    /// Runs of `workflow` on `branch` that are currently in progress.
    async fn list_in_progress_runs(
        &self,
        workflow: &WorkflowName,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>, CiClientError>;

    /// Current state of a single run.
    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, CiClientError>;
}

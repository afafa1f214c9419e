//! Workflow dispatch and run discovery.

use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::ci_client::{CiClient, WorkflowRun};
use crate::metrics;
use crate::workflow::WorkflowName;

use super::config::OrchestratorConfig;
use super::types::{RunHandle, WorkflowError};

/// Triggers a workflow and finds the run it created.
///
/// Dispatch APIs do not return a run id, so after dispatching the run list is
/// polled for an in-progress run of the same workflow on the same branch.
pub struct Dispatcher {
    client: Arc<dyn CiClient>,
    config: OrchestratorConfig,
    git_ref: String,
    branch: String,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn CiClient>, config: OrchestratorConfig, git_ref: &str) -> Self {
        let branch = git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(git_ref)
            .to_string();

        Self {
            client,
            config,
            git_ref: git_ref.to_string(),
            branch,
        }
    }

    /// Dispatch `workflow` and wait until its run is observed in progress.
    pub async fn trigger(&self, workflow: &WorkflowName) -> Result<RunHandle, WorkflowError> {
        info!(workflow = %workflow, git_ref = %self.git_ref, "Triggering workflow");

        if let Err(source) = self.client.dispatch(workflow, &self.git_ref).await {
            metrics::DISPATCHES.with_label_values(&["error"]).inc();
            return Err(WorkflowError::Dispatch {
                workflow: workflow.clone(),
                source,
            });
        }
        metrics::DISPATCHES.with_label_values(&["ok"]).inc();

        sleep(self.config.initial_run_id_delay()).await;

        let timeout = self.config.run_id_timeout();
        let started = Instant::now();
        loop {
            match self
                .client
                .list_in_progress_runs(workflow, &self.branch)
                .await
            {
                Ok(runs) => {
                    if let Some(run) = newest(runs) {
                        info!(workflow = %workflow, run_id = run.id, "Found in-progress run");
                        return Ok(RunHandle {
                            workflow: workflow.clone(),
                            run_id: run.id,
                        });
                    }
                    debug!(workflow = %workflow, "No in-progress run yet");
                }
                Err(e) => {
                    warn!(workflow = %workflow, error = %e, "Failed to list runs");
                }
            }

            let waited = started.elapsed();
            if waited >= timeout {
                metrics::RUN_LOOKUP_TIMEOUTS.inc();
                return Err(WorkflowError::RunNotFound {
                    workflow: workflow.clone(),
                    waited,
                });
            }

            sleep(self.config.poll_run_id_interval()).await;
        }
    }
}

/// Most recently created run; highest id wins ties or missing timestamps.
fn newest(runs: Vec<WorkflowRun>) -> Option<WorkflowRun> {
    runs.into_iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}

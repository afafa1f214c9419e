//! Run status polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::ci_client::{CiClient, WorkflowRun};
use crate::metrics;

use super::types::{RunHandle, WorkflowError};

/// Polls a run until it reaches a terminal state.
///
/// Fetch errors are logged and retried at the same interval. Without a
/// `max_duration` a run that never completes is polled forever.
pub struct Poller {
    client: Arc<dyn CiClient>,
    interval: Duration,
    max_duration: Option<Duration>,
}

impl Poller {
    pub fn new(client: Arc<dyn CiClient>, interval: Duration, max_duration: Option<Duration>) -> Self {
        Self {
            client,
            interval,
            max_duration,
        }
    }

    /// Wait for the run to complete and return its final snapshot.
    pub async fn await_completion(&self, handle: &RunHandle) -> Result<WorkflowRun, WorkflowError> {
        let started = Instant::now();
        info!(workflow = %handle.workflow, run_id = handle.run_id, "Waiting for run");

        loop {
            match self.client.get_run(handle.run_id).await {
                Ok(run) if run.is_completed() => {
                    info!(
                        workflow = %handle.workflow,
                        run_id = handle.run_id,
                        conclusion = %run.conclusion_or_unknown(),
                        "Run completed"
                    );
                    return Ok(run);
                }
                Ok(run) => {
                    debug!(
                        workflow = %handle.workflow,
                        run_id = handle.run_id,
                        status = ?run.status,
                        "Run not completed yet"
                    );
                }
                Err(e) => {
                    metrics::POLL_ERRORS.inc();
                    warn!(
                        workflow = %handle.workflow,
                        run_id = handle.run_id,
                        error = %e,
                        "Failed to fetch run status, will retry"
                    );
                }
            }

            if let Some(max) = self.max_duration {
                let waited = started.elapsed();
                if waited >= max {
                    metrics::POLL_TIMEOUTS.inc();
                    return Err(WorkflowError::PollTimeout {
                        workflow: handle.workflow.clone(),
                        run_id: handle.run_id,
                        waited,
                    });
                }
            }

            sleep(self.interval).await;
        }
    }
}

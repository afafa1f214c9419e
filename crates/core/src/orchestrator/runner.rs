//! Batch scheduler.
//!
//! Drives a list of workflows through dispatch and polling:
//! - Batches: strictly sequential
//! - Workflows within a batch: concurrent on the calling task
//! - Failures: isolated per workflow, each becomes a failed result

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::ci_client::CiClient;
use crate::metrics;
use crate::workflow::{ExpectedFailureSet, WorkflowName};

use super::config::OrchestratorConfig;
use super::dispatcher::Dispatcher;
use super::poller::Poller;
use super::types::{OrchestratorError, RunOutcome, RunResult};

/// Runs workflows in batches and collects one result per workflow.
pub struct WorkflowOrchestrator {
    dispatcher: Dispatcher,
    poller: Poller,
    expected_failures: ExpectedFailureSet,
}

impl WorkflowOrchestrator {
    pub fn new(
        client: Arc<dyn CiClient>,
        config: OrchestratorConfig,
        git_ref: &str,
        expected_failures: ExpectedFailureSet,
    ) -> Self {
        let poller = Poller::new(
            Arc::clone(&client),
            config.poll_status_interval(),
            config.max_poll_duration(),
        );
        let dispatcher = Dispatcher::new(client, config, git_ref);

        Self {
            dispatcher,
            poller,
            expected_failures,
        }
    }

    pub fn expected_failures(&self) -> &ExpectedFailureSet {
        &self.expected_failures
    }

    /// Run every workflow, `batch_size` at a time.
    ///
    /// Only configuration problems are returned as errors, and they are
    /// detected before anything is dispatched. Results are in completion order
    /// within each batch.
    pub async fn run(
        &self,
        workflows: &[WorkflowName],
        batch_size: usize,
    ) -> Result<RunOutcome, OrchestratorError> {
        if workflows.is_empty() {
            return Err(OrchestratorError::EmptyWorkflowList);
        }
        if batch_size == 0 {
            return Err(OrchestratorError::InvalidBatchSize);
        }

        let total_batches = workflows.len().div_ceil(batch_size);
        let mut results = Vec::with_capacity(workflows.len());

        for (idx, batch) in workflows.chunks(batch_size).enumerate() {
            info!(
                batch = idx + 1,
                total_batches,
                size = batch.len(),
                "Processing batch {}/{}",
                idx + 1,
                total_batches
            );

            let batch_results = self.run_batch(batch).await;
            let failed = batch_results
                .iter()
                .filter(|r| !r.passed(&self.expected_failures))
                .count();
            info!(batch = idx + 1, failed, "Batch finished");

            metrics::BATCHES.inc();
            results.extend(batch_results);
        }

        let outcome = RunOutcome::from_results(results, &self.expected_failures);
        info!(
            workflows = outcome.results.len(),
            all_succeeded = outcome.all_succeeded,
            "All test workflows have completed"
        );
        Ok(outcome)
    }

    /// Run one batch to completion; results come back as units finish.
    async fn run_batch(&self, batch: &[WorkflowName]) -> Vec<RunResult> {
        stream::iter(batch)
            .map(|workflow| self.run_one(workflow))
            .buffer_unordered(batch.len())
            .collect()
            .await
    }

    /// Dispatch and poll a single workflow. Never fails: errors become a
    /// failed result.
    async fn run_one(&self, workflow: &WorkflowName) -> RunResult {
        let started = Instant::now();

        let result = match self.dispatcher.trigger(workflow).await {
            Ok(handle) => match self.poller.await_completion(&handle).await {
                Ok(run) => RunResult {
                    workflow: workflow.clone(),
                    run_id: run.id,
                    conclusion: run.conclusion_or_unknown(),
                    html_url: run.html_url,
                    error: None,
                    duration_ms: started.elapsed().as_millis() as u64,
                },
                Err(e) => {
                    warn!(workflow = %workflow, error = %e, "Gave up waiting for run");
                    RunResult::failed(workflow.clone(), &e, started.elapsed().as_millis() as u64)
                }
            },
            Err(e) => {
                warn!(workflow = %workflow, error = %e, "Workflow could not be started");
                RunResult::failed(workflow.clone(), &e, started.elapsed().as_millis() as u64)
            }
        };

        let status = result.status(&self.expected_failures);
        info!(
            workflow = %workflow,
            run_id = result.run_id,
            conclusion = %result.conclusion,
            status = %status,
            "Workflow finished"
        );
        metrics::WORKFLOW_RESULTS
            .with_label_values(&[status.as_str()])
            .inc();
        metrics::WORKFLOW_DURATION
            .with_label_values(&[status.as_str()])
            .observe(result.duration_ms as f64 / 1000.0);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci_client::{CiClientError, Conclusion};
    use crate::orchestrator::RunStatus;
    use crate::testing::{MockCiClient, MockEvent};
    use std::collections::HashSet;

    fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig {
            batch_size: 20,
            poll_status_interval_ms: 30_000,
            poll_run_id_interval_ms: 5_000,
            run_id_timeout_ms: 60_000,
            initial_run_id_delay_ms: 5_000,
            max_poll_duration_ms: None,
        }
    }

    fn names(n: usize) -> Vec<WorkflowName> {
        (0..n)
            .map(|i| WorkflowName::from(format!("wf-{:02}.yml", i)))
            .collect()
    }

    fn orchestrator(
        client: Arc<MockCiClient>,
        expected: ExpectedFailureSet,
    ) -> WorkflowOrchestrator {
        WorkflowOrchestrator::new(client, fast_config(), "refs/heads/main", expected)
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_result_per_workflow() {
        let client = Arc::new(MockCiClient::new());
        let workflows = names(7);
        for (i, wf) in workflows.iter().enumerate() {
            let conclusion = if i % 2 == 0 {
                Conclusion::Success
            } else {
                Conclusion::Failure
            };
            client.add_workflow(wf.as_str(), 100 + i as u64, conclusion).await;
            client.set_polls_before_completion(wf.as_str(), (7 - i) as u32).await;
        }
        client.add_never_starting_workflow("never.yml").await;
        client
            .add_failing_dispatch("denied.yml", CiClientError::Unauthorized("403".into()))
            .await;

        let mut all = workflows.clone();
        all.push(WorkflowName::from("never.yml"));
        all.push(WorkflowName::from("denied.yml"));

        let outcome = orchestrator(client, ExpectedFailureSet::new())
            .run(&all, 4)
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), all.len());
        let seen: HashSet<_> = outcome.results.iter().map(|r| r.workflow.clone()).collect();
        let submitted: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(seen, submitted);
        assert!(!outcome.all_succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_success() {
        let client = Arc::new(MockCiClient::new());
        let workflows = names(5);
        for (i, wf) in workflows.iter().enumerate() {
            client.add_workflow(wf.as_str(), i as u64 + 1, Conclusion::Success).await;
        }

        let outcome = orchestrator(client, ExpectedFailureSet::new())
            .run(&workflows, 20)
            .await
            .unwrap();

        assert!(outcome.all_succeeded);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.status(&ExpectedFailureSet::new()) == RunStatus::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expected_failure_is_allowed() {
        let client = Arc::new(MockCiClient::new());
        client.add_workflow("ok.yml", 1, Conclusion::Success).await;
        client.add_workflow("flaky.yml", 2, Conclusion::Failure).await;
        let expected: ExpectedFailureSet = ["flaky.yml"].into_iter().collect();

        let orch = orchestrator(client, expected.clone());
        let outcome = orch
            .run(&[WorkflowName::from("ok.yml"), WorkflowName::from("flaky.yml")], 20)
            .await
            .unwrap();

        assert!(outcome.all_succeeded);
        let flaky = outcome
            .results
            .iter()
            .find(|r| r.workflow.as_str() == "flaky.yml")
            .unwrap();
        assert_eq!(flaky.conclusion, Conclusion::Failure);
        assert_eq!(flaky.status(&expected), RunStatus::AllowedFailure);
        assert_eq!(outcome.results.iter().filter(|r| r.passed(&expected)).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_in_order_with_bounded_concurrency() {
        let client = Arc::new(MockCiClient::new());
        let workflows = names(45);
        for (i, wf) in workflows.iter().enumerate() {
            client.add_workflow(wf.as_str(), i as u64 + 1, Conclusion::Success).await;
            // stagger completion inside each batch
            client.set_polls_before_completion(wf.as_str(), (i % 3) as u32).await;
        }

        let outcome = orchestrator(client.clone(), ExpectedFailureSet::new())
            .run(&workflows, 20)
            .await
            .unwrap();
        assert_eq!(outcome.results.len(), 45);
        assert!(client.max_in_flight().await <= 20);
        assert_eq!(client.max_in_flight().await, 20);

        // Every workflow of batch k completes before any workflow of batch k+1
        // is dispatched.
        let batch_of = |name: &WorkflowName| {
            workflows.iter().position(|w| w == name).unwrap() / 20
        };
        let events = client.events().await;
        let mut completed_per_batch = [0usize; 3];
        for event in &events {
            match event {
                MockEvent::Dispatched(name) => {
                    let batch = batch_of(name);
                    for earlier in 0..batch {
                        let expected = if earlier < 2 { 20 } else { 5 };
                        assert_eq!(completed_per_batch[earlier], expected);
                    }
                }
                MockEvent::Completed(name) => completed_per_batch[batch_of(name)] += 1,
            }
        }
        assert_eq!(completed_per_batch, [20, 20, 5]);

        // Batch membership of results follows submission order.
        let result_batches: Vec<usize> = outcome.results.iter().map(|r| batch_of(&r.workflow)).collect();
        let mut sorted = result_batches.clone();
        sorted.sort();
        assert_eq!(result_batches, sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_completion_order_within_batch() {
        let client = Arc::new(MockCiClient::new());
        client.add_workflow("slow.yml", 1, Conclusion::Success).await;
        client.set_polls_before_completion("slow.yml", 5).await;
        client.add_workflow("fast.yml", 2, Conclusion::Success).await;

        let outcome = orchestrator(client, ExpectedFailureSet::new())
            .run(&[WorkflowName::from("slow.yml"), WorkflowName::from("fast.yml")], 2)
            .await
            .unwrap();

        assert_eq!(outcome.results[0].workflow.as_str(), "fast.yml");
        assert_eq!(outcome.results[1].workflow.as_str(), "slow.yml");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_timeout_becomes_failed_result() {
        let client = Arc::new(MockCiClient::new());
        client.add_never_starting_workflow("stuck.yml").await;
        client.add_workflow("ok.yml", 3, Conclusion::Success).await;

        let outcome = orchestrator(client, ExpectedFailureSet::new())
            .run(&[WorkflowName::from("stuck.yml"), WorkflowName::from("ok.yml")], 20)
            .await
            .unwrap();

        let stuck = outcome
            .results
            .iter()
            .find(|r| r.workflow.as_str() == "stuck.yml")
            .unwrap();
        assert_eq!(stuck.run_id, 0);
        assert_eq!(stuck.conclusion, Conclusion::Failure);
        assert!(stuck.error.is_some());
        assert!(!outcome.all_succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_failure_does_not_abort_batch() {
        let client = Arc::new(MockCiClient::new());
        client
            .add_failing_dispatch("denied.yml", CiClientError::ApiError("HTTP 422".into()))
            .await;
        client.add_workflow("ok.yml", 3, Conclusion::Success).await;

        let outcome = orchestrator(client, ExpectedFailureSet::new())
            .run(&[WorkflowName::from("denied.yml"), WorkflowName::from("ok.yml")], 1)
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].run_id, 0);
        assert_eq!(outcome.results[1].conclusion, Conclusion::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expected_failure_covers_dispatch_errors() {
        let client = Arc::new(MockCiClient::new());
        client
            .add_failing_dispatch("flaky.yml", CiClientError::Timeout)
            .await;
        let expected: ExpectedFailureSet = ["flaky.yml"].into_iter().collect();

        let outcome = orchestrator(client, expected)
            .run(&[WorkflowName::from("flaky.yml")], 1)
            .await
            .unwrap();
        assert!(outcome.all_succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_list_fails_before_dispatch() {
        let client = Arc::new(MockCiClient::new());
        let err = orchestrator(client.clone(), ExpectedFailureSet::new())
            .run(&[], 20)
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::EmptyWorkflowList));
        assert!(client.dispatched().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_size_rejected() {
        let client = Arc::new(MockCiClient::new());
        let err = orchestrator(client.clone(), ExpectedFailureSet::new())
            .run(&names(3), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::InvalidBatchSize));
        assert!(client.dispatched().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_timeout_keeps_run_id() {
        let client = Arc::new(MockCiClient::new());
        client.add_workflow("hung.yml", 55, Conclusion::Success).await;
        client.set_polls_before_completion("hung.yml", u32::MAX).await;

        let config = OrchestratorConfig {
            max_poll_duration_ms: Some(600_000),
            ..fast_config()
        };
        let orch = WorkflowOrchestrator::new(
            client,
            config,
            "refs/heads/main",
            ExpectedFailureSet::new(),
        );
        let outcome = orch.run(&[WorkflowName::from("hung.yml")], 1).await.unwrap();

        assert_eq!(outcome.results[0].run_id, 55);
        assert_eq!(outcome.results[0].conclusion, Conclusion::Failure);
        assert!(outcome.results[0].error.as_deref().unwrap().contains("still not completed"));
    }
}

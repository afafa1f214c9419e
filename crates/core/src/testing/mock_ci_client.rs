//! Mock CI client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ci_client::{CiClient, CiClientError, Conclusion, RunState, WorkflowRun};
use crate::workflow::WorkflowName;

/// Something the mock observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A dispatch was accepted.
    Dispatched(WorkflowName),
    /// A run was first reported as completed.
    Completed(WorkflowName),
}

/// Scripted behaviour of one workflow.
#[derive(Debug, Clone)]
struct MockWorkflow {
    run_id: u64,
    conclusion: Conclusion,
    /// Empty lookups to return before the run shows up.
    lookups_before_visible: u32,
    /// In-progress status responses before the run completes.
    polls_before_completion: u32,
    /// Lookup errors to return before anything else.
    lookup_failures: u32,
    never_starts: bool,
    dispatch_error: Option<CiClientError>,
    list_calls: usize,
    completed: bool,
}

impl MockWorkflow {
    fn new(run_id: u64, conclusion: Conclusion) -> Self {
        Self {
            run_id,
            conclusion,
            lookups_before_visible: 0,
            polls_before_completion: 0,
            lookup_failures: 0,
            never_starts: false,
            dispatch_error: None,
            list_calls: 0,
            completed: false,
        }
    }
}

#[derive(Debug, Default)]
struct InFlight {
    current: usize,
    max: usize,
}

/// Mock implementation of the CiClient trait.
///
/// Provides controllable behavior for testing:
/// - Script when a run becomes visible and when it completes
/// - Inject dispatch, lookup and status errors
/// - Record dispatches and completions for ordering assertions
///
/// # Example
///
/// ```rust,ignore
/// let client = MockCiClient::new();
/// client.add_workflow("login-nc-v27.yml", 42, Conclusion::Success).await;
/// client.set_polls_before_completion("login-nc-v27.yml", 3).await;
///
/// // ... run the orchestrator ...
///
/// assert_eq!(client.dispatched().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockCiClient {
    workflows: Arc<RwLock<HashMap<WorkflowName, MockWorkflow>>>,
    /// Pending status fetch errors by run id.
    status_failures: Arc<RwLock<HashMap<u64, u32>>>,
    get_run_calls: Arc<RwLock<HashMap<u64, usize>>>,
    dispatched: Arc<RwLock<Vec<WorkflowName>>>,
    events: Arc<RwLock<Vec<MockEvent>>>,
    in_flight: Arc<RwLock<InFlight>>,
    last_branch: Arc<RwLock<Option<String>>>,
}

impl Default for MockCiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCiClient {
    /// Create a new mock with no workflows.
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
            status_failures: Arc::new(RwLock::new(HashMap::new())),
            get_run_calls: Arc::new(RwLock::new(HashMap::new())),
            dispatched: Arc::new(RwLock::new(Vec::new())),
            events: Arc::new(RwLock::new(Vec::new())),
            in_flight: Arc::new(RwLock::new(InFlight::default())),
            last_branch: Arc::new(RwLock::new(None)),
        }
    }

    /// Register a workflow whose run is visible right after dispatch and
    /// completes with `conclusion` on the first status fetch.
    pub async fn add_workflow(&self, name: &str, run_id: u64, conclusion: Conclusion) {
        self.workflows
            .write()
            .await
            .insert(WorkflowName::from(name), MockWorkflow::new(run_id, conclusion));
    }

    /// Register a workflow that dispatches fine but never shows a run.
    pub async fn add_never_starting_workflow(&self, name: &str) {
        let mut wf = MockWorkflow::new(0, Conclusion::Unknown);
        wf.never_starts = true;
        self.workflows.write().await.insert(WorkflowName::from(name), wf);
    }

    /// Register a workflow whose dispatch fails with `error`.
    pub async fn add_failing_dispatch(&self, name: &str, error: CiClientError) {
        let mut wf = MockWorkflow::new(0, Conclusion::Unknown);
        wf.dispatch_error = Some(error);
        self.workflows.write().await.insert(WorkflowName::from(name), wf);
    }

    pub async fn set_lookups_before_visible(&self, name: &str, lookups: u32) {
        if let Some(wf) = self.workflows.write().await.get_mut(name) {
            wf.lookups_before_visible = lookups;
        }
    }

    pub async fn set_polls_before_completion(&self, name: &str, polls: u32) {
        if let Some(wf) = self.workflows.write().await.get_mut(name) {
            wf.polls_before_completion = polls;
        }
    }

    /// Make the next `count` run lookups for `name` fail.
    pub async fn fail_next_lookups(&self, name: &str, count: u32) {
        if let Some(wf) = self.workflows.write().await.get_mut(name) {
            wf.lookup_failures = count;
        }
    }

    /// Make the next `count` status fetches for `run_id` fail.
    pub async fn fail_next_status_fetches(&self, run_id: u64, count: u32) {
        self.status_failures.write().await.insert(run_id, count);
    }

    /// Workflows dispatched so far, in call order. Includes rejected dispatches.
    pub async fn dispatched(&self) -> Vec<WorkflowName> {
        self.dispatched.read().await.clone()
    }

    /// Branch passed to the most recent run lookup.
    pub async fn last_branch(&self) -> Option<String> {
        self.last_branch.read().await.clone()
    }

    pub async fn list_calls(&self, name: &str) -> usize {
        self.workflows
            .read()
            .await
            .get(name)
            .map(|wf| wf.list_calls)
            .unwrap_or(0)
    }

    pub async fn get_run_calls(&self, run_id: u64) -> usize {
        self.get_run_calls
            .read()
            .await
            .get(&run_id)
            .copied()
            .unwrap_or(0)
    }

    /// Dispatch and completion log.
    pub async fn events(&self) -> Vec<MockEvent> {
        self.events.read().await.clone()
    }

    /// Highest number of accepted dispatches whose run had not yet completed.
    pub async fn max_in_flight(&self) -> usize {
        self.in_flight.read().await.max
    }

    fn run_snapshot(name: &WorkflowName, wf: &MockWorkflow, status: RunState) -> WorkflowRun {
        let completed = status == RunState::Completed;
        WorkflowRun {
            id: wf.run_id,
            name: Some(name.to_string()),
            status,
            conclusion: completed.then_some(wf.conclusion),
            html_url: Some(format!(
                "https://github.com/mock/repo/actions/runs/{}",
                wf.run_id
            )),
            head_branch: None,
            created_at: Some(Utc::now()),
        }
    }
}

#[async_trait]
impl CiClient for MockCiClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn dispatch(&self, workflow: &WorkflowName, _git_ref: &str) -> Result<(), CiClientError> {
        self.dispatched.write().await.push(workflow.clone());

        let workflows = self.workflows.read().await;
        let wf = workflows
            .get(workflow)
            .ok_or_else(|| CiClientError::NotFound(format!("workflow {}", workflow)))?;
        if let Some(err) = &wf.dispatch_error {
            return Err(err.clone());
        }
        drop(workflows);

        self.events
            .write()
            .await
            .push(MockEvent::Dispatched(workflow.clone()));
        let mut in_flight = self.in_flight.write().await;
        in_flight.current += 1;
        in_flight.max = in_flight.max.max(in_flight.current);
        Ok(())
    }

    async fn list_in_progress_runs(
        &self,
        workflow: &WorkflowName,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>, CiClientError> {
        *self.last_branch.write().await = Some(branch.to_string());

        let mut workflows = self.workflows.write().await;
        let Some(wf) = workflows.get_mut(workflow) else {
            return Ok(Vec::new());
        };
        wf.list_calls += 1;

        if wf.lookup_failures > 0 {
            wf.lookup_failures -= 1;
            return Err(CiClientError::ConnectionFailed("mock lookup failure".into()));
        }
        if wf.never_starts {
            return Ok(Vec::new());
        }
        if wf.lookups_before_visible > 0 {
            wf.lookups_before_visible -= 1;
            return Ok(Vec::new());
        }

        Ok(vec![Self::run_snapshot(workflow, wf, RunState::InProgress)])
    }

    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, CiClientError> {
        *self.get_run_calls.write().await.entry(run_id).or_insert(0) += 1;

        if let Some(remaining) = self.status_failures.write().await.get_mut(&run_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CiClientError::ApiError("HTTP 502: mock".into()));
            }
        }

        let mut workflows = self.workflows.write().await;
        let Some((name, wf)) = workflows
            .iter_mut()
            .find(|(_, wf)| wf.run_id == run_id && !wf.never_starts)
        else {
            return Err(CiClientError::NotFound(format!("run {}", run_id)));
        };

        if wf.polls_before_completion > 0 {
            wf.polls_before_completion -= 1;
            return Ok(Self::run_snapshot(name, wf, RunState::InProgress));
        }

        if !wf.completed {
            wf.completed = true;
            self.events
                .write()
                .await
                .push(MockEvent::Completed(name.clone()));
            let mut in_flight = self.in_flight.write().await;
            in_flight.current = in_flight.current.saturating_sub(1);
        }
        Ok(Self::run_snapshot(name, wf, RunState::Completed))
    }
}

//! Testing utilities and mock implementations.
//!
//! Provides a scriptable [`MockCiClient`] so the orchestrator can be exercised
//! without a real CI backend, plus fixtures for building results.
//!
//! # Example
//!
//! ```rust,ignore
//! use ocmts_core::testing::MockCiClient;
//!
//! let client = MockCiClient::new();
//! client.add_workflow("login-nc-v27.yml", 1, Conclusion::Success).await;
//! client.set_lookups_before_visible("login-nc-v27.yml", 2).await;
//! ```

mod mock_ci_client;

pub use mock_ci_client::{MockCiClient, MockEvent};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ci_client::Conclusion;
    use crate::orchestrator::RunResult;
    use crate::workflow::WorkflowName;

    /// A finished result with a run link.
    pub fn run_result(workflow: &str, run_id: u64, conclusion: Conclusion) -> RunResult {
        RunResult {
            workflow: WorkflowName::from(workflow),
            run_id,
            conclusion,
            html_url: Some(format!(
                "https://github.com/open-cloud-mesh/ocm-test-suite/actions/runs/{}",
                run_id
            )),
            error: None,
            duration_ms: 60_000,
        }
    }

    /// A result for a workflow whose run was never found.
    pub fn untracked_result(workflow: &str, error: &str) -> RunResult {
        RunResult {
            workflow: WorkflowName::from(workflow),
            run_id: 0,
            conclusion: Conclusion::Failure,
            html_url: None,
            error: Some(error.to_string()),
            duration_ms: 120_000,
        }
    }

    /// `count` successful results named `wf-NN.yml`.
    pub fn successes(count: usize) -> Vec<RunResult> {
        (0..count)
            .map(|i| run_result(&format!("wf-{:02}.yml", i), i as u64 + 1, Conclusion::Success))
            .collect()
    }
}

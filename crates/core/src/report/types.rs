//! Report summary types.

use serde::{Deserialize, Serialize};

use crate::ci_client::Conclusion;
use crate::orchestrator::{RunResult, RunStatus};
use crate::workflow::{ExpectedFailureSet, WorkflowName};

pub const DEFAULT_TITLE: &str = "OCM Test Suite";

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

/// One workflow line in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub workflow: WorkflowName,
    pub status: RunStatus,
    pub conclusion: Conclusion,
    /// 0 when the run was never found.
    pub run_id: u64,
    pub html_url: Option<String>,
}

/// Aggregate view of a finished orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    /// Successes plus allowed failures.
    pub passed: usize,
    pub total: usize,
    /// Rounded to the nearest integer.
    pub percentage: u32,
    pub bar: String,
    /// Sorted by workflow name.
    pub rows: Vec<ReportRow>,
    /// Workflows with status `failure`, sorted by name.
    pub failures: Vec<WorkflowName>,
    pub all_succeeded: bool,
}

impl Report {
    /// Summarize results. Input order does not matter.
    pub fn summarize(
        results: &[RunResult],
        expected_failures: &ExpectedFailureSet,
        bar_width: usize,
    ) -> Self {
        let mut rows: Vec<ReportRow> = results
            .iter()
            .map(|r| ReportRow {
                workflow: r.workflow.clone(),
                status: r.status(expected_failures),
                conclusion: r.conclusion,
                run_id: r.run_id,
                html_url: r.html_url.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.workflow.cmp(&b.workflow));

        let total = rows.len();
        let passed = rows.iter().filter(|r| r.status.is_passing()).count();
        let failures: Vec<WorkflowName> = rows
            .iter()
            .filter(|r| r.status == RunStatus::Failure)
            .map(|r| r.workflow.clone())
            .collect();

        let ratio = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };
        let percentage = (ratio * 100.0).round() as u32;
        let filled = ((ratio * bar_width as f64).round() as usize).min(bar_width);

        let mut bar = String::with_capacity(bar_width * BAR_FILLED.len_utf8());
        bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
        bar.extend(std::iter::repeat(BAR_EMPTY).take(bar_width - filled));

        Self {
            title: DEFAULT_TITLE.to_string(),
            passed,
            total,
            percentage,
            bar,
            all_succeeded: failures.is_empty(),
            rows,
            failures,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Rows with the given status.
    pub fn rows_with_status(&self, status: RunStatus) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(move |r| r.status == status)
    }
}

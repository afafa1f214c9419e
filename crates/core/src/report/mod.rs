//! Run report.
//!
//! Turns orchestration results into a summary (pass count, percentage,
//! progress bar, per-workflow status) and renders it as markdown for the
//! terminal or the GitHub step summary.

mod render;
mod types;
mod writer;

pub use render::{render_markdown, ReportLinks};
pub use types::{Report, ReportRow, DEFAULT_TITLE};
pub use writer::{ReportError, ReportWriter, StdoutReportWriter, StepSummaryWriter};

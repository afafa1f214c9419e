//! Markdown rendering.

use std::fmt::Write;

use crate::orchestrator::RunStatus;

use super::types::{Report, ReportRow};

/// Where run and workflow pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLinks {
    /// Web root, e.g. `https://github.com`.
    pub web_url: String,
    pub owner: String,
    pub repo: String,
}

impl ReportLinks {
    pub fn new(
        web_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            web_url: web_url.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn actions_url(&self) -> String {
        format!(
            "{}/{}/{}/actions",
            self.web_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Link for a row: the run page when the run is known, else the workflow page.
    pub fn row_link(&self, row: &ReportRow) -> String {
        if row.run_id == 0 {
            return format!("{}/workflows/{}", self.actions_url(), row.workflow);
        }
        match &row.html_url {
            Some(url) => url.clone(),
            None => format!("{}/runs/{}", self.actions_url(), row.run_id),
        }
    }
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Success => "✅ success",
        RunStatus::AllowedFailure => "⚠️ allowed-failure",
        RunStatus::Failure => "❌ failure",
    }
}

/// Render the report as GitHub-flavoured markdown.
pub fn render_markdown(report: &Report, links: &ReportLinks) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "## {}\n", report.title);
    let _ = writeln!(
        out,
        "**{}/{} passed ({}%)**\n",
        report.passed, report.total, report.percentage
    );
    let _ = writeln!(out, "`{}`\n", report.bar);

    out.push_str("| Workflow | Status | Run |\n");
    out.push_str("| --- | --- | --- |\n");
    for row in &report.rows {
        let run = if row.run_id == 0 {
            format!("[not started]({})", links.row_link(row))
        } else {
            format!("[#{}]({})", row.run_id, links.row_link(row))
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            row.workflow,
            status_label(row.status),
            run
        );
    }
    out.push('\n');

    if !report.failures.is_empty() {
        let _ = writeln!(
            out,
            "<details>\n<summary>Failed workflows ({})</summary>\n",
            report.failures.len()
        );
        for name in &report.failures {
            let _ = writeln!(out, "- {}", name);
        }
        out.push_str("\n</details>\n\n");
    }

    if report.all_succeeded {
        out.push_str("✅ All workflows passed\n");
    } else {
        let _ = writeln!(out, "❌ {} workflow(s) failed", report.failures.len());
    }

    out
}

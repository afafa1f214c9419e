//! Report output targets.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Errors from writing a rendered report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Destination for a rendered report.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Target name for logging.
    fn name(&self) -> &str;

    async fn write(&self, rendered: &str) -> Result<(), ReportError>;
}

/// Prints the report to standard output.
#[derive(Debug, Default)]
pub struct StdoutReportWriter;

#[async_trait]
impl ReportWriter for StdoutReportWriter {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn write(&self, rendered: &str) -> Result<(), ReportError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(rendered.as_bytes())
            .await
            .map_err(ReportError::Stdout)?;
        stdout.flush().await.map_err(ReportError::Stdout)
    }
}

/// Appends the report to a GitHub Actions step summary file.
#[derive(Debug, Clone)]
pub struct StepSummaryWriter {
    path: PathBuf,
}

impl StepSummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_error(&self, source: std::io::Error) -> ReportError {
        ReportError::File {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ReportWriter for StepSummaryWriter {
    fn name(&self) -> &str {
        "step-summary"
    }

    async fn write(&self, rendered: &str) -> Result<(), ReportError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.file_error(e))?;

        file.write_all(rendered.as_bytes())
            .await
            .map_err(|e| self.file_error(e))?;
        if !rendered.ends_with('\n') {
            file.write_all(b"\n").await.map_err(|e| self.file_error(e))?;
        }
        file.flush().await.map_err(|e| self.file_error(e))?;

        debug!(path = %self.path.display(), bytes = rendered.len(), "Wrote step summary");
        Ok(())
    }
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ocmts-orchestrate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the OCM test suite workflows in batches and report the results", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = "OCMTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated workflow file names to run
    #[arg(long, env = "WORKFLOWS_CSV")]
    pub workflows: Option<String>,

    /// Fall back to the built-in workflow catalogue when no list is given
    #[arg(long)]
    pub builtin_workflows: bool,

    /// Workflows to run concurrently (overrides orchestrator.batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write all results and the verdict as JSON
    #[arg(long)]
    pub results_json: Option<PathBuf>,

    /// Write Prometheus metrics in text format after the run
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json_logs: bool,

    /// Print the resolved workflow list and exit
    #[arg(long)]
    pub list_workflows: bool,
}

//! `ocmts-orchestrate`: dispatches the OCM test suite workflows in batches,
//! waits for them and writes a markdown report.
//!
//! Exit codes: 0 when every workflow passed, 1 when any failed, 2 when the
//! run could not start (configuration or setup error).

mod args;
mod metrics;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocmts_core::report::{StdoutReportWriter, StepSummaryWriter};
use ocmts_core::{
    load_config, load_config_from_env, render_markdown, resolve_workflows, validate_config,
    CiClient, Config, ExpectedFailureSet, GithubClient, Report, ReportLinks, ReportWriter,
    RunOutcome, RunResult, SanitizedConfig, WorkflowName, WorkflowOrchestrator,
};

use args::Args;

/// Results written by `--results-json`.
#[derive(Debug, Serialize)]
struct ResultsFile<'a> {
    all_succeeded: bool,
    passed: usize,
    total: usize,
    /// Sorted by workflow name.
    results: &'a [RunResult],
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.json_logs);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the report only
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None => {
            info!("Loading configuration from environment");
            load_config_from_env().context("Failed to load config from environment")
        }
    }
}

/// Returns whether every workflow passed. Errors mean the run never started.
async fn run(args: Args) -> Result<bool> {
    let config = load(&args)?;

    let workflows = resolve_workflows(
        &config.workflows.list,
        args.workflows.as_deref(),
        args.builtin_workflows,
    );

    if args.list_workflows {
        for name in &workflows {
            println!("{}", name);
        }
        return Ok(true);
    }

    validate_config(&config).context("Configuration validation failed")?;
    info!(
        config = %serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default(),
        "Configuration loaded"
    );

    let expected_failures: ExpectedFailureSet =
        config.workflows.expected_failures.iter().cloned().collect();
    for name in expected_failures.unknown_entries(&workflows) {
        warn!(workflow = %name, "Expected failure is not in the workflow list");
    }

    let client: Arc<dyn CiClient> = Arc::new(
        GithubClient::new(config.github.clone()).context("Failed to create GitHub client")?,
    );
    info!(
        backend = client.name(),
        owner = %config.github.owner,
        repo = %config.github.repo,
        git_ref = %config.github.git_ref,
        branch = config.github.branch(),
        workflows = workflows.len(),
        "Starting test workflows"
    );

    let batch_size = args.batch_size.unwrap_or(config.orchestrator.batch_size);
    let orchestrator = WorkflowOrchestrator::new(
        client,
        config.orchestrator.clone(),
        &config.github.git_ref,
        expected_failures.clone(),
    );
    let outcome = orchestrator.run(&workflows, batch_size).await?;

    // The verdict stands even if an output file cannot be written.
    if let Err(e) = publish(&args, &config, &outcome, &expected_failures).await {
        error!("Failed to publish results: {:#}", e);
    }
    Ok(outcome.all_succeeded)
}

/// Render and write the report plus the optional machine-readable outputs.
async fn publish(
    args: &Args,
    config: &Config,
    outcome: &RunOutcome,
    expected_failures: &ExpectedFailureSet,
) -> Result<()> {
    let report = Report::summarize(&outcome.results, expected_failures, config.report.bar_width)
        .with_title(config.report.title.clone());
    let links = ReportLinks::new(
        config.github.web_url.clone(),
        config.github.owner.clone(),
        config.github.repo.clone(),
    );
    let rendered = render_markdown(&report, &links);

    let mut writers: Vec<Box<dyn ReportWriter>> = vec![Box::new(StdoutReportWriter)];
    if let Some(path) = &config.report.summary_path {
        writers.push(Box::new(StepSummaryWriter::new(path)));
    }
    for writer in &writers {
        if let Err(e) = writer.write(&rendered).await {
            warn!(target_name = writer.name(), error = %e, "Failed to write report");
        }
    }

    info!(
        passed = report.passed,
        total = report.total,
        percentage = report.percentage,
        "Report written"
    );
    log_failures(&report.failures);

    if let Some(path) = &args.results_json {
        write_results_json(path, outcome, &report)?;
    }
    if let Some(path) = &args.metrics_file {
        metrics::write_textfile(path, outcome.all_succeeded)?;
    }
    Ok(())
}

fn log_failures(failures: &[WorkflowName]) {
    for name in failures {
        warn!(workflow = %name, "Workflow failed");
    }
}

fn write_results_json(path: &Path, outcome: &RunOutcome, report: &Report) -> Result<()> {
    let sorted = outcome.sorted_results();
    let file = ResultsFile {
        all_succeeded: outcome.all_succeeded,
        passed: report.passed,
        total: report.total,
        results: &sorted,
    };
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}

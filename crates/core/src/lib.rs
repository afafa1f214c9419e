pub mod ci_client;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod testing;
pub mod workflow;

pub use ci_client::{CiClient, CiClientError, Conclusion, GithubClient, RunState, WorkflowRun};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, RunOutcome, RunResult, RunStatus,
    WorkflowOrchestrator,
};
pub use report::{render_markdown, Report, ReportLinks, ReportWriter};
pub use workflow::{resolve_workflows, ExpectedFailureSet, WorkflowName};

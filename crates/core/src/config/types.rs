use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub workflows: WorkflowsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// GitHub Actions backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Web base URL used for links in the report
    #[serde(default = "default_web_url")]
    pub web_url: String,
    /// API token (usually from GITHUB_TOKEN)
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    /// Ref the workflows are dispatched on, e.g. "refs/heads/main"
    #[serde(default = "default_git_ref")]
    pub git_ref: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Page size when listing in-progress runs
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            web_url: default_web_url(),
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            git_ref: default_git_ref(),
            timeout_secs: default_timeout(),
            per_page: default_per_page(),
        }
    }
}

impl GithubConfig {
    /// Branch name for run lookups (`refs/heads/` stripped).
    pub fn branch(&self) -> &str {
        self.git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.git_ref)
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_web_url() -> String {
    "https://github.com".to_string()
}

fn default_git_ref() -> String {
    "refs/heads/main".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_per_page() -> u32 {
    10
}

/// Which workflows to run and which may fail
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowsConfig {
    /// Explicit workflow list; takes precedence over WORKFLOWS_CSV when non-empty
    #[serde(default)]
    pub list: Vec<String>,
    /// Workflow names whose failure does not fail the run
    #[serde(default)]
    pub expected_failures: Vec<String>,
}

/// Report rendering and output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Number of segments in the progress bar
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
    /// Markdown summary file to append to (GITHUB_STEP_SUMMARY)
    #[serde(default)]
    pub summary_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            bar_width: default_bar_width(),
            summary_path: None,
        }
    }
}

fn default_title() -> String {
    crate::report::DEFAULT_TITLE.to_string()
}

fn default_bar_width() -> usize {
    20
}

/// Sanitized config for logging (token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub github: SanitizedGithubConfig,
    pub orchestrator: OrchestratorConfig,
    pub workflows: WorkflowsConfig,
    pub report: ReportConfig,
}

/// Sanitized GitHub config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGithubConfig {
    pub api_url: String,
    pub web_url: String,
    pub token_configured: bool,
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    pub timeout_secs: u32,
    pub per_page: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let gh = &config.github;
        Self {
            github: SanitizedGithubConfig {
                api_url: gh.api_url.clone(),
                web_url: gh.web_url.clone(),
                token_configured: !gh.token.is_empty(),
                owner: gh.owner.clone(),
                repo: gh.repo.clone(),
                git_ref: gh.git_ref.clone(),
                timeout_secs: gh.timeout_secs,
                per_page: gh.per_page,
            },
            orchestrator: config.orchestrator.clone(),
            workflows: config.workflows.clone(),
            report: config.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.git_ref, "refs/heads/main");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.orchestrator.batch_size, 20);
        assert!(config.workflows.list.is_empty());
        assert_eq!(config.report.bar_width, 20);
        assert!(config.report.summary_path.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[github]
token = "ghp_secret"
owner = "cs3org"
repo = "ocm-test-suite"
git_ref = "refs/heads/release"
timeout_secs = 10

[orchestrator]
batch_size = 5
poll_status_interval_ms = 1000

[workflows]
list = ["login-nc-v27.yml", "login-oc-v10.yml"]
expected_failures = ["login-oc-v10.yml"]

[report]
title = "Nightly"
summary_path = "/tmp/summary.md"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.owner, "cs3org");
        assert_eq!(config.github.branch(), "release");
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.orchestrator.batch_size, 5);
        assert_eq!(config.orchestrator.poll_status_interval_ms, 1000);
        assert_eq!(config.workflows.list.len(), 2);
        assert_eq!(config.workflows.expected_failures, vec!["login-oc-v10.yml"]);
        assert_eq!(config.report.title, "Nightly");
        assert_eq!(
            config.report.summary_path.as_deref(),
            Some(std::path::Path::new("/tmp/summary.md"))
        );
    }

    #[test]
    fn test_branch_without_heads_prefix() {
        let config = GithubConfig {
            git_ref: "feature/x".to_string(),
            ..GithubConfig::default()
        };
        assert_eq!(config.branch(), "feature/x");
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let mut config = Config::default();
        config.github.token = "ghp_secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.github.token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("ghp_secret"));
    }

    #[test]
    fn test_sanitized_config_without_token() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.github.token_configured);
    }
}

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Variables GitHub Actions sets on every job that map onto config keys.
const GITHUB_ACTIONS_VARS: &[&str] = &["GITHUB_TOKEN", "GITHUB_REF", "GITHUB_STEP_SUMMARY"];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Fill in `github.owner` / `github.repo` from an `owner/repo` slug
/// (GITHUB_REPOSITORY) where they are not configured.
pub fn apply_repository_slug(config: &mut Config, slug: Option<&str>) {
    let Some((owner, repo)) = slug.and_then(|s| s.split_once('/')) else {
        return;
    };

    if config.github.owner.is_empty() {
        config.github.owner = owner.to_string();
    }
    if config.github.repo.is_empty() {
        config.github.repo = repo.to_string();
    }
}

fn github_actions_env() -> Env {
    Env::raw().only(GITHUB_ACTIONS_VARS).map(|key| {
        if key == "GITHUB_TOKEN" {
            "github.token".into()
        } else if key == "GITHUB_REF" {
            "github.git_ref".into()
        } else {
            "report.summary_path".into()
        }
    })
}

fn extract(base: Figment) -> Result<Config, ConfigError> {
    let mut config: Config = base
        .merge(github_actions_env())
        .merge(Env::prefixed("OCMTS_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    apply_repository_slug(&mut config, std::env::var("GITHUB_REPOSITORY").ok().as_deref());

    if config
        .report
        .summary_path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        config.report.summary_path = None;
    }

    Ok(config)
}

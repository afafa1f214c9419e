use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - GitHub token, owner, repo and ref are set
/// - Batch size, polling intervals and timeouts are non-zero
/// - Report bar width is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let gh = &config.github;
    for (field, value) in [
        ("github.token", &gh.token),
        ("github.owner", &gh.owner),
        ("github.repo", &gh.repo),
        ("github.git_ref", &gh.git_ref),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be set",
                field
            )));
        }
    }

    let orch = &config.orchestrator;
    if orch.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.batch_size cannot be 0".to_string(),
        ));
    }

    for (field, value) in [
        ("orchestrator.poll_status_interval_ms", orch.poll_status_interval_ms),
        ("orchestrator.poll_run_id_interval_ms", orch.poll_run_id_interval_ms),
        ("orchestrator.run_id_timeout_ms", orch.run_id_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                field
            )));
        }
    }

    if orch.max_poll_duration_ms == Some(0) {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_poll_duration_ms cannot be 0 (omit it to poll without limit)"
                .to_string(),
        ));
    }

    if config.report.bar_width == 0 {
        return Err(ConfigError::ValidationError(
            "report.bar_width cannot be 0".to_string(),
        ));
    }

    Ok(())
}

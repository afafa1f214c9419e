//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and batching for the workflow orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Number of workflows dispatched and awaited together.
    /// Batches run one after another.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How often to fetch the status of a dispatched run (milliseconds).
    #[serde(default = "default_poll_status_interval")]
    pub poll_status_interval_ms: u64,

    /// How often to look for the run created by a dispatch (milliseconds).
    #[serde(default = "default_poll_run_id_interval")]
    pub poll_run_id_interval_ms: u64,

    /// Give up looking for the dispatched run after this long (milliseconds).
    /// Measured from the end of the initial delay.
    #[serde(default = "default_run_id_timeout")]
    pub run_id_timeout_ms: u64,

    /// Wait this long after dispatching before the first lookup (milliseconds).
    #[serde(default = "default_initial_run_id_delay")]
    pub initial_run_id_delay_ms: u64,

    /// Upper bound on how long a single run is polled (milliseconds).
    /// Unset means poll until the run completes, however long that takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_duration_ms: Option<u64>,
}

fn default_batch_size() -> usize {
    20
}

fn default_poll_status_interval() -> u64 {
    30_000 // 30 seconds
}

fn default_poll_run_id_interval() -> u64 {
    5_000 // 5 seconds
}

fn default_run_id_timeout() -> u64 {
    120_000 // 2 minutes
}

fn default_initial_run_id_delay() -> u64 {
    5_000 // 5 seconds
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            poll_status_interval_ms: default_poll_status_interval(),
            poll_run_id_interval_ms: default_poll_run_id_interval(),
            run_id_timeout_ms: default_run_id_timeout(),
            initial_run_id_delay_ms: default_initial_run_id_delay(),
            max_poll_duration_ms: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn poll_status_interval(&self) -> Duration {
        Duration::from_millis(self.poll_status_interval_ms)
    }

    pub fn poll_run_id_interval(&self) -> Duration {
        Duration::from_millis(self.poll_run_id_interval_ms)
    }

    pub fn run_id_timeout(&self) -> Duration {
        Duration::from_millis(self.run_id_timeout_ms)
    }

    pub fn initial_run_id_delay(&self) -> Duration {
        Duration::from_millis(self.initial_run_id_delay_ms)
    }

    pub fn max_poll_duration(&self) -> Option<Duration> {
        self.max_poll_duration_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.poll_status_interval(), Duration::from_secs(30));
        assert_eq!(config.poll_run_id_interval(), Duration::from_secs(5));
        assert_eq!(config.run_id_timeout(), Duration::from_secs(120));
        assert_eq!(config.initial_run_id_delay(), Duration::from_secs(5));
        assert_eq!(config.max_poll_duration(), None);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            batch_size = 4
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.poll_status_interval_ms, 30_000);
        assert!(config.max_poll_duration_ms.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            batch_size = 10
            poll_status_interval_ms = 100
            poll_run_id_interval_ms = 50
            run_id_timeout_ms = 500
            initial_run_id_delay_ms = 10
            max_poll_duration_ms = 3600000
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.poll_status_interval(), Duration::from_millis(100));
        assert_eq!(config.poll_run_id_interval(), Duration::from_millis(50));
        assert_eq!(config.run_id_timeout(), Duration::from_millis(500));
        assert_eq!(config.initial_run_id_delay(), Duration::from_millis(10));
        assert_eq!(config.max_poll_duration(), Some(Duration::from_secs(3600)));
    }
}

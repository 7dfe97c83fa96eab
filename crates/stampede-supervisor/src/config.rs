//! Supervisor configuration.
//!
//! Constructed explicitly and passed in; there is no process-global manager.
//! Each test run owning its own [`SupervisorConfig`] + manager pair is what
//! allows parallel runs without cross-talk.

use std::path::PathBuf;
use std::time::Duration;

/// Default wait after a graceful termination signal before escalating to a
/// forced kill.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);
/// Default interval between background monitor reconciliation passes.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);
/// Default interval between status polls while waiting for completion.
pub const DEFAULT_WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`crate::WorkloadManager`] instance.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Directory containing the workload executables.
    pub binary_root: PathBuf,
    /// Directory under which per-workload output directories are created.
    pub artifact_root: PathBuf,
    /// Endpoint of the cluster under test, passed as `--endpoint`.
    pub endpoint: String,
    /// Database name, passed as `--database`.
    pub database: String,
    /// Grace period between SIGTERM and SIGKILL.
    pub grace_period: Duration,
    /// Monitor reconciliation interval.
    pub monitor_interval: Duration,
    /// Poll interval used by the harness while waiting for completion.
    pub wait_poll_interval: Duration,
}

impl SupervisorConfig {
    /// Create a configuration with default timing intervals.
    #[must_use]
    pub fn new(
        binary_root: impl Into<PathBuf>,
        artifact_root: impl Into<PathBuf>,
        endpoint: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            binary_root: binary_root.into(),
            artifact_root: artifact_root.into(),
            endpoint: endpoint.into(),
            database: database.into(),
            grace_period: DEFAULT_GRACE_PERIOD,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            wait_poll_interval: DEFAULT_WAIT_POLL_INTERVAL,
        }
    }

    /// Override the SIGTERM-to-SIGKILL grace period.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Override the background monitor interval.
    #[must_use]
    pub fn with_monitor_interval(mut self, monitor_interval: Duration) -> Self {
        self.monitor_interval = monitor_interval;
        self
    }

    /// Override the wait-loop poll interval.
    #[must_use]
    pub fn with_wait_poll_interval(mut self, wait_poll_interval: Duration) -> Self {
        self.wait_poll_interval = wait_poll_interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_intervals() {
        let config = SupervisorConfig::new("/bin", "/tmp/out", "grpc://localhost:2135", "/local");
        assert_eq!(config.grace_period, Duration::from_secs(10));
        assert_eq!(config.monitor_interval, Duration::from_secs(5));
        assert_eq!(config.wait_poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn builders_override_intervals() {
        let config = SupervisorConfig::new("/bin", "/tmp/out", "e", "db")
            .with_grace_period(Duration::from_secs(1))
            .with_monitor_interval(Duration::from_millis(200))
            .with_wait_poll_interval(Duration::from_millis(50));
        assert_eq!(config.grace_period, Duration::from_secs(1));
        assert_eq!(config.monitor_interval, Duration::from_millis(200));
        assert_eq!(config.wait_poll_interval, Duration::from_millis(50));
    }
}

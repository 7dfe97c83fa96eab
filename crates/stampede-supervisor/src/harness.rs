//! Synchronous facade used by calling test code.
//!
//! Wraps a [`WorkloadManager`] with the start / wait / assert flow a stress
//! test actually wants. A wait that times out degrades to a managed stop —
//! the caller sees status `killed`, never an error; only
//! [`StressHarness::assert_successful`] turns a non-completed status into a
//! hard test failure.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use stampede_error::{Result, StampedeError};
use stampede_types::{WorkloadKind, WorkloadParams, WorkloadSnapshot, WorkloadStatus};

use crate::config::SupervisorConfig;
use crate::manager::WorkloadManager;

/// Slack added to the workload duration for the default wait timeout.
const DEFAULT_WAIT_SLACK: Duration = Duration::from_secs(60);
/// Default workload duration when neither the harness nor the parameters
/// specify one.
const DEFAULT_DURATION: Duration = Duration::from_secs(60);

/// Test-facing convenience layer over the workload supervisor.
pub struct StressHarness {
    manager: WorkloadManager,
    default_kind: Option<WorkloadKind>,
    tables_prefix: String,
    duration: Duration,
    base_params: WorkloadParams,
}

impl StressHarness {
    #[must_use]
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            manager: WorkloadManager::new(config),
            default_kind: None,
            tables_prefix: "stress_test".to_owned(),
            duration: DEFAULT_DURATION,
            base_params: WorkloadParams::new(),
        }
    }

    /// Kind used when `start_workload` is called without one.
    #[must_use]
    pub fn with_workload_kind(mut self, kind: WorkloadKind) -> Self {
        self.default_kind = Some(kind);
        self
    }

    /// Table namespace prefix; becomes the workload's target path.
    #[must_use]
    pub fn with_tables_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tables_prefix = prefix.into();
        self
    }

    /// Workload duration, injected as the `duration` parameter when the
    /// caller does not set one, and used to size the default wait timeout.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Parameters merged under every started workload's parameters.
    #[must_use]
    pub fn with_base_params(mut self, params: WorkloadParams) -> Self {
        self.base_params = params;
        self
    }

    #[must_use]
    pub fn manager(&self) -> &WorkloadManager {
        &self.manager
    }

    /// Start a workload, combining harness defaults with the call-site
    /// parameters (call-site wins on key collisions).
    pub fn start_workload(
        &self,
        id: &str,
        kind: Option<WorkloadKind>,
        params: WorkloadParams,
    ) -> Result<WorkloadSnapshot> {
        let kind = kind.or(self.default_kind).ok_or_else(|| {
            StampedeError::internal(format!("no workload kind specified for '{id}'"))
        })?;

        let mut merged = self.base_params.clone();
        merged.extend(params);
        merged
            .entry("duration".to_owned())
            .or_insert_with(|| serde_json::json!(self.duration.as_secs()));

        info!(id, kind = %kind, params = ?merged, "starting workload via harness");
        self.manager.start(id, kind, &self.tables_prefix, merged)
    }

    /// Poll until the workload reaches a terminal status or the timeout
    /// elapses. On timeout the workload is stopped and that result is
    /// returned — the timeout degrades to a managed kill, not an error.
    ///
    /// Default timeout: harness duration plus 60 seconds.
    pub fn wait_workload(&self, id: &str, timeout: Option<Duration>) -> Result<WorkloadSnapshot> {
        let timeout = timeout.unwrap_or(self.duration + DEFAULT_WAIT_SLACK);
        let deadline = Instant::now() + timeout;

        loop {
            let snapshot = self.manager.get_status(id)?;
            if snapshot.status.is_terminal() {
                if snapshot.status == WorkloadStatus::Completed {
                    info!(id, "workload completed successfully");
                } else {
                    warn!(id, status = %snapshot.status, "workload finished unsuccessfully");
                }
                return Ok(snapshot);
            }
            if Instant::now() >= deadline {
                warn!(id, ?timeout, "timed out waiting for workload, stopping it");
                return self.manager.stop(id);
            }
            thread::sleep(self.manager.config().wait_poll_interval);
        }
    }

    /// Start a workload and wait for it to finish.
    pub fn run_workload_and_wait(
        &self,
        id: &str,
        kind: Option<WorkloadKind>,
        params: WorkloadParams,
        timeout: Option<Duration>,
    ) -> Result<WorkloadSnapshot> {
        self.start_workload(id, kind, params)?;
        self.wait_workload(id, timeout)
    }

    /// Panic unless the workload completed successfully. The timeout-induced
    /// `killed` status fails here like any other non-completed status.
    #[track_caller]
    pub fn assert_successful(&self, snapshot: &WorkloadSnapshot) {
        assert_eq!(
            snapshot.status,
            WorkloadStatus::Completed,
            "workload '{}' finished with status '{}'",
            snapshot.id,
            snapshot.status,
        );
    }
}

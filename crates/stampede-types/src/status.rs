//! Workload lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a supervised workload process.
///
/// Transitions: `NotStarted → Running → {Completed | Failed | Killed}`.
/// `Completed` and `Failed` are reached only by observing process exit
/// (zero / nonzero exit code); `Killed` only by explicit termination.
/// All three are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
    Killed,
}

impl WorkloadStatus {
    /// Stable string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Killed => "killed",
        }
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Killed)
    }
}

impl fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Closed enumeration of external load-generator types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stampede_error::StampedeError;

/// Types of workloads that can be run as external processes.
///
/// Each kind maps to exactly one executable name (resolved against a
/// configured binary root) and one argument-building rule. The enumeration is
/// closed: adding a kind means adding a binary and a flag table together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    /// Transactional insert/delete load.
    Oltp,
    /// Key-value load over a fixed table/key population.
    Kv,
    /// Mixed read/write load with a named subtype.
    Mixed,
    /// Producer/consumer load over simple queues.
    SimpleQueue,
    /// Statistics collection load.
    Statistics,
    /// Analytical (column-scan heavy) load.
    Olap,
    /// Log-structured append load.
    Log,
}

impl WorkloadKind {
    /// All kinds in canonical order.
    pub const ALL: &[Self] = &[
        Self::Oltp,
        Self::Kv,
        Self::Mixed,
        Self::SimpleQueue,
        Self::Statistics,
        Self::Olap,
        Self::Log,
    ];

    /// Stable string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oltp => "oltp",
            Self::Kv => "kv",
            Self::Mixed => "mixed",
            Self::SimpleQueue => "simple_queue",
            Self::Statistics => "statistics",
            Self::Olap => "olap",
            Self::Log => "log",
        }
    }

    /// Name of the load-generator executable for this kind, relative to the
    /// configured binary root.
    #[must_use]
    pub const fn executable_name(self) -> &'static str {
        match self {
            Self::Oltp => "oltp-workload",
            Self::Kv => "kv-workload",
            Self::Mixed => "mixed-workload",
            Self::SimpleQueue => "simple-queue-workload",
            Self::Statistics => "statistics-workload",
            Self::Olap => "olap-workload",
            Self::Log => "log-workload",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = StampedeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StampedeError::unsupported_kind(s))
    }
}

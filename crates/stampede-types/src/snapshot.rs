//! Externally visible view of a workload record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{WorkloadKind, WorkloadParams, WorkloadStatus};

/// Snapshot of a workload record with the live process handle and output
/// file handles omitted. This is the only shape the supervisor returns
/// across the component boundary.
///
/// Timestamps are unix epoch milliseconds. `end_time` is present if and
/// only if `status` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    /// Unique registry key.
    pub id: String,
    /// Load-generator kind.
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
    /// Namespace the workload operates against.
    pub path: String,
    /// Parameters the workload was started with.
    pub params: WorkloadParams,
    /// OS process id of the spawned child (also its process group id).
    pub pid: u32,
    /// Start timestamp.
    pub start_time: u64,
    /// End timestamp, set on the terminal transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    /// Current lifecycle status.
    pub status: WorkloadStatus,
    /// Captured standard output.
    pub stdout_path: PathBuf,
    /// Captured standard error.
    pub stderr_path: PathBuf,
    /// Metrics artifact the workload binary writes best-effort.
    pub metrics_path: PathBuf,
    /// Parsed metrics object, when the artifact was present and valid JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Map<String, Value>>,
    /// Exit code, when the process exit was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
}

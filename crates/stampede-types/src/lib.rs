//! Data model for external workload supervision.
//!
//! Leaf crate: kind and status enumerations plus the snapshot shape the
//! supervisor hands back across the component boundary. Process handles and
//! open file handles never appear here; they stay internal to the manager.

pub mod kind;
pub mod snapshot;
pub mod status;

pub use kind::WorkloadKind;
pub use snapshot::WorkloadSnapshot;
pub use status::WorkloadStatus;

use std::collections::BTreeMap;

/// Parameter mapping handed to a workload at start time.
///
/// A `BTreeMap` keyed by the underscore-form parameter name. The ordered map
/// makes the passthrough tail of the argument list deterministic without an
/// explicit sort at build time.
pub type WorkloadParams = BTreeMap<String, serde_json::Value>;

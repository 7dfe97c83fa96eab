//! Best-effort metrics artifact reading.
//!
//! Workload binaries write a JSON object to their `--metrics-file` path
//! before exiting. Absence or malformed content is never an error: the
//! contract is best-effort, so every failure here degrades to "no metrics"
//! with a log line.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

/// Read and parse a metrics artifact. Returns `None` when the file is
/// absent, unreadable, not valid JSON, or not a JSON object.
#[must_use]
pub fn read_metrics(path: &Path) -> Option<Map<String, Value>> {
    if !path.exists() {
        return None;
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read metrics file");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(
                path = %path.display(),
                found = other.to_string().chars().take(64).collect::<String>(),
                "metrics file is not a JSON object"
            );
            None
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "malformed metrics file");
            None
        }
    }
}

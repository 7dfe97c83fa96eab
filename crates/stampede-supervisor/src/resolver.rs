//! Workload descriptor resolution: executable paths and argument lists.

use std::path::PathBuf;

use serde_json::Value;
use stampede_types::{WorkloadKind, WorkloadParams};

use crate::config::SupervisorConfig;

/// Parameter keys consumed by the kind-specific flag tables (plus
/// `duration`). Anything else in the parameter map is passed through as a
/// generic `--key value` flag.
const RESERVED_KEYS: &[&str] = &[
    "table_count",
    "key_count",
    "subtype",
    "rows",
    "len",
    "queue_count",
    "duration",
];

/// Resolve the executable path for a workload kind against the configured
/// binary root.
#[must_use]
pub fn resolve_executable(config: &SupervisorConfig, kind: WorkloadKind) -> PathBuf {
    config.binary_root.join(kind.executable_name())
}

/// Build the full argument list for a workload invocation.
///
/// Order is fixed: common args (`--endpoint`, `--database`, `--path`), then
/// kind-specific args in the documented order, then `--duration` if present,
/// then every remaining parameter as `--key value` with underscores
/// converted to hyphens, in map order. Values are stringified with no
/// locale-specific formatting; no range validation happens here — the
/// launched binary rejects out-of-range values itself.
#[must_use]
pub fn build_args(
    config: &SupervisorConfig,
    kind: WorkloadKind,
    path: &str,
    params: &WorkloadParams,
) -> Vec<String> {
    let mut args = vec![
        "--endpoint".to_owned(),
        config.endpoint.clone(),
        "--database".to_owned(),
        config.database.clone(),
        "--path".to_owned(),
        path.to_owned(),
    ];

    match kind {
        WorkloadKind::Kv => {
            push_param(&mut args, "--table-count", params.get("table_count"));
            push_param(&mut args, "--key-count", params.get("key_count"));
        }
        WorkloadKind::Mixed => {
            push_param(&mut args, "--subtype", params.get("subtype"));
            push_param(&mut args, "--rows", params.get("rows"));
            push_param(&mut args, "--len", params.get("len"));
        }
        WorkloadKind::SimpleQueue => {
            push_param(&mut args, "--queue-count", params.get("queue_count"));
        }
        WorkloadKind::Oltp
        | WorkloadKind::Statistics
        | WorkloadKind::Olap
        | WorkloadKind::Log => {}
    }

    push_param(&mut args, "--duration", params.get("duration"));

    for (key, value) in params {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        args.push(format!("--{}", key.replace('_', "-")));
        args.push(value_to_arg(value));
    }

    args
}

fn push_param(args: &mut Vec<String>, flag: &str, value: Option<&Value>) {
    if let Some(value) = value {
        args.push(flag.to_owned());
        args.push(value_to_arg(value));
    }
}

/// Stringify a JSON parameter value for the command line. Strings are used
/// verbatim (no surrounding quotes); everything else takes its JSON text
/// form, which is locale-independent.
fn value_to_arg(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

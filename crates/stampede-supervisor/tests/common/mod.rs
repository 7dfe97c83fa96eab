//! Shared fixtures: stub workload binaries and a fast-interval config.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use stampede_supervisor::{SupervisorConfig, WorkloadManager};
use stampede_types::{WorkloadKind, WorkloadSnapshot};

/// Install a `/bin/sh` stub under `bin_dir` in place of the real workload
/// binary for `kind`.
pub fn stub_workload(bin_dir: &Path, kind: WorkloadKind, body: &str) -> PathBuf {
    let path = bin_dir.join(kind.executable_name());
    let script = format!("#!/bin/sh\n{body}\n");
    fs::write(&path, script).expect("write stub script");
    let mut perms = fs::metadata(&path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

/// Stub that finds its `--metrics-file` argument and writes `payload` there
/// before exiting 0.
pub fn metrics_stub_body(payload: &str) -> String {
    format!(
        r#"metrics=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--metrics-file" ]; then metrics="$2"; fi
  shift
done
printf '%s' '{payload}' > "$metrics"
exit 0"#
    )
}

/// Stub that ignores SIGTERM and keeps running until killed.
pub const STUBBORN_BODY: &str = "trap '' TERM\nwhile :; do sleep 1; done";

/// Config pointing at fresh bin/artifact dirs with intervals shortened to
/// keep the timing assertions inside a CI budget.
pub fn test_config(root: &Path) -> SupervisorConfig {
    let bin_dir = root.join("bin");
    let artifact_dir = root.join("artifacts");
    fs::create_dir_all(&bin_dir).expect("create bin dir");
    fs::create_dir_all(&artifact_dir).expect("create artifact dir");
    SupervisorConfig::new(bin_dir, artifact_dir, "grpc://localhost:2135", "/local")
        .with_grace_period(Duration::from_secs(1))
        .with_monitor_interval(Duration::from_millis(200))
        .with_wait_poll_interval(Duration::from_millis(100))
}

/// Poll `get_status` until the workload is terminal or `max_wait` elapses.
pub fn wait_terminal(
    manager: &WorkloadManager,
    id: &str,
    max_wait: Duration,
) -> WorkloadSnapshot {
    let deadline = Instant::now() + max_wait;
    loop {
        let snapshot = manager.get_status(id).expect("get_status");
        if snapshot.status.is_terminal() {
            return snapshot;
        }
        assert!(
            Instant::now() < deadline,
            "workload '{id}' not terminal within {max_wait:?}"
        );
        std::thread::sleep(Duration::from_millis(50));
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

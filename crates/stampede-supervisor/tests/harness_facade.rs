//! Tests for the start / wait / assert facade.

mod common;

use std::time::Duration;

use stampede_error::StampedeError;
use stampede_supervisor::StressHarness;
use stampede_types::{WorkloadKind, WorkloadParams, WorkloadStatus};

use common::{init_tracing, stub_workload, test_config};

#[test]
fn run_and_wait_reports_success() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "exit 0");
    let harness = StressHarness::new(config).with_duration(Duration::from_secs(1));

    let snapshot = harness
        .run_workload_and_wait("kv", Some(WorkloadKind::Kv), WorkloadParams::new(), None)
        .expect("run and wait");
    assert_eq!(snapshot.status, WorkloadStatus::Completed);
    harness.assert_successful(&snapshot);
}

#[test]
#[should_panic(expected = "finished with status")]
fn assert_successful_panics_on_killed_workload() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "sleep 30");
    let harness = StressHarness::new(config);

    harness
        .start_workload("kv", Some(WorkloadKind::Kv), WorkloadParams::new())
        .expect("start");
    let snapshot = harness.manager().stop("kv").expect("stop");
    harness.assert_successful(&snapshot);
}

#[test]
fn default_kind_is_used_when_call_omits_one() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Oltp, "exit 0");
    let harness = StressHarness::new(config)
        .with_workload_kind(WorkloadKind::Oltp)
        .with_duration(Duration::from_secs(1));

    let snapshot = harness
        .run_workload_and_wait("oltp", None, WorkloadParams::new(), None)
        .expect("run and wait");
    assert_eq!(snapshot.kind, WorkloadKind::Oltp);
    harness.assert_successful(&snapshot);
}

#[test]
fn missing_kind_is_an_error() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let harness = StressHarness::new(test_config(root.path()));

    let err = harness
        .start_workload("anon", None, WorkloadParams::new())
        .unwrap_err();
    assert!(matches!(err, StampedeError::Internal(_)));
}

#[test]
fn harness_duration_is_injected_into_the_command_line() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "echo \"$@\"\nexit 0");
    let harness = StressHarness::new(config).with_duration(Duration::from_secs(7));

    let snapshot = harness
        .run_workload_and_wait("kv", Some(WorkloadKind::Kv), WorkloadParams::new(), None)
        .expect("run and wait");
    harness.assert_successful(&snapshot);

    let stdout = std::fs::read_to_string(&snapshot.stdout_path).expect("stdout log");
    assert!(stdout.contains("--duration 7"), "got: {stdout}");
}

#[test]
fn explicit_duration_parameter_wins_over_harness_default() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "echo \"$@\"\nexit 0");
    let harness = StressHarness::new(config).with_duration(Duration::from_secs(7));

    let mut params = WorkloadParams::new();
    params.insert("duration".to_owned(), serde_json::json!(2));
    let snapshot = harness
        .run_workload_and_wait("kv", Some(WorkloadKind::Kv), params, None)
        .expect("run and wait");

    let stdout = std::fs::read_to_string(&snapshot.stdout_path).expect("stdout log");
    assert!(stdout.contains("--duration 2"), "got: {stdout}");
    assert!(!stdout.contains("--duration 7"), "got: {stdout}");
}

#[test]
fn call_site_params_override_base_params() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "echo \"$@\"\nexit 0");

    let mut base = WorkloadParams::new();
    base.insert("threads".to_owned(), serde_json::json!(4));
    let harness = StressHarness::new(config)
        .with_duration(Duration::from_secs(1))
        .with_base_params(base);

    let mut params = WorkloadParams::new();
    params.insert("threads".to_owned(), serde_json::json!(8));
    let snapshot = harness
        .run_workload_and_wait("kv", Some(WorkloadKind::Kv), params, None)
        .expect("run and wait");

    let stdout = std::fs::read_to_string(&snapshot.stdout_path).expect("stdout log");
    assert!(stdout.contains("--threads 8"), "got: {stdout}");
    assert!(!stdout.contains("--threads 4"), "got: {stdout}");
}

#[test]
fn tables_prefix_becomes_the_workload_path() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = test_config(root.path());
    stub_workload(&config.binary_root, WorkloadKind::Kv, "echo \"$@\"\nexit 0");
    let harness = StressHarness::new(config)
        .with_duration(Duration::from_secs(1))
        .with_tables_prefix("olap_suite");

    let snapshot = harness
        .run_workload_and_wait("kv", Some(WorkloadKind::Kv), WorkloadParams::new(), None)
        .expect("run and wait");
    assert_eq!(snapshot.path, "olap_suite");

    let stdout = std::fs::read_to_string(&snapshot.stdout_path).expect("stdout log");
    assert!(stdout.contains("--path olap_suite"), "got: {stdout}");
}

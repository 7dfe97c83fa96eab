//! Workload registry, launcher, status tracker and termination controller.
//!
//! One [`WorkloadManager`] owns the registry for one test run. The
//! foreground caller and the background monitor both reconcile terminal
//! state through the same routine ([`reconcile`]); there is no separate
//! monitor-only state machine that could disagree with a direct query.
//!
//! Each record sits behind its own mutex, so a slow `stop` on one workload
//! never blocks status queries or reconciliation of the others.

use std::collections::HashMap;
use std::fs::{self, File};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use parking_lot::{Condvar, Mutex};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use stampede_error::{Result, StampedeError};
use stampede_types::{WorkloadKind, WorkloadParams, WorkloadSnapshot, WorkloadStatus};

use crate::config::SupervisorConfig;
use crate::metrics::read_metrics;
use crate::resolver::{build_args, resolve_executable};

/// Poll interval while waiting out the grace period after SIGTERM.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Live record for one supervised workload. Owns the process handle and the
/// output file handles until the terminal transition closes them.
struct WorkloadRecord {
    id: String,
    kind: WorkloadKind,
    path: String,
    params: WorkloadParams,
    child: Child,
    pid: u32,
    start_time: u64,
    end_time: Option<u64>,
    return_code: Option<i32>,
    status: WorkloadStatus,
    stdout_path: PathBuf,
    stderr_path: PathBuf,
    metrics_path: PathBuf,
    stdout_file: Option<File>,
    stderr_file: Option<File>,
    metrics: Option<Map<String, Value>>,
}

impl WorkloadRecord {
    fn snapshot(&self) -> WorkloadSnapshot {
        WorkloadSnapshot {
            id: self.id.clone(),
            kind: self.kind,
            path: self.path.clone(),
            params: self.params.clone(),
            pid: self.pid,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
            stdout_path: self.stdout_path.clone(),
            stderr_path: self.stderr_path.clone(),
            metrics_path: self.metrics_path.clone(),
            metrics: self.metrics.clone(),
            return_code: self.return_code,
        }
    }

    /// Close both output handles. `Option::take` makes a double close a
    /// no-op rather than an error.
    fn close_output_files(&mut self) {
        drop(self.stdout_file.take());
        drop(self.stderr_file.take());
    }

    /// Perform the terminal transition: set status and end time, record the
    /// exit code, close output handles, attempt the metrics read. Idempotent
    /// on already-terminal records.
    fn finalize(&mut self, status: WorkloadStatus, return_code: Option<i32>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.end_time = Some(unix_millis());
        self.return_code = return_code;
        self.close_output_files();
        self.metrics = read_metrics(&self.metrics_path);
    }
}

/// Reconcile actual process liveness into the stored status. This is the
/// single source of truth for terminal-state detection; both the monitor
/// and direct status queries come through here.
fn reconcile(record: &mut WorkloadRecord) {
    if record.status != WorkloadStatus::Running {
        return;
    }
    match record.child.try_wait() {
        Ok(Some(exit)) => {
            let return_code = exit.code();
            let status = if exit.success() {
                WorkloadStatus::Completed
            } else {
                WorkloadStatus::Failed
            };
            info!(
                id = %record.id,
                pid = record.pid,
                status = %status,
                return_code = ?return_code,
                "workload exited"
            );
            record.finalize(status, return_code);
        }
        Ok(None) => {}
        Err(error) => {
            warn!(id = %record.id, pid = record.pid, %error, "liveness check failed");
        }
    }
}

struct ManagerShared {
    config: SupervisorConfig,
    registry: Mutex<HashMap<String, Arc<Mutex<WorkloadRecord>>>>,
    monitor_stop: Mutex<bool>,
    monitor_signal: Condvar,
}

/// Supervisor for external workload processes.
///
/// Dropping the manager stops every registered workload and joins the
/// monitor thread, so a panicking test still cleans up its children.
pub struct WorkloadManager {
    shared: Arc<ManagerShared>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl WorkloadManager {
    #[must_use]
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            shared: Arc::new(ManagerShared {
                config,
                registry: Mutex::new(HashMap::new()),
                monitor_stop: Mutex::new(false),
                monitor_signal: Condvar::new(),
            }),
            monitor: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SupervisorConfig {
        &self.shared.config
    }

    /// Start a workload as an external process.
    ///
    /// If `id` is already registered, the existing workload is stopped and
    /// replaced (a warning, not an error). The child is spawned detached in
    /// its own process group with stdout/stderr redirected to per-id log
    /// files; on spawn failure the just-opened handles are closed and no
    /// record is inserted.
    pub fn start(
        &self,
        id: &str,
        kind: WorkloadKind,
        path: &str,
        params: WorkloadParams,
    ) -> Result<WorkloadSnapshot> {
        if self.shared.registry.lock().contains_key(id) {
            warn!(id, "workload already registered, replacing");
            self.stop(id)?;
            self.shared.registry.lock().remove(id);
        }

        let output_dir = self.shared.config.artifact_root.join(format!("workload_{id}"));
        fs::create_dir_all(&output_dir)?;
        let stdout_path = output_dir.join("stdout.log");
        let stderr_path = output_dir.join("stderr.log");
        let metrics_path = output_dir.join("metrics.json");

        let stdout_file = File::create(&stdout_path)?;
        let stderr_file = File::create(&stderr_path)?;
        let child_stdout = stdout_file.try_clone()?;
        let child_stderr = stderr_file.try_clone()?;

        let executable = resolve_executable(&self.shared.config, kind);
        let mut args = build_args(&self.shared.config, kind, path, &params);
        args.push("--metrics-file".to_owned());
        args.push(metrics_path.display().to_string());

        info!(
            id,
            kind = %kind,
            executable = %executable.display(),
            "starting workload"
        );

        let mut command = Command::new(&executable);
        command
            .args(&args)
            .stdout(Stdio::from(child_stdout))
            .stderr(Stdio::from(child_stderr));
        // Detach into a fresh process group so a later group signal reaches
        // any subprocesses the workload forks.
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                error!(id, executable = %executable.display(), %source, "spawn failed");
                drop(stdout_file);
                drop(stderr_file);
                return Err(StampedeError::Launch {
                    id: id.to_owned(),
                    source,
                });
            }
        };

        let pid = child.id();
        let record = WorkloadRecord {
            id: id.to_owned(),
            kind,
            path: path.to_owned(),
            params,
            child,
            pid,
            start_time: unix_millis(),
            end_time: None,
            return_code: None,
            status: WorkloadStatus::Running,
            stdout_path,
            stderr_path,
            metrics_path,
            stdout_file: Some(stdout_file),
            stderr_file: Some(stderr_file),
            metrics: None,
        };
        let snapshot = record.snapshot();

        self.shared
            .registry
            .lock()
            .insert(id.to_owned(), Arc::new(Mutex::new(record)));

        self.ensure_monitor()?;
        Ok(snapshot)
    }

    /// Current status of a workload, reconciling process exit if it has
    /// happened since the last check. Repeated calls after exit are stable:
    /// the terminal transition runs at most once.
    pub fn get_status(&self, id: &str) -> Result<WorkloadSnapshot> {
        let record = self.lookup(id)?;
        let mut record = record.lock();
        reconcile(&mut record);
        Ok(record.snapshot())
    }

    /// Stop a workload: SIGTERM to its process group, escalating to SIGKILL
    /// after the grace period, then finalize bookkeeping with status
    /// `Killed`. Stopping an already-terminal workload returns its snapshot
    /// unchanged.
    pub fn stop(&self, id: &str) -> Result<WorkloadSnapshot> {
        let record = self.lookup(id)?;
        let mut record = record.lock();
        if record.status.is_terminal() {
            debug!(id, status = %record.status, "stop on terminal workload is a no-op");
            return Ok(record.snapshot());
        }

        info!(id, pid = record.pid, "stopping workload");
        signal_group(&record.id, record.pid, Signal::SIGTERM);

        let deadline = Instant::now() + self.shared.config.grace_period;
        let mut return_code = None;
        loop {
            match record.child.try_wait() {
                Ok(Some(exit)) => {
                    return_code = exit.code();
                    break;
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(id, pid = record.pid, "grace period elapsed, escalating to SIGKILL");
                        signal_group(&record.id, record.pid, Signal::SIGKILL);
                        match record.child.wait() {
                            Ok(exit) => return_code = exit.code(),
                            Err(error) => {
                                warn!(id, %error, "wait after SIGKILL failed");
                            }
                        }
                        break;
                    }
                    thread::sleep(STOP_POLL_INTERVAL);
                }
                Err(error) => {
                    warn!(id, %error, "liveness check during stop failed");
                    break;
                }
            }
        }

        record.finalize(WorkloadStatus::Killed, return_code);
        Ok(record.snapshot())
    }

    /// Stop every registered workload, continuing past individual failures,
    /// then shut down the background monitor. A single stuck workload only
    /// costs its own grace period; it never blocks cleanup of the rest.
    pub fn stop_all(&self) {
        let ids: Vec<String> = self.shared.registry.lock().keys().cloned().collect();
        for id in ids {
            if let Err(error) = self.stop(&id) {
                error!(%id, %error, "failed to stop workload during stop_all");
            }
        }
        self.shutdown_monitor();
    }

    /// Ids currently in the registry (terminal records included).
    #[must_use]
    pub fn registered_ids(&self) -> Vec<String> {
        self.shared.registry.lock().keys().cloned().collect()
    }

    fn lookup(&self, id: &str) -> Result<Arc<Mutex<WorkloadRecord>>> {
        self.shared
            .registry
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StampedeError::not_found(id))
    }

    /// Start the background monitor if it is not currently alive. At most
    /// one instance runs per manager; calling this while one is alive is a
    /// no-op.
    fn ensure_monitor(&self) -> Result<()> {
        let mut guard = self.monitor.lock();
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return Ok(());
            }
        }

        *self.shared.monitor_stop.lock() = false;
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("workload-monitor".to_owned())
            .spawn(move || monitor_loop(&shared))?;
        *guard = Some(handle);
        Ok(())
    }

    fn shutdown_monitor(&self) {
        *self.shared.monitor_stop.lock() = true;
        self.shared.monitor_signal.notify_all();
        if let Some(handle) = self.monitor.lock().take() {
            if handle.join().is_err() {
                error!("workload monitor thread panicked");
            }
        }
    }
}

impl Drop for WorkloadManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Background monitor: reconcile every registered workload, wait out the
/// configured interval, repeat until told to stop. A failure reconciling one
/// id is contained there; it never takes down the loop or the other ids.
fn monitor_loop(shared: &Arc<ManagerShared>) {
    debug!("workload monitor started");
    loop {
        let records: Vec<(String, Arc<Mutex<WorkloadRecord>>)> = shared
            .registry
            .lock()
            .iter()
            .map(|(id, record)| (id.clone(), Arc::clone(record)))
            .collect();

        for (id, record) in records {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                // A record held by a concurrent stop() is skipped this
                // cycle; reconciliation is idempotent and will catch up.
                if let Some(mut record) = record.try_lock() {
                    reconcile(&mut record);
                }
            }));
            if outcome.is_err() {
                error!(%id, "panic while reconciling workload");
            }
        }

        let mut stopped = shared.monitor_stop.lock();
        if *stopped {
            break;
        }
        shared
            .monitor_signal
            .wait_for(&mut stopped, shared.config.monitor_interval);
        if *stopped {
            break;
        }
    }
    debug!("workload monitor stopped");
}

/// Signal an entire process group. "Process already gone" (ESRCH) is
/// expected during teardown races and logged at debug; any other errno is
/// surfaced in the log but never propagated, so cleanup keeps moving.
fn signal_group(id: &str, pid: u32, signal: Signal) {
    let Ok(raw_pid) = i32::try_from(pid) else {
        warn!(id, pid, "pid does not fit a signed pid_t");
        return;
    };
    match killpg(Pid::from_raw(raw_pid), signal) {
        Ok(()) => {}
        Err(Errno::ESRCH) => {
            debug!(id, pid, signal = %signal, "process group already gone");
        }
        Err(errno) => {
            warn!(id, pid, signal = %signal, %errno, "failed to signal process group");
        }
    }
}

fn unix_millis() -> u64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

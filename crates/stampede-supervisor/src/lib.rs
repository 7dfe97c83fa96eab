//! Supervisor for external load-generating processes.
//!
//! Starts workload binaries detached in their own process groups, tracks
//! their lifecycle through a shared registry, reconciles terminal state from
//! a single background monitor thread, and stops them with a graceful-then-
//! forced signal escalation. Calling test code goes through the synchronous
//! [`StressHarness`] facade; everything it returns is a
//! [`stampede_types::WorkloadSnapshot`] with process and file handles
//! stripped.

pub mod config;
pub mod harness;
pub mod manager;
pub mod metrics;
pub mod resolver;

pub use config::SupervisorConfig;
pub use harness::StressHarness;
pub use manager::WorkloadManager;

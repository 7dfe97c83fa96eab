use thiserror::Error;

/// Primary error type for stampede workload supervision.
///
/// Structured variants for the launch/lookup paths that propagate to the
/// caller; everything that happens during monitoring or bulk cleanup is
/// contained and logged instead of surfacing here.
#[derive(Error, Debug)]
pub enum StampedeError {
    /// Workload kind name is not part of the closed kind enumeration.
    #[error("unsupported workload kind: '{kind}'")]
    UnsupportedKind { kind: String },

    /// Operation referenced a workload id that was never registered.
    #[error("workload not found: '{id}'")]
    WorkloadNotFound { id: String },

    /// Spawning the workload binary failed. No registry entry is left
    /// behind when this is returned.
    #[error("failed to launch workload '{id}': {source}")]
    Launch {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// File I/O error (artifact directory, log files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StampedeError {
    /// Create an unsupported-kind error.
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind { kind: kind.into() }
    }

    /// Create a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::WorkloadNotFound { id: id.into() }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is fatal only to the call that produced it,
    /// leaving the registry untouched.
    pub const fn is_call_local(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedKind { .. } | Self::WorkloadNotFound { .. }
        )
    }
}

/// Result type alias using `StampedeError`.
pub type Result<T> = std::result::Result<T, StampedeError>;

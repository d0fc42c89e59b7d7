//! Error types for splatseg-core.

use thiserror::Error;

use crate::command::EngineCommand;

/// Result type alias for splatseg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for splatseg operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Label is not part of the segmentation palette.
    #[error("unknown segmentation label: {0:?}")]
    UnknownLabel(String),

    /// A selection engine command failed; the rest of its sequence was skipped.
    #[error("engine command {command} failed: {source}")]
    EngineCommandFailed {
        command: EngineCommand,
        #[source]
        source: EngineError,
    },

    /// Palette contains the same label twice.
    #[error("duplicate segmentation label: {0:?}")]
    DuplicateLabel(String),

    /// Palette threshold is negative or not finite.
    #[error("invalid threshold {threshold} for label {label:?}")]
    InvalidThreshold { label: String, threshold: f32 },

    /// Palette has no entries.
    #[error("segmentation palette is empty")]
    EmptyPalette,

    /// The background engine worker is no longer running.
    #[error("engine worker disconnected")]
    WorkerDisconnected,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a [`SelectionEngine`](crate::SelectionEngine) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine has no scene to operate on.
    #[error("engine not ready")]
    NotReady,

    /// The engine refused the command.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// A shared engine lock was poisoned by a panicking holder.
    #[error("engine lock poisoned")]
    Poisoned,
}

impl Error {
    /// Returns true if this error came from the selection engine rather than the caller.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Error::EngineCommandFailed { .. })
    }
}

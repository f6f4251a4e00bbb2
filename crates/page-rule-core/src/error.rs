//! Error types for the page rule mode and the host boundary.

use thiserror::Error;

use crate::workspace::BufferId;

/// Failures reported by the host's display primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host cannot attach a rule override to a range.
    #[error("display override unavailable: {0}")]
    OverrideUnavailable(String),

    /// The host cannot mark a range as invisible.
    #[error("invisible-text primitive unavailable: {0}")]
    InvisibilityUnavailable(String),
}

/// Errors produced by the page rule mode and its components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRuleError {
    /// The delimiter pattern failed to compile, or can match the empty string.
    #[error("invalid delimiter pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Compiler (or validation) message.
        message: String,
    },

    /// A fold range no longer satisfies its invariants.
    ///
    /// Only ever logged: the fold controller discards the range and carries on.
    #[error("inconsistent fold range state at offset {outer_start}")]
    InconsistentRangeState {
        /// `outer_start` of the discarded range.
        outer_start: usize,
    },

    /// A host display primitive failed; the mode was switched off for that buffer.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The command needs the mode to be enabled for this buffer.
    #[error("page rule mode is not enabled for this buffer")]
    NotEnabled,

    /// No buffer with this id is open in the workspace.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
}

//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum LockstepError {
    /// Invalid configuration value, detected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The replay buffer does not yet hold enough steps for the requested window.
    #[error("Insufficient replay data: {required} steps required, {available} available")]
    InsufficientData {
        /// Window length requested by the sampler.
        required: usize,
        /// Steps currently held per lane.
        available: usize,
    },

    /// An action fell outside the action space.
    #[error("Action not contained in the action space: {0}")]
    InvalidAction(String),

    /// A batched value did not match the expected number of lanes.
    #[error("Lane count mismatch: expected {expected}, got {got}")]
    LaneMismatch {
        /// Lane count of the consumer.
        expected: usize,
        /// Lane count of the value.
        got: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint data failed validation; every problem found is listed
    #[error("Checkpoint validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

/// A single inconsistency found in a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointIssue {
    #[error("unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("history is empty")]
    EmptyHistory,

    #[error("first history entry has a source state '{from}'")]
    FirstEntryHasSource { from: String },

    #[error("first history entry enters '{found}' instead of '{expected}'")]
    WrongInitialState { found: String, expected: String },

    #[error("history entry {index} leaves '{from}' but the previous entry entered '{previous}'")]
    DisconnectedHistory {
        index: usize,
        from: String,
        previous: String,
    },

    #[error("history entry {index} is timestamped before its predecessor")]
    TimestampsOutOfOrder { index: usize },

    #[error("current state '{current}' does not match last history entry '{last}'")]
    StateMismatch { current: String, last: String },

    #[error("updated_at precedes created_at")]
    UpdatedBeforeCreated,
}

//! Transition errors.

use thiserror::Error;

/// Errors returned by the transition executor and the registry lookup.
///
/// None of these change the entity: a failed call leaves state, history
/// and metadata exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown state '{0}'")]
    UnknownState(String),

    #[error("Entity '{id}' is already initialized")]
    AlreadyInitialized { id: String },

    #[error("Entity '{id}' has not been initialized")]
    NotInitialized { id: String },
}

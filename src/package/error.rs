//! Package action errors.

use crate::machine::TransitionError;
use thiserror::Error;

/// Errors returned by package actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    /// Any action other than cancel attempted on a canceled package.
    #[error("Package '{id}' has been canceled")]
    OrderCanceled { id: String },

    /// Cancel attempted on a package that is already canceled.
    #[error("Package is already in state '{state}'")]
    AlreadyInState { state: String },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PackageError {
    /// Whether this wraps [`TransitionError::InvalidTransition`].
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::Transition(TransitionError::InvalidTransition { .. })
        )
    }
}

//! Stateful entities and the transition engine.
//!
//! This module is the "imperative shell" around [`crate::core`]: an
//! [`EntityContext`] owns a current state, its metadata and its history,
//! and mutates them only through validated or forced transitions.

mod context;
mod error;
mod transition;

pub use context::{EntityContext, INITIAL_DETAILS};
pub use error::TransitionError;
pub use transition::{is_legal, lookup};

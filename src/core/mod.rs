//! Core state types.
//!
//! This module contains the data side of the engine:
//! - State definitions via the `State` trait
//! - Immutable transition events and the append-only history
//! - The metadata bag entities carry
//!
//! Nothing in this module mutates an entity; that is the job of
//! [`crate::machine`].

mod history;
mod metadata;
mod state;

pub use history::{StateHistory, TransitionEvent};
pub use metadata::Metadata;
pub use state::State;

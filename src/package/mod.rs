//! Package delivery lifecycle.
//!
//! The reference domain for the engine: a shipped package moving through
//! six fixed states.
//!
//! | State      | Next states          | Actions         |
//! |------------|----------------------|-----------------|
//! | Ordered    | Processing, Canceled | process, cancel |
//! | Processing | Shipped, Canceled    | ship, cancel    |
//! | Shipped    | Delivered, Returned  | deliver, return |
//! | Delivered  | Returned             | return          |
//! | Returned   | Processing           | process         |
//! | Canceled   | (terminal)           | (none)          |
//!
//! Entering a state stamps `<state>_time` into the package metadata;
//! entering Canceled also stores the transition details as
//! `canceled_reason`.
//!
//! # Example
//!
//! ```rust
//! use waybill::package::{Package, PackageError, PackageState};
//!
//! let mut package = Package::create("PKG-1", "Books");
//! package.initialize().unwrap();
//! package.process().unwrap();
//! package.ship().unwrap();
//!
//! assert_eq!(package.current_state(), &PackageState::Shipped);
//! assert!(package.process().unwrap_err().is_invalid_transition());
//! ```

mod actions;
mod error;

pub use actions::PackageAction;
pub use error::PackageError;

use crate::core::{Metadata, TransitionEvent};
use crate::machine::EntityContext;

crate::state_enum! {
    /// Lifecycle state of a shipped package.
    pub enum PackageState {
        Ordered,
        Processing,
        Shipped,
        Delivered,
        Returned,
        Canceled,
    }
    initial: Ordered
    transitions: {
        Ordered => [Processing, Canceled],
        Processing => [Shipped, Canceled],
        Shipped => [Delivered, Returned],
        Delivered => [Returned],
        Returned => [Processing],
        Canceled => [],
    }
    on_enter: record_entry
}

/// A package tracked by the engine.
pub type Package = EntityContext<PackageState>;

impl PackageState {
    /// Actions this state accepts.
    pub fn allowed_actions(&self) -> &'static [PackageAction] {
        match self {
            Self::Ordered => &[PackageAction::Process, PackageAction::Cancel],
            Self::Processing => &[PackageAction::Ship, PackageAction::Cancel],
            Self::Shipped => &[PackageAction::Deliver, PackageAction::Return],
            Self::Delivered => &[PackageAction::Return],
            Self::Returned => &[PackageAction::Process],
            Self::Canceled => &[],
        }
    }

    pub fn permits(&self, action: PackageAction) -> bool {
        self.allowed_actions().contains(&action)
    }

    /// Metadata key the entry timestamp is stored under.
    pub fn time_key(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered_time",
            Self::Processing => "processing_time",
            Self::Shipped => "shipped_time",
            Self::Delivered => "delivered_time",
            Self::Returned => "returned_time",
            Self::Canceled => "canceled_time",
        }
    }
}

fn record_entry(
    state: &PackageState,
    metadata: &mut Metadata,
    event: &TransitionEvent<PackageState>,
) {
    metadata.insert(state.time_key(), event.timestamp.to_rfc3339());
    if *state == PackageState::Canceled {
        metadata.insert("canceled_reason", event.details.clone());
    }
}

//! Waybill: a stateful entity transition engine
//!
//! Waybill models entities whose allowed operations depend on a current
//! discrete state. States are closed enums carrying a static table of legal
//! next states and entry/exit hooks; entities move between them through one
//! generic transition algorithm that validates, notifies observers and
//! appends to an immutable history.
//!
//! # Core Concepts
//!
//! - **State**: A closed enum implementing the `State` trait, usually via `state_enum!`
//! - **Entity**: An `EntityContext` holding state, metadata and history
//! - **Transition**: A validated or forced state change producing one history event
//! - **Observer**: A callback notified synchronously on every transition
//! - **Deferred transition**: A timer-driven transition armed with `schedule_timeout`
//!
//! # Example
//!
//! ```rust
//! use waybill::package::{Package, PackageError, PackageState};
//!
//! let mut package = Package::create("PKG-1", "Books");
//! package.initialize().unwrap();
//! package.cancel().unwrap();
//!
//! assert_eq!(package.current_state(), &PackageState::Canceled);
//! assert!(matches!(package.ship(), Err(PackageError::OrderCanceled { .. })));
//! ```

pub mod checkpoint;
pub mod config;
pub mod core;
pub mod machine;
mod macros;
pub mod observers;
pub mod package;
pub mod scheduler;

// Re-export commonly used types
pub use crate::config::{ConfigError, EngineConfig};
pub use crate::core::{Metadata, State, StateHistory, TransitionEvent};
pub use crate::machine::{EntityContext, TransitionError};
pub use crate::package::{Package, PackageAction, PackageError, PackageState};
pub use crate::scheduler::{schedule_timeout, TimeoutHandle};

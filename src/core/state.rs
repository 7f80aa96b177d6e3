//! Core State trait for entity states.
//!
//! A type implementing [`State`] is the registry for its machine: the closed
//! set of variants, each carrying a static table of legal next states plus
//! entry and exit hooks.

use super::history::TransitionEvent;
use super::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for entity states.
///
/// Implementors are closed enums. Every variant is a registry member, so a
/// value of the type is always a valid state; name-based lookups go through
/// [`State::from_name`].
///
/// # Required Traits
///
/// - `Clone`: States are copied into history events
/// - `PartialEq`: Transition logic compares states
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States are checkpointed with their entity
/// - `'static`: State tables are static slices
///
/// # Example
///
/// ```rust
/// use waybill::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
///
///     fn initial() -> Self {
///         Self::Closed
///     }
///
///     fn all() -> &'static [Self] {
///         &[Self::Open, Self::Closed]
///     }
///
///     fn next_states(&self) -> &'static [Self] {
///         match self {
///             Self::Open => &[Self::Closed],
///             Self::Closed => &[Self::Open],
///         }
///     }
/// }
///
/// assert!(Door::Closed.can_transition_to(&Door::Open));
/// assert_eq!(Door::from_name("Open"), Some(Door::Open));
/// assert_eq!(Door::from_name("Ajar"), None);
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// The state a freshly initialized entity is placed into.
    fn initial() -> Self;

    /// Every state of the machine, in declaration order.
    fn all() -> &'static [Self];

    /// States reachable from this one through a validated transition.
    fn next_states(&self) -> &'static [Self];

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `true` when there are no next states.
    fn is_final(&self) -> bool {
        self.next_states().is_empty()
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }

    /// Whether `target` is a legal next state.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.next_states().contains(target)
    }

    /// Resolve a state by name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().find(|s| s.name() == name).cloned()
    }

    /// Hook run after the entity has entered this state.
    ///
    /// `event` is the transition that led here. Default is a no-op.
    fn on_enter(&self, _metadata: &mut Metadata, _event: &TransitionEvent<Self>) {}

    /// Hook run before the entity leaves this state. Default is a no-op.
    fn on_exit(&self, _metadata: &mut Metadata) {}
}

//! Transition validation and execution.
//!
//! Every state change of an [`EntityContext`] goes through the single
//! algorithm in this module:
//!
//! 1. same-state requests are a silent no-op (validated path only)
//! 2. legality is checked against the state table (validated path only)
//! 3. the current state's exit hook runs
//! 4. an event is built and every observer is notified, in order
//! 5. the event is appended to history
//! 6. the entity moves into the target state and its entry hook runs

use crate::core::{State, TransitionEvent};
use crate::machine::context::EntityContext;
use crate::machine::error::TransitionError;

/// Resolve a state by name.
pub fn lookup<S: State>(name: &str) -> Result<S, TransitionError> {
    S::from_name(name).ok_or_else(|| TransitionError::UnknownState(name.to_string()))
}

/// Whether a validated transition from `from` to `to` is legal.
///
/// Unknown names on either side are illegal rather than an error.
///
/// ```rust
/// use waybill::machine::is_legal;
/// use waybill::package::PackageState;
///
/// assert!(is_legal::<PackageState>("Ordered", "Processing"));
/// assert!(!is_legal::<PackageState>("Ordered", "Shipped"));
/// assert!(!is_legal::<PackageState>("Lost", "Processing"));
/// ```
pub fn is_legal<S: State>(from: &str, to: &str) -> bool {
    S::from_name(from).is_some_and(|state| state.next_states().iter().any(|s| s.name() == to))
}

impl<S: State> EntityContext<S> {
    /// Move to `target` if the state table allows it.
    pub fn transition_to(&mut self, target: S) -> Result<(), TransitionError> {
        self.validated_transition(target, None)
    }

    /// Move to `target` if the state table allows it, recording `details`.
    pub fn transition_to_with_details(
        &mut self,
        target: S,
        details: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.validated_transition(target, Some(details.into()))
    }

    /// Move to the state called `name` if the state table allows it.
    ///
    /// An unknown name fails validation like any other illegal target.
    pub fn transition_to_named(
        &mut self,
        name: &str,
        details: Option<&str>,
    ) -> Result<(), TransitionError> {
        self.ensure_initialized()?;
        if self.current.name() == name {
            return Ok(());
        }
        if !is_legal::<S>(self.current.name(), name) {
            return Err(self.invalid(name));
        }
        let target = lookup::<S>(name)?;
        self.validated_transition(target, details.map(str::to_string))
    }

    /// Move to `target` without consulting the state table.
    ///
    /// Hooks and observers still run, and the recorded details carry the
    /// configured forced marker. This bypasses every legality invariant and
    /// is meant for administrative overrides only.
    pub fn force_transition_to(&mut self, target: S) -> Result<(), TransitionError> {
        self.ensure_initialized()?;
        let details = format!(
            "{} transition from {} to {}",
            self.config.forced_marker,
            self.current.name(),
            target.name()
        );
        self.execute(target, details);
        Ok(())
    }

    /// Forced transition to the state called `name`.
    pub fn force_transition_to_named(&mut self, name: &str) -> Result<(), TransitionError> {
        self.ensure_initialized()?;
        let target = lookup::<S>(name)?;
        self.force_transition_to(target)
    }

    fn validated_transition(
        &mut self,
        target: S,
        details: Option<String>,
    ) -> Result<(), TransitionError> {
        self.ensure_initialized()?;
        if self.current == target {
            return Ok(());
        }
        if !self.current.can_transition_to(&target) {
            return Err(self.invalid(target.name()));
        }

        let details = details.unwrap_or_else(|| {
            format!(
                "Transition from {} to {}",
                self.current.name(),
                target.name()
            )
        });
        self.execute(target, details);
        Ok(())
    }

    fn execute(&mut self, target: S, details: String) {
        self.current.on_exit(&mut self.metadata);

        let event = TransitionEvent::new(Some(self.current.clone()), target, details)
            .at(self.next_timestamp());
        self.notify(&event);
        self.commit(event);
    }

    fn ensure_initialized(&self) -> Result<(), TransitionError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(TransitionError::NotInitialized {
                id: self.id.clone(),
            })
        }
    }

    fn invalid(&self, to: &str) -> TransitionError {
        TransitionError::InvalidTransition {
            from: self.current.name().to_string(),
            to: to.to_string(),
        }
    }
}

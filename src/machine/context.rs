//! Entity context: one tracked entity and everything known about it.

use crate::checkpoint::Checkpoint;
use crate::config::EngineConfig;
use crate::core::{Metadata, State, StateHistory, TransitionEvent};
use crate::machine::error::TransitionError;
use crate::observers::Observer;
use chrono::{DateTime, Utc};
use std::fmt;

/// Details recorded on the initial placement.
pub const INITIAL_DETAILS: &str = "Initial state";

/// A tracked entity whose allowed operations depend on its current state.
///
/// Contexts are created with [`EntityContext::create`] and become usable once
/// [`EntityContext::initialize`] has placed them into `S::initial()`. From then
/// on they change only through the transition methods, which append exactly
/// one history event per successful transition.
///
/// A context has no internal locking. Share it across threads behind a
/// `Mutex` owned by the caller (see [`crate::scheduler`]).
///
/// # Example
///
/// ```rust
/// use waybill::machine::EntityContext;
/// use waybill::package::PackageState;
///
/// let mut package = EntityContext::<PackageState>::create("PKG-1", "Books");
/// package.initialize().unwrap();
/// package.transition_to(PackageState::Processing).unwrap();
///
/// assert_eq!(package.current_state_name(), "Processing");
/// assert_eq!(package.history().len(), 2);
/// ```
pub struct EntityContext<S: State> {
    pub(super) id: String,
    pub(super) description: String,
    pub(super) current: S,
    pub(super) metadata: Metadata,
    pub(super) history: StateHistory<S>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) observers: Vec<Observer<S>>,
    pub(super) config: EngineConfig,
}

impl<S: State> EntityContext<S> {
    /// Create an uninitialized context with the default configuration.
    pub fn create(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_config(id, description, EngineConfig::default())
    }

    /// Create an uninitialized context.
    pub fn with_config(
        id: impl Into<String>,
        description: impl Into<String>,
        config: EngineConfig,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            description: description.into(),
            current: S::initial(),
            metadata: Metadata::new(),
            history: StateHistory::new(),
            created_at: now,
            updated_at: now,
            observers: Vec::new(),
            config,
        }
    }

    /// Rebuild a context from an already validated checkpoint.
    pub(crate) fn from_checkpoint(checkpoint: Checkpoint<S>, config: EngineConfig) -> Self {
        Self {
            id: checkpoint.entity_id,
            description: checkpoint.description,
            current: checkpoint.current_state,
            metadata: checkpoint.metadata,
            history: checkpoint.history,
            created_at: checkpoint.created_at,
            updated_at: checkpoint.updated_at,
            observers: Vec::new(),
            config,
        }
    }

    /// Place the entity into its start state.
    ///
    /// Records the initial event (no `from` state), notifies observers and
    /// runs the start state's entry hook. Fails if already initialized.
    pub fn initialize(&mut self) -> Result<(), TransitionError> {
        if self.is_initialized() {
            return Err(TransitionError::AlreadyInitialized {
                id: self.id.clone(),
            });
        }

        let event = TransitionEvent::initial(S::initial(), INITIAL_DETAILS)
            .at(self.next_timestamp());
        self.notify(&event);
        self.commit(event);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn current_state_name(&self) -> &str {
        self.current.name()
    }

    /// States reachable from the current one through a validated transition.
    pub fn allowed_next_states(&self) -> &'static [S] {
        self.current.next_states()
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register an observer. Observers run in registration order.
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&TransitionEvent<S>) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Timestamp for the next event; never earlier than the last update.
    pub(super) fn next_timestamp(&self) -> DateTime<Utc> {
        Utc::now().max(self.updated_at)
    }

    pub(super) fn notify(&self, event: &TransitionEvent<S>) {
        for observer in &self.observers {
            observer(event);
        }
    }

    /// Record `event` and move into its target state.
    pub(super) fn commit(&mut self, event: TransitionEvent<S>) {
        self.history.push(event.clone());
        self.updated_at = event.timestamp;
        self.current = event.to.clone();
        self.current.on_enter(&mut self.metadata, &event);
    }
}

impl<S: State> fmt::Debug for EntityContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityContext")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("current", &self.current)
            .field("metadata", &self.metadata)
            .field("history_len", &self.history.len())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("observers", &self.observers.len())
            .finish()
    }
}

//! Transition history tracking.
//!
//! Provides the immutable transition record and the ordered, append-only
//! log an entity keeps of every state it has been placed into.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Record of a single state transition.
///
/// Events are immutable values. The very first event of an entity has no
/// `from` state: it records the initial placement.
///
/// # Example
///
/// ```rust
/// use waybill::core::TransitionEvent;
/// use waybill::package::PackageState;
///
/// let event = TransitionEvent::new(
///     Some(PackageState::Ordered),
///     PackageState::Processing,
///     "process action",
/// );
/// assert_eq!(event.from_name(), "Ordered");
/// assert_eq!(event.to_string(), "Ordered -> Processing (process action)");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionEvent<S: State> {
    /// The state being left, `None` for the initial placement
    pub from: Option<S>,
    /// The state being entered
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Free-text details ("FORCED", "Automatic transition ...", ...)
    pub details: String,
}

impl<S: State> TransitionEvent<S> {
    /// Create an event stamped with the current time.
    pub fn new(from: Option<S>, to: S, details: impl Into<String>) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
            details: details.into(),
        }
    }

    /// Create the event for an entity's initial placement.
    pub fn initial(to: S, details: impl Into<String>) -> Self {
        Self::new(None, to, details)
    }

    /// Replace the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Name of the source state, empty for the initial placement.
    pub fn from_name(&self) -> &str {
        self.from.as_ref().map_or("", |s| s.name())
    }

    /// Name of the target state.
    pub fn to_name(&self) -> &str {
        self.to.name()
    }

    /// Whether this event is the initial placement.
    pub fn is_initial(&self) -> bool {
        self.from.is_none()
    }
}

impl<S: State> fmt::Display for TransitionEvent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.from_name(),
            self.to_name(),
            self.details
        )
    }
}

/// Ordered history of transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the event added. Nothing is ever removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    events: Vec<TransitionEvent<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record an event, returning a new history.
    pub fn record(&self, event: TransitionEvent<S>) -> Self {
        let mut events = self.events.clone();
        events.push(event);
        Self { events }
    }

    /// Append an event in place.
    pub(crate) fn push(&mut self, event: TransitionEvent<S>) {
        self.events.push(event);
    }

    /// Get the sequence of states visited, starting with the first known one.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(from) = self.events.first().and_then(|e| e.from.as_ref()) {
            path.push(from);
        }
        for event in &self.events {
            path.push(&event.to);
        }
        path
    }

    /// Time elapsed between the first and last recorded events.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.events.first(), self.events.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[TransitionEvent<S>] {
        &self.events
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&TransitionEvent<S>> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Initial => "Initial",
                Self::Processing => "Processing",
                Self::Complete => "Complete",
            }
        }

        fn initial() -> Self {
            Self::Initial
        }

        fn all() -> &'static [Self] {
            &[Self::Initial, Self::Processing, Self::Complete]
        }

        fn next_states(&self) -> &'static [Self] {
            match self {
                Self::Initial => &[Self::Processing],
                Self::Processing => &[Self::Complete],
                Self::Complete => &[],
            }
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(TransitionEvent::initial(TestState::Initial, "start"));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn push_appends_in_place() {
        let mut history = StateHistory::new();
        history.push(TransitionEvent::initial(TestState::Initial, "start"));
        history.push(TransitionEvent::new(
            Some(TestState::Initial),
            TestState::Processing,
            "",
        ));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|e| &e.to), Some(&TestState::Processing));
    }

    #[test]
    fn get_path_starts_at_initial_placement() {
        let history = StateHistory::new()
            .record(TransitionEvent::initial(TestState::Initial, "start"))
            .record(TransitionEvent::new(
                Some(TestState::Initial),
                TestState::Processing,
                "",
            ))
            .record(TransitionEvent::new(
                Some(TestState::Processing),
                TestState::Complete,
                "",
            ));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![
                &TestState::Initial,
                &TestState::Processing,
                &TestState::Complete
            ]
        );
    }

    #[test]
    fn get_path_includes_source_of_first_event() {
        let history = StateHistory::new().record(TransitionEvent::new(
            Some(TestState::Initial),
            TestState::Processing,
            "",
        ));
        assert_eq!(
            history.get_path(),
            vec![&TestState::Initial, &TestState::Processing]
        );
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(TransitionEvent::initial(TestState::Initial, "").at(start))
            .record(
                TransitionEvent::new(Some(TestState::Initial), TestState::Processing, "")
                    .at(start + chrono::Duration::milliseconds(25)),
            );

        assert_eq!(history.duration(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn event_display_uses_empty_from_for_initial() {
        let event = TransitionEvent::initial(TestState::Initial, "Initial state");
        assert!(event.is_initial());
        assert_eq!(event.from_name(), "");
        assert_eq!(event.to_string(), " -> Initial (Initial state)");
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new()
            .record(TransitionEvent::initial(TestState::Initial, "start"))
            .record(TransitionEvent::new(
                Some(TestState::Initial),
                TestState::Processing,
                "next",
            ));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        assert_eq!(history.events(), deserialized.events());
    }
}

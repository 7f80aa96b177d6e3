//! Transition observers.
//!
//! An observer is a plain callback invoked synchronously, in registration
//! order, for every recorded transition of an entity. Observers have no
//! error channel; a panicking observer aborts the transition that called it.
//!
//! The factories here never perform I/O themselves. They format the event
//! and hand the result to a caller-supplied sink.

use std::fmt::Write;

use crate::config::EngineConfig;
use crate::core::{State, TransitionEvent};

/// Boxed observer callback as stored by an entity.
pub type Observer<S> = Box<dyn Fn(&TransitionEvent<S>) + Send + Sync>;

/// Format an event as `[<timestamp>] <from> -> <to> (<details>)`.
///
/// A format chrono cannot render falls back to RFC 3339.
pub fn format_log_line<S: State>(event: &TransitionEvent<S>, timestamp_format: &str) -> String {
    let mut stamp = String::new();
    if write!(stamp, "{}", event.timestamp.format(timestamp_format)).is_err() {
        stamp = event.timestamp.to_rfc3339();
    }
    format!("[{stamp}] {event}")
}

/// Build the human-readable message and details for a notification.
pub fn format_notification<S: State>(event: &TransitionEvent<S>) -> (String, String) {
    let message = match &event.from {
        Some(from) => format!("Package moved from {} to {}", from.name(), event.to.name()),
        None => format!("Package entered {}", event.to.name()),
    };
    (message, event.details.clone())
}

/// Observer that passes a formatted log line to `sink`.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use waybill::observers::logging_observer;
/// use waybill::package::Package;
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let captured = Arc::clone(&lines);
///
/// let mut package = Package::create("PKG-1", "Books");
/// package.add_observer(logging_observer(move |line: &str| {
///     captured.lock().unwrap().push(line.to_string());
/// }));
/// package.initialize().unwrap();
///
/// assert!(lines.lock().unwrap()[0].ends_with(" -> Ordered (Initial state)"));
/// ```
pub fn logging_observer<S, F>(sink: F) -> impl Fn(&TransitionEvent<S>) + Send + Sync + 'static
where
    S: State,
    F: Fn(&str) + Send + Sync + 'static,
{
    logging_observer_with_config(&EngineConfig::default(), sink)
}

/// Same as [`logging_observer`] with the timestamp format taken from `config`.
pub fn logging_observer_with_config<S, F>(
    config: &EngineConfig,
    sink: F,
) -> impl Fn(&TransitionEvent<S>) + Send + Sync + 'static
where
    S: State,
    F: Fn(&str) + Send + Sync + 'static,
{
    let timestamp_format = config.log_timestamp_format.clone();
    move |event: &TransitionEvent<S>| sink(&format_log_line(event, &timestamp_format))
}

/// Observer that passes `(message, details)` to `sink` for delivery to an
/// external channel.
pub fn notification_observer<S, F>(sink: F) -> impl Fn(&TransitionEvent<S>) + Send + Sync + 'static
where
    S: State,
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    move |event: &TransitionEvent<S>| {
        let (message, details) = format_notification(event);
        sink(&message, &details);
    }
}

/// Observer that emits one `tracing` event per transition.
pub fn tracing_observer<S: State>() -> impl Fn(&TransitionEvent<S>) + Send + Sync + 'static {
    |event: &TransitionEvent<S>| {
        tracing::info!(
            from = event.from_name(),
            to = event.to_name(),
            details = %event.details,
            "state transition"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageState;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    fn shipped_event() -> TransitionEvent<PackageState> {
        TransitionEvent::new(
            Some(PackageState::Processing),
            PackageState::Shipped,
            "ship action",
        )
        .at(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap())
    }

    #[test]
    fn log_line_includes_timestamp_and_transition() {
        let line = format_log_line(&shipped_event(), "%Y-%m-%d %H:%M:%S");
        assert_eq!(line, "[2024-03-09 14:05:00] Processing -> Shipped (ship action)");
    }

    #[test]
    fn logging_observer_honours_configured_format() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let config = EngineConfig::default()
            .with_log_timestamp_format("%H:%M")
            .unwrap();

        let observer = logging_observer_with_config(&config, move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        });
        observer(&shipped_event());

        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["[14:05] Processing -> Shipped (ship action)".to_string()]
        );
    }

    #[test]
    fn unrenderable_timestamp_format_falls_back_to_rfc3339() {
        let line = format_log_line(&shipped_event(), "%Q");
        assert_eq!(
            line,
            "[2024-03-09T14:05:00+00:00] Processing -> Shipped (ship action)"
        );
    }

    #[test]
    fn logging_observer_survives_hand_edited_config() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let config = EngineConfig {
            log_timestamp_format: "%Q".to_string(),
            ..EngineConfig::default()
        };

        let mut package = crate::package::Package::create("PKG-F", "Fallback");
        package.add_observer(logging_observer_with_config(&config, move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));
        package.initialize().unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" -> Ordered (Initial state)"));
    }

    #[test]
    fn notification_describes_move() {
        let (message, details) = format_notification(&shipped_event());
        assert_eq!(message, "Package moved from Processing to Shipped");
        assert_eq!(details, "ship action");
    }

    #[test]
    fn notification_for_initial_placement() {
        let event = TransitionEvent::initial(PackageState::Ordered, "Initial state");
        let (message, _) = format_notification(&event);
        assert_eq!(message, "Package entered Ordered");
    }

    #[test]
    fn notification_observer_forwards_to_sink() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&received);

        let observer = notification_observer(move |message: &str, details: &str| {
            captured
                .lock()
                .unwrap()
                .push((message.to_string(), details.to_string()));
        });
        observer(&shipped_event());

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "Package moved from Processing to Shipped");
        assert_eq!(received[0].1, "ship action");
    }

    #[test]
    fn tracing_observer_does_not_panic_without_subscriber() {
        let observer = tracing_observer::<PackageState>();
        observer(&shipped_event());
    }
}

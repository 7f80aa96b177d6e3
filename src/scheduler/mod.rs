//! Deferred (timer-driven) transitions.
//!
//! [`schedule_timeout`] arms a one-shot Tokio timer that, on expiry, attempts
//! a validated transition on a shared entity. The attempt happens on the
//! runtime, long after the scheduling call has returned, so its outcome is
//! never handed back to a caller. A failure is written into the entity's
//! metadata under [`EngineConfig::timeout_error_key`](crate::config::EngineConfig)
//! instead.
//!
//! Cancellation only prevents the timer body from starting. It never
//! interrupts a transition already in progress.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use waybill::package::{Package, PackageState};
//! use waybill::scheduler::schedule_timeout;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut package = Package::create("PKG-1", "Books");
//! package.initialize().unwrap();
//! package.process().unwrap();
//! let package = Arc::new(Mutex::new(package));
//!
//! let handle = schedule_timeout(
//!     Arc::clone(&package),
//!     PackageState::Shipped,
//!     Duration::from_millis(10),
//! );
//! handle.join().await;
//!
//! assert_eq!(package.lock().unwrap().current_state(), &PackageState::Shipped);
//! # }
//! ```

use crate::core::State;
use crate::machine::EntityContext;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// An entity shared between the caller and the timer task.
pub type SharedContext<S> = Arc<Mutex<EntityContext<S>>>;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Details recorded on a deferred transition.
pub fn automatic_details(target: &str, delay: Duration) -> String {
    format!("Automatic transition to {target} after timeout of {delay:?}")
}

/// Handle to a scheduled transition.
///
/// Fire and cancel race through a single compare-exchange on a shared flag,
/// so exactly one of them wins.
#[derive(Debug)]
pub struct TimeoutHandle {
    status: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl TimeoutHandle {
    /// Prevent the timer body from running.
    ///
    /// Returns `true` if this call stopped the transition, `false` if the
    /// timer had already fired or been cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .status
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.task.abort();
            tracing::debug!("deferred transition cancelled");
        }
        cancelled
    }

    /// Whether the timer expired and its transition attempt started.
    pub fn is_fired(&self) -> bool {
        self.status.load(Ordering::Acquire) == FIRED
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.load(Ordering::Acquire) == CANCELLED
    }

    /// Whether the timer task has finished, by firing or cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the timer task has finished.
    pub async fn join(self) {
        // An aborted task reports a cancellation error; a panicking observer
        // reports a panic. Neither has a caller to go to.
        if let Err(err) = self.task.await {
            if err.is_panic() {
                tracing::warn!("deferred transition task panicked");
            }
        }
    }
}

/// Schedule a validated transition of `context` to `target` after `delay`.
///
/// Must be called from within a Tokio runtime.
pub fn schedule_timeout<S: State>(
    context: SharedContext<S>,
    target: S,
    delay: Duration,
) -> TimeoutHandle {
    let status = Arc::new(AtomicU8::new(ARMED));
    let flag = Arc::clone(&status);

    tracing::debug!(target_state = target.name(), ?delay, "deferred transition armed");

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if flag
            .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        fire(&context, target, delay);
    });

    TimeoutHandle { status, task }
}

fn fire<S: State>(context: &SharedContext<S>, target: S, delay: Duration) {
    let Ok(mut ctx) = context.lock() else {
        tracing::warn!(
            target_state = target.name(),
            "entity lock poisoned, deferred transition abandoned"
        );
        return;
    };

    let details = automatic_details(target.name(), delay);
    match ctx.transition_to_with_details(target.clone(), details) {
        Ok(()) => {
            tracing::debug!(
                entity = ctx.id(),
                state = ctx.current_state_name(),
                "deferred transition applied"
            );
        }
        Err(err) => {
            tracing::warn!(
                entity = ctx.id(),
                target_state = target.name(),
                error = %err,
                "deferred transition failed"
            );
            let key = ctx.config().timeout_error_key.clone();
            ctx.metadata_mut().insert(key, err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Package, PackageState};

    fn processing() -> SharedContext<PackageState> {
        let mut package = Package::create("PKG-1", "Books");
        package.initialize().unwrap();
        package.process().unwrap();
        Arc::new(Mutex::new(package))
    }

    #[test]
    fn automatic_details_mention_target_and_delay() {
        let details = automatic_details("Shipped", Duration::from_millis(50));
        assert_eq!(
            details,
            "Automatic transition to Shipped after timeout of 50ms"
        );
    }

    #[tokio::test]
    async fn fires_after_delay() {
        let package = processing();
        let handle = schedule_timeout(
            Arc::clone(&package),
            PackageState::Shipped,
            Duration::from_millis(20),
        );

        assert!(!handle.is_fired());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(handle.is_fired());
        let package = package.lock().unwrap();
        assert_eq!(package.current_state(), &PackageState::Shipped);
        assert!(package
            .history()
            .last()
            .unwrap()
            .details
            .contains("Automatic"));
    }

    #[tokio::test]
    async fn cancel_before_expiry_prevents_transition() {
        let package = processing();
        let handle = schedule_timeout(
            Arc::clone(&package),
            PackageState::Shipped,
            Duration::from_millis(50),
        );

        assert!(handle.cancel());
        assert!(handle.is_cancelled());
        assert!(!handle.cancel());
        handle.join().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        let package = package.lock().unwrap();
        assert_eq!(package.current_state(), &PackageState::Processing);
        assert_eq!(package.history().len(), 2);
    }

    #[tokio::test]
    async fn cancel_after_fire_has_no_effect() {
        let package = processing();
        let handle = schedule_timeout(
            Arc::clone(&package),
            PackageState::Shipped,
            Duration::from_millis(5),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.cancel());
        assert!(handle.is_fired());
        assert_eq!(
            package.lock().unwrap().current_state(),
            &PackageState::Shipped
        );
    }

    #[tokio::test]
    async fn failure_is_recorded_in_metadata() {
        let package = processing();
        let handle = schedule_timeout(
            Arc::clone(&package),
            PackageState::Delivered,
            Duration::from_millis(5),
        );
        handle.join().await;

        let package = package.lock().unwrap();
        assert_eq!(package.current_state(), &PackageState::Processing);
        assert_eq!(
            package.metadata().get_str("timeout_error"),
            Some("Invalid transition from 'Processing' to 'Delivered'")
        );
    }
}

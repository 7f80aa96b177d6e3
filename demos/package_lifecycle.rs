//! Package Lifecycle
//!
//! This example drives packages through the delivery state machine.
//!
//! Key concepts:
//! - Domain actions mapped onto validated transitions
//! - Terminal states and their dedicated errors
//! - Observers for logging and customer notifications
//! - Deferred transitions armed on a timer
//! - Checkpointing an entity and restoring it
//!
//! Run with: cargo run --example package_lifecycle

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waybill::checkpoint::Checkpoint;
use waybill::observers::{logging_observer, notification_observer, tracing_observer};
use waybill::package::{Package, PackageState};
use waybill::scheduler::schedule_timeout;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,waybill=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Package Lifecycle ===\n");

    // Normal delivery with observers attached
    let mut package = Package::create("PKG-001", "Mechanical keyboard");
    package.add_observer(logging_observer(|line: &str| println!("  [Log] {line}")));
    package.add_observer(notification_observer(|message: &str, details: &str| {
        println!("  [Notify] {message} ({details})");
    }));
    package.add_observer(tracing_observer());

    package.initialize().expect("fresh package initializes");
    package.process().expect("ordered package can be processed");
    package.ship().expect("processing package can be shipped");

    println!("\nTrying to process a shipped package:");
    match package.process() {
        Ok(()) => println!("  unexpectedly succeeded"),
        Err(err) => println!("  rejected: {err}"),
    }

    package.deliver().expect("shipped package can be delivered");
    println!("\nFinal state: {}", package.current_state());
    println!("Path: {:?}", package.history().get_path());

    // Cancellation is terminal
    println!("\n=== Cancellation ===\n");
    let mut canceled = Package::create("PKG-002", "Desk lamp");
    canceled.initialize().expect("fresh package initializes");
    canceled
        .cancel_with_reason("Customer changed their mind")
        .expect("ordered package can be canceled");
    for result in [canceled.ship(), canceled.cancel()] {
        if let Err(err) = result {
            println!("  rejected: {err}");
        }
    }
    println!(
        "  reason on record: {:?}",
        canceled.metadata().get_str("canceled_reason")
    );

    // Deferred transition
    println!("\n=== Automatic shipping ===\n");
    let mut auto = Package::create("PKG-003", "Monitor arm");
    auto.initialize().expect("fresh package initializes");
    auto.process().expect("ordered package can be processed");
    let auto = Arc::new(Mutex::new(auto));

    let handle = schedule_timeout(
        Arc::clone(&auto),
        PackageState::Shipped,
        Duration::from_millis(50),
    );
    handle.join().await;

    let auto = auto.lock().expect("no other holder panicked");
    if let Some(last) = auto.history().last() {
        println!("  {last}");
    }

    // Checkpoint and restore
    println!("\n=== Checkpoint ===\n");
    let json = auto
        .checkpoint()
        .to_json()
        .expect("checkpoint serializes");
    let checkpoint: Checkpoint<PackageState> =
        Checkpoint::from_json(&json).expect("checkpoint deserializes");
    let restored = Package::restore(checkpoint).expect("checkpoint is consistent");
    println!(
        "  restored {} in state {} with {} history entries",
        restored.id(),
        restored.current_state(),
        restored.history().len()
    );

    println!("\n=== Example Complete ===");
}

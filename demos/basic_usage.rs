//! Basic usage example for xref-registry.
//!
//! Demonstrates:
//! - Fragments submitting implementor lists before any viewer exists
//! - Installing a `SharedIndex` viewer that drains the backlog
//! - Fragments arriving after install being delivered immediately
//! - Structured `tracing` logs from the registry
//!
//! Run with: `RUST_LOG=xref_registry=debug cargo run --example basic_usage`

use tracing_subscriber::EnvFilter;
use xref_registry::{define_registry, RegistryError, SharedIndex};

// Process-wide registry for implementors of `core::fmt::Debug`
define_registry!(debug_implementors, String);

const EVENT_FRAGMENT: &str = r#"{
    "winit": [
        "impl Debug for Event",
        "impl Debug for WindowEvent",
        "impl Debug for DeviceEvent"
    ]
}"#;

const LOOP_FRAGMENT: &str = r#"{
    "winit": ["impl Debug for ControlFlow"],
    "glutin": ["impl Debug for ContextBuilder"]
}"#;

fn main() -> Result<(), RegistryError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== xref-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Fragments load before the viewer
    // -------------------------------------------------------------------------
    println!("1. Loading a fragment before the viewer is ready...");

    debug_implementors::registry().submit_fragment(EVENT_FRAGMENT)?;

    println!(
        "   Pending batches: {}",
        debug_implementors::pending_len()
    );

    // -------------------------------------------------------------------------
    // 2. The viewer installs its consumer
    // -------------------------------------------------------------------------
    println!("\n2. Installing the viewer...");

    let index = SharedIndex::new();
    debug_implementors::install(index.clone())?;

    println!(
        "   Installed: {}, pending batches: {}",
        debug_implementors::is_installed(),
        debug_implementors::pending_len()
    );

    // -------------------------------------------------------------------------
    // 3. Later fragments are delivered immediately
    // -------------------------------------------------------------------------
    println!("\n3. Loading another fragment...");

    debug_implementors::registry().submit_fragment(LOOP_FRAGMENT)?;

    for subject in index.subjects() {
        println!("   {subject}:");
        for record in index.records(&subject).unwrap_or_default() {
            println!("     - {record}");
        }
    }

    let stats = debug_implementors::stats();
    println!(
        "\n   submitted: {}, delivered: {}, pending: {}",
        stats.submitted, stats.delivered, stats.pending
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}

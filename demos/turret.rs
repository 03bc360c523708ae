//! Turret State Machine
//!
//! This example drives a small turret through queued requests.
//!
//! Key concepts:
//! - Named states and transitions in a shared registry
//! - Shortest routes through intermediate states
//! - Suspending states resumed from another thread
//! - State and destination events
//!
//! Run with: RUST_LOG=waypoint=debug cargo run --example turret

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use waypoint::{edges, ActionResult, FsmBuilder, FsmHandle, Registry};

fn announce(message: &'static str) -> impl Fn(&u32) -> ActionResult + Send + Sync {
    move |_: &u32| {
        println!("{message}");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Turret State Machine ===\n");

    let registry: Arc<Registry<u32>> = Arc::new(Registry::new());

    // Transitions
    registry.register_transition("loading", announce("Loading..."))?;
    registry.register_transition("aiming", |_| {
        for tick in 0..=3 {
            println!("  aiming {tick}");
            thread::sleep(Duration::from_millis(50));
        }
        Ok(())
    })?;

    // States; `load` and `fire` wait for an external go-ahead
    registry.register_state("idle", announce("Idling..."))?;
    registry.register_suspending_state("load", announce("Loaded"))?;
    registry.register_state("aim", announce("Aimed."))?;
    registry.register_suspending_state("fire", |shots| {
        println!("{shots} shots fired!");
        Ok(())
    })?;
    registry.register_state("release", announce("Released"))?;

    let mut fsm = FsmBuilder::new(Arc::clone(&registry))
        .initial("idle")
        .edges(edges![
            "idle" => "load" : "loading",
            "load" => "aim" : "aiming",
            "aim" => "fire",
            "fire" => "idle",
        ])
        .build()?;

    fsm.on_state_reached(|| {
        println!("  reached a state");
        Ok(())
    })
    .on_destination_reached(|| {
        println!("  reached the destination");
        Ok(())
    });

    fsm.call_with("fire", 5)?
        .call("idle")?
        .call_with("fire", 17)?
        .call("aim")?
        .call("idle")?;

    let handle = FsmHandle::new(fsm);
    handle.run()?;

    // Stand-in for a hardware callback arriving on its own thread
    while handle.run_mode().is_parked() {
        info!(state = %handle.current_state(), "waiting for callback");
        let remote = handle.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.resume()
        })
        .join()
        .map_err(|_| "callback thread panicked")??;
    }

    println!("\nFinal state: {}", handle.current_state());
    println!("Steps taken: {}", handle.with(|fsm| fsm.history().len()));
    println!("\n=== Example Complete ===");
    Ok(())
}

// Pattern 1: Creational Patterns - Lazy Singleton Registry
// Demonstrates one-construction-per-type guarantees, argument handling after
// the first call, racing initializers, and fallible construction with retry.
//
// Run with: cargo run --bin p1_singleton_registry

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use classic_patterns::singleton::Registry;
use thiserror::Error;

// ============================================================================
// Example: Lazy Construction
// ============================================================================

struct Settings {
    source: String,
    verbose: bool,
}

fn lazy_construction_example() {
    let registry = Registry::new();
    println!("Registry starts empty: {}", registry.is_empty());

    let settings = registry.get_or_init(|| {
        println!("  (constructing Settings now)");
        Settings {
            source: "defaults".to_string(),
            verbose: false,
        }
    });

    println!("Settings constructed from: {}", settings.source);
    println!("Verbose mode: {}", settings.verbose);
    println!("Registry now holds {} instance(s)", registry.len());
}

// ============================================================================
// Example: Arguments Ignored After First Call
// ============================================================================

fn arguments_ignored_example() {
    let registry = Registry::new();

    let first = registry.get_or_init(|| Settings {
        source: "FOO".to_string(),
        verbose: true,
    });
    let second = registry.get_or_init(|| Settings {
        source: "BAR".to_string(),
        verbose: false,
    });

    println!("First call source:  {}", first.source);
    println!("Second call source: {} (BAR was ignored)", second.source);
    println!("Same instance: {}", Arc::ptr_eq(&first, &second));
}

// ============================================================================
// Example: Racing Initializers
// ============================================================================

fn racing_initializers_example() {
    const WORKERS: usize = 4;

    let registry = Registry::new();
    let constructions = AtomicUsize::new(0);
    let barrier = Barrier::new(WORKERS);

    thread::scope(|s| {
        for worker in 0..WORKERS {
            let registry = &registry;
            let constructions = &constructions;
            let barrier = &barrier;
            s.spawn(move || {
                // Line everybody up so the first-time calls actually race.
                barrier.wait();
                let settings = registry.get_or_init(|| {
                    constructions.fetch_add(1, Ordering::SeqCst);
                    Settings {
                        source: format!("worker-{}", worker),
                        verbose: false,
                    }
                });
                println!("  worker {} sees settings from {}", worker, settings.source);
            });
        }
    });

    println!(
        "{} workers raced, {} construction(s) happened",
        WORKERS,
        constructions.load(Ordering::SeqCst)
    );
}

// ============================================================================
// Example: Fallible Construction With Retry
// ============================================================================

#[derive(Debug, Error)]
#[error("settings source unavailable: {reason}")]
struct SourceUnavailable {
    reason: String,
}

fn load_settings(available: bool) -> Result<Settings, SourceUnavailable> {
    if available {
        Ok(Settings {
            source: "network".to_string(),
            verbose: true,
        })
    } else {
        Err(SourceUnavailable {
            reason: "connection refused".to_string(),
        })
    }
}

fn fallible_construction_example() {
    let registry = Registry::new();

    match registry.try_get_or_init(|| load_settings(false)) {
        Ok(_) => println!("First attempt: unexpectedly succeeded"),
        Err(e) => println!("First attempt failed: {}", e),
    }
    println!("Slot left empty for retry: {}", registry.is_empty());

    match registry.try_get_or_init(|| load_settings(true)) {
        Ok(settings) => println!("Retry succeeded, source: {}", settings.source),
        Err(e) => println!("Retry failed: {}", e),
    }
}

fn main() {
    println!("Pattern 1: Lazy Singleton Registry");
    println!("===================================\n");

    println!("=== Lazy Construction ===");
    lazy_construction_example();
    println!();

    println!("=== Arguments Ignored After First Call ===");
    arguments_ignored_example();
    println!();

    println!("=== Racing Initializers ===");
    racing_initializers_example();
    println!();

    println!("=== Fallible Construction With Retry ===");
    fallible_construction_example();

    println!("\n=== Key Points ===");
    println!("1. The registry is a value you pass around, not ambient global state");
    println!("2. The lock is taken before the existence check, so exactly one constructor runs");
    println!("3. Constructor arguments on later calls are silently ignored");
    println!("4. A failed construction leaves the slot empty, so a later call can retry");
}

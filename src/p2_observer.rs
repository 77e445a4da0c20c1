// Pattern 2: Behavioral Patterns - Observer
// Demonstrates the trait-object subject (notification in attachment order,
// detach by identity) and the channel-based publisher across threads.
//
// Run with: cargo run --bin p2_observer

use std::sync::{Arc, Mutex};
use std::thread;

use classic_patterns::observer::{Observer, Publisher, Subject};

// ============================================================================
// Example: Trait-Object Observer
// ============================================================================

#[derive(Clone)]
struct PriceUpdate {
    symbol: String,
    price: f64,
}

struct TickerDisplay {
    name: String,
}

impl Observer<PriceUpdate> for TickerDisplay {
    fn notify(&mut self, event: &PriceUpdate) {
        println!("  {} display: {} @ {:.2}", self.name, event.symbol, event.price);
    }
}

struct PriceLogger {
    history: Vec<f64>,
}

impl Observer<PriceUpdate> for PriceLogger {
    fn notify(&mut self, event: &PriceUpdate) {
        self.history.push(event.price);
        println!(
            "  logger: {} @ {:.2} ({} updates so far)",
            event.symbol,
            event.price,
            self.history.len()
        );
    }
}

fn trait_object_example() {
    let mut feed: Subject<PriceUpdate> = Subject::new();

    let display: Arc<Mutex<dyn Observer<PriceUpdate> + Send>> =
        Arc::new(Mutex::new(TickerDisplay {
            name: "Main".to_string(),
        }));
    let logger: Arc<Mutex<dyn Observer<PriceUpdate> + Send>> =
        Arc::new(Mutex::new(PriceLogger {
            history: Vec::new(),
        }));

    feed.attach(Arc::clone(&display));
    feed.attach(Arc::clone(&logger));

    println!("Two observers attached, notified in attachment order:");
    feed.emit(&PriceUpdate {
        symbol: "RUST".to_string(),
        price: 101.5,
    });

    feed.detach(&display);
    println!("Display detached, {} observer left:", feed.observer_count());
    feed.emit(&PriceUpdate {
        symbol: "RUST".to_string(),
        price: 102.0,
    });
}

// ============================================================================
// Example: Channel-Based Observer Across Threads
// ============================================================================

fn channel_example() {
    let mut publisher: Publisher<PriceUpdate> = Publisher::new();

    let rx1 = publisher.subscribe();
    let rx2 = publisher.subscribe();

    let h1 = thread::spawn(move || {
        if let Ok(event) = rx1.recv() {
            println!("  subscriber 1: {} @ {:.2}", event.symbol, event.price);
        }
    });
    let h2 = thread::spawn(move || {
        if let Ok(event) = rx2.recv() {
            println!("  subscriber 2: {} @ {:.2}", event.symbol, event.price);
        }
    });

    publisher.publish(PriceUpdate {
        symbol: "RUST".to_string(),
        price: 103.25,
    });

    h1.join().unwrap();
    h2.join().unwrap();
    println!("Live subscribers after publish: {}", publisher.subscriber_count());
}

fn main() {
    println!("Pattern 2: Observer");
    println!("====================\n");

    println!("=== Trait-Object Observer ===");
    trait_object_example();
    println!();

    println!("=== Channel-Based Observer ===");
    channel_example();

    println!("\n=== Key Points ===");
    println!("1. The subject notifies observers in the order they attached");
    println!("2. Detach matches by Arc identity, so only that observer is removed");
    println!("3. Channels let observers live on their own threads");
    println!("4. Disconnected subscribers are pruned on the next publish");
}

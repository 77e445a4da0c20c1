//! Observer pattern, in two forms: the classic trait-object subject and the
//! channel-based publisher that fits Rust's ownership model better.

use std::sync::{Arc, Mutex};

use crossbeam::channel::{unbounded, Receiver, Sender};

/// An observer of events of type `E`.
pub trait Observer<E> {
    fn notify(&mut self, event: &E);
}

/// A subject that pushes each event to every attached observer.
///
/// Observers are notified in attachment order. Detaching removes exactly the
/// handle passed in, matched by `Arc` identity.
pub struct Subject<E> {
    observers: Vec<Arc<Mutex<dyn Observer<E> + Send>>>,
}

impl<E> Subject<E> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn attach(&mut self, observer: Arc<Mutex<dyn Observer<E> + Send>>) {
        self.observers.push(observer);
    }

    pub fn detach(&mut self, observer: &Arc<Mutex<dyn Observer<E> + Send>>) {
        self.observers
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Notifies every attached observer, in attachment order.
    pub fn emit(&self, event: &E) {
        for observer in &self.observers {
            observer.lock().unwrap().notify(event);
        }
    }
}

impl<E> Default for Subject<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Channel-based observer: subscribers receive events on their own channel
/// and can live on other threads. Disconnected subscribers are pruned on the
/// next publish.
pub struct Publisher<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> Publisher<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: E) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> Default for Publisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

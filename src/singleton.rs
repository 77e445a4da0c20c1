//! Lazy Singleton Registry.
//!
//! The classic Singleton hides one global instance behind a static access
//! point. That makes tests share state, so this module inverts it: the
//! [`Registry`] is an ordinary value you create and pass around, and each
//! type it manages is constructed at most once *per registry*. Tests get a
//! fresh registry per case; an application creates one and threads it
//! through as a dependency.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A stored instance, type-erased. The `TypeId` key restores the type.
type Slot = Arc<dyn Any + Send + Sync>;

/// A lazily populated registry holding at most one instance per type.
///
/// The first `get_or_init` call for a type runs the supplied constructor and
/// stores the result; every later call for that type returns the stored
/// instance and drops its constructor unused. Under concurrent first-time
/// calls, exactly one constructor runs: the lock is taken unconditionally
/// before the existence check and held across construction, so two threads
/// can never both observe an empty slot.
///
/// ```
/// use classic_patterns::singleton::Registry;
///
/// struct Settings { source: String }
///
/// let registry = Registry::new();
/// let first = registry.get_or_init(|| Settings { source: "file".into() });
/// let again = registry.get_or_init(|| Settings { source: "env".into() });
///
/// // Second constructor was ignored; both handles are the same instance.
/// assert_eq!(again.source, "file");
/// assert!(std::sync::Arc::ptr_eq(&first, &again));
/// ```
pub struct Registry {
    slots: Mutex<HashMap<TypeId, Slot>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the instance of `T`, constructing it on the first call.
    ///
    /// Constructors passed on later calls (and whatever arguments they
    /// capture) are silently ignored. No ordering is promised between racing
    /// first callers; whichever one wins supplies the instance everybody gets.
    pub fn get_or_init<T, F>(&self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get(&TypeId::of::<T>()) {
            return downcast(slot);
        }
        let instance = Arc::new(init());
        let slot: Slot = instance.clone();
        slots.insert(TypeId::of::<T>(), slot);
        instance
    }

    /// Fallible variant of [`get_or_init`](Registry::get_or_init).
    ///
    /// A constructor error propagates to the caller and the slot stays
    /// empty, so a later call may retry construction.
    pub fn try_get_or_init<T, E, F>(&self, init: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, E>,
    {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get(&TypeId::of::<T>()) {
            return Ok(downcast(slot));
        }
        let instance = Arc::new(init()?);
        let slot: Slot = instance.clone();
        slots.insert(TypeId::of::<T>(), slot);
        Ok(instance)
    }

    /// Returns the instance of `T` if one has been constructed. Never
    /// constructs.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.lock_slots().get(&TypeId::of::<T>()).map(downcast)
    }

    /// Number of types with a constructed instance.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<TypeId, Slot>> {
        // A constructor that panics poisons the mutex without having written
        // anything: insertion happens only after construction returns. The
        // map is intact, so recover it and leave the slot empty for a retry.
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T>(slot: &Slot) -> Arc<T>
where
    T: Send + Sync + 'static,
{
    match Arc::clone(slot).downcast::<T>() {
        Ok(instance) => instance,
        Err(_) => unreachable!("slot holds the type its TypeId key was derived from"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use thiserror::Error;

    struct Settings {
        source: String,
    }

    impl Settings {
        fn new(source: &str) -> Self {
            Self {
                source: source.to_string(),
            }
        }
    }

    struct Counter {
        value: u64,
    }

    #[derive(Debug, Error, PartialEq)]
    #[error("settings source unavailable")]
    struct SourceUnavailable;

    #[test]
    fn constructs_once_and_returns_same_instance() {
        let registry = Registry::new();
        let constructions = AtomicUsize::new(0);

        let first = registry.get_or_init(|| {
            constructions.fetch_add(1, Ordering::SeqCst);
            Settings::new("file")
        });
        let again = registry.get_or_init(|| {
            constructions.fetch_add(1, Ordering::SeqCst);
            Settings::new("env")
        });

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn later_arguments_are_ignored() {
        let registry = Registry::new();

        let first = registry.get_or_init(|| Settings::new("FOO"));
        let second = registry.get_or_init(|| Settings::new("BAR"));

        assert_eq!(second.source, "FOO");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn concurrent_first_calls_construct_exactly_once() {
        const THREADS: usize = 8;

        let registry = Registry::new();
        let constructions = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let handles: Vec<Arc<Settings>> = thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|worker| {
                    let registry = &registry;
                    let constructions = &constructions;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        registry.get_or_init(|| {
                            constructions.fetch_add(1, Ordering::SeqCst);
                            Settings::new(&format!("worker-{}", worker))
                        })
                    })
                })
                .collect();
            workers.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
    }

    #[test]
    fn racing_arguments_have_one_winner() {
        let registry = Registry::new();
        let barrier = Barrier::new(2);

        let (foo, bar) = thread::scope(|s| {
            let foo = {
                let (registry, barrier) = (&registry, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    registry.get_or_init(|| Settings::new("FOO"))
                })
            };
            let bar = {
                let (registry, barrier) = (&registry, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    registry.get_or_init(|| Settings::new("BAR"))
                })
            };
            (foo.join().unwrap(), bar.join().unwrap())
        });

        // Either argument set may win, but never both.
        assert!(Arc::ptr_eq(&foo, &bar));
        assert!(foo.source == "FOO" || foo.source == "BAR");
    }

    #[test]
    fn failed_construction_leaves_slot_empty_for_retry() {
        let registry = Registry::new();

        let failed: Result<Arc<Settings>, _> =
            registry.try_get_or_init(|| Err(SourceUnavailable));
        assert_eq!(failed.err(), Some(SourceUnavailable));
        assert!(registry.is_empty());

        let retried = registry
            .try_get_or_init(|| Ok::<_, SourceUnavailable>(Settings::new("retry")))
            .unwrap();
        assert_eq!(retried.source, "retry");
    }

    #[test]
    fn panicking_constructor_does_not_wedge_the_registry() {
        let registry = Registry::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registry.get_or_init::<Settings, _>(|| panic!("constructor exploded"));
        }));
        assert!(outcome.is_err());
        assert!(registry.is_empty());

        let settings = registry.get_or_init(|| Settings::new("after"));
        assert_eq!(settings.source, "after");
    }

    #[test]
    fn peek_never_constructs() {
        let registry = Registry::new();
        assert!(registry.get::<Settings>().is_none());

        registry.get_or_init(|| Settings::new("file"));
        let peeked = registry.get::<Settings>().unwrap();
        assert_eq!(peeked.source, "file");
    }

    #[test]
    fn distinct_types_occupy_independent_slots() {
        let registry = Registry::new();

        let settings = registry.get_or_init(|| Settings::new("file"));
        let counter = registry.get_or_init(|| Counter { value: 7 });

        assert_eq!(registry.len(), 2);
        assert_eq!(settings.source, "file");
        assert_eq!(counter.value, 7);
    }

    #[test]
    fn independent_registries_do_not_share_instances() {
        let a = Registry::new();
        let b = Registry::new();

        let from_a = a.get_or_init(|| Settings::new("a"));
        let from_b = b.get_or_init(|| Settings::new("b"));

        assert!(!Arc::ptr_eq(&from_a, &from_b));
        assert_eq!(from_b.source, "b");
    }

    proptest! {
        // However many callers follow, the first constructor's value sticks.
        #[test]
        fn first_constructor_wins(labels in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
            let registry = Registry::new();
            let first = registry.get_or_init(|| Settings::new(&labels[0]));

            for label in &labels {
                let again = registry.get_or_init(|| Settings::new(label));
                prop_assert!(Arc::ptr_eq(&first, &again));
                prop_assert_eq!(&again.source, &labels[0]);
            }
        }
    }
}

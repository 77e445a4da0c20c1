// Classic Design Patterns Catalog
// Library modules for the runnable pattern demonstrations in this crate.

//! # Classic Design Patterns
//!
//! Small, self-contained demonstrations of classic object-oriented design
//! patterns, reworked into idiomatic Rust:
//!
//! ## Pattern 1: Creational Patterns
//! - Lazy Singleton Registry ([`singleton::Registry`]): lock-guarded,
//!   one construction per type, dependency-injected instead of global
//!
//! ## Pattern 2: Behavioral Patterns
//! - Observer Pattern ([`observer::Subject`]): trait objects, notification
//!   in attachment order
//! - Channel-based Observer ([`observer::Publisher`]): the more idiomatic
//!   Rust form
//!
//! Run individual demonstrations with:
//! ```bash
//! cargo run --bin p1_singleton_registry
//! cargo run --bin p2_observer
//! ```

pub mod observer;
pub mod singleton;

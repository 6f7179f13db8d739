//! # Roadwork Testkit
//!
//! Test utilities for the roadwork sync engine.
//!
//! This crate provides:
//! - Store fixtures and seeded scenarios
//! - A fault-injecting store wrapper
//! - Property-based test generators using proptest
//! - Concurrent-edit stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use roadwork_store::{Collection, Filter};
//! use roadwork_testkit::prelude::*;
//!
//! with_memory_store(|store| {
//!     seed_pending(store, Collection::Signalements, 3);
//!     assert_eq!(store.count(Collection::Signalements, &Filter::pending()), 3);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;

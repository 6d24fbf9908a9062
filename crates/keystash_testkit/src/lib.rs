//! # KeyStash Testkit
//!
//! Test utilities for KeyStash.
//!
//! This crate provides:
//! - Temporary on-disk stores that clean up after themselves
//! - A fault-injecting file backend for crash-safety tests
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use keystash_testkit::prelude::*;
//!
//! let mut fixture = TempStore::new();
//! fixture.store.set("k", b"v").unwrap();
//!
//! let reopened = fixture.reopen();
//! assert!(reopened.contains("k"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;

//! # KeyStash Core
//!
//! A small, durable, local key-value store for opaque binary blobs such as
//! credentials, session keys and pairing metadata.
//!
//! This crate provides:
//! - [`Document`] / [`Section`]: the line-oriented text snapshot format
//! - [`KeyStore`]: get/set/delete over one flat namespace, with every mutation
//!   committed as a complete snapshot through an atomic replace
//! - [`SharedKeyStore`]: a mutex-serialized handle for multi-threaded callers
//! - [`StoreConfig`]: backing path, durability and locking options
//!
//! Values are arbitrary bytes (up to 65535). On disk they are stored as
//! printable tokens produced by `keystash_codec`, so zero bytes and
//! non-printable bytes round-trip exactly through the text file.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod format;
mod lock;
mod shared;
mod store;

pub use config::{CommitFailurePolicy, StoreConfig, LOCK_SUFFIX};
pub use error::{StoreError, StoreResult};
pub use format::{Document, Section};
pub use lock::StoreLock;
pub use shared::SharedKeyStore;
pub use store::{KeyStore, DEFAULT_SECTION, MAX_VALUE_LEN};

pub use keystash_storage::{FileBackend, InMemoryBackend, SnapshotBackend, StorageError};

/// Version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

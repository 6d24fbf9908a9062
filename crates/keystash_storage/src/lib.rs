//! # KeyStash Storage
//!
//! Snapshot storage backends for KeyStash.
//!
//! A KeyStash store is persisted as one complete snapshot at a time. Backends
//! in this crate hold that snapshot as **opaque bytes** and swap it atomically;
//! they know nothing about the text format written into it.
//!
//! ## Design Principles
//!
//! - One snapshot per backend (load, replace)
//! - `replace` is all-or-nothing: no partially written snapshot is observable
//! - No knowledge of sections, keys or encoded values
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - Temp file plus atomic rename on the OS file system
//!
//! ## Example
//!
//! ```rust
//! use keystash_storage::{InMemoryBackend, SnapshotBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.replace(b"hello world").unwrap();
//! assert_eq!(backend.load().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::{temp_path_for, FileBackend, TEMP_SUFFIX};
pub use memory::InMemoryBackend;

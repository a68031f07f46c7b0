//! # Campus Storage
//!
//! Snapshot storage backends for the Campus record store.
//!
//! This crate provides the lowest-level storage abstraction for Campus.
//! Backends are **opaque snapshot stores** - they hold one blob of bytes
//! and replace it wholesale. They do not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends hold exactly one snapshot (load, persist)
//! - No knowledge of record formats or collections
//! - `persist` replaces the snapshot atomically and durably
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use campus_storage::{SnapshotBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.persist(b"hello world").unwrap();
//! assert_eq!(backend.load().unwrap().as_deref(), Some(&b"hello world"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;

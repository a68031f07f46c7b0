//! # Campus Core
//!
//! Generic record store engine for Campus.
//!
//! This crate provides:
//! - [`RecordId`] - allocator-issued surrogate identifiers
//! - [`Record`] - the trait persisted types implement
//! - [`EntityStore`] - a durable, thread-safe collection of one record kind
//! - [`IdAllocator`] - crash-recoverable monotonic id counters per kind
//!
//! ## Persistence model
//!
//! Stores are **snapshot-on-write**: every mutation serializes the whole
//! in-memory collection back to its backend before returning. Reads take
//! a shared lock; the full read-modify-persist sequence of a mutation
//! runs under the exclusive lock, so check-then-act guards composed on
//! top of [`EntityStore::mutate`] are atomic with respect to other
//! mutations on the same store.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod alloc;
pub mod codec;
mod error;
mod id;
mod record;
mod store;

pub use alloc::IdAllocator;
pub use error::{CoreError, CoreResult};
pub use id::RecordId;
pub use record::Record;
pub use store::EntityStore;

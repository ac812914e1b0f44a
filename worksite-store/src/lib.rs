// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator contracts for worksite, plus in-memory
//! implementations of both.
//!
//! Higher layers never talk to a concrete backend. They are written against
//! two traits: [`DocumentStore`], a document-oriented store addressing
//! documents by collection name and id, and [`BlobStore`], a write-once blob
//! backend addressed by path and reference URL.
//!
//! Timestamps that matter (creation and update stamps) are obtained from the
//! document store's own clock via [`DocumentStore::server_time`], never from
//! the caller's clock, so stamps stay consistent across callers with skewed
//! clocks.
//!
//! The in-memory implementations ([`MemoryStore`], [`MemoryBlobStore`])
//! support usage in asynchronous and multi-threaded contexts by wrapping
//! their state with an `RwLock` and `Arc`; cloning a store yields another
//! handle onto the same state.

mod blobs;
mod memory;
mod traits;

pub use blobs::MemoryBlobStore;
pub use memory::{MemoryStore, MemoryStoreError};
pub use traits::{BlobStore, DocumentStore};

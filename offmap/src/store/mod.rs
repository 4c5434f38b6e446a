//! Tile storage abstraction.
//!
//! The [`TileStore`] trait provides a domain-agnostic key-value interface for
//! persisted tiles. All backends implement this trait, allowing the fetcher,
//! downloader and stats reporter to use any durable medium through a
//! consistent interface.
//!
//! # Design Principles
//!
//! - **String keys**: the persisted form is `"{z}_{x}_{y}"` (see
//!   [`crate::coord::TileCoord::key`]); human-readable in logs and on disk,
//!   and forward compatible with previously cached data
//! - **`Vec<u8>` values**: raw image payloads, no serialization opinions
//! - **Dyn-compatible**: `Pin<Box<dyn Future>>` so components hold
//!   `Arc<dyn TileStore>` and tests can inject an in-memory double
//!
//! The store is the only component that performs durable writes; everything
//! else treats it as a service boundary.

mod disk;
mod memory;

pub use disk::{DiskStoreConfig, DiskTileStore};
pub use memory::MemoryTileStore;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error on the persistent medium.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing directory could not be prepared.
    #[error("failed to prepare store directory {path}: {source}")]
    Directory {
        path: String,
        source: std::io::Error,
    },
}

/// Persistent key-value store for tile payloads.
///
/// All operations are idempotent. `set` on an existing key overwrites it;
/// the normal download flow never exercises that because of the existence
/// check in the fetcher, but backends must support it, and concurrent
/// check-then-write races on the same key must degrade to a benign redundant
/// write (payloads for a coordinate are deterministic).
pub trait TileStore: Send + Sync {
    /// Retrieve a tile payload by key.
    ///
    /// Returns `Ok(None)` on a miss. Backends that hit a read error on a
    /// present entry should degrade to a miss rather than fail the caller.
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>>;

    /// Store a tile payload under the given key, overwriting any existing
    /// entry.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Check whether a key is present without retrieving the payload.
    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Enumerate all stored tile keys.
    ///
    /// Order is unspecified. Backends sharing their medium with foreign data
    /// must return only entries they own.
    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    /// Remove all entries.
    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}

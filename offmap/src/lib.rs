//! Offmap - offline slippy-map tile cache
//!
//! This library makes a geographic area available offline: it translates a
//! center point and radius into the set of Web Mercator raster tiles covering
//! it across a zoom range, fetches each tile exactly once, persists it in a
//! pluggable [`store::TileStore`], and reports on cache coverage.
//!
//! # Architecture
//!
//! - [`coord`] - geographic/tile coordinate conversions and area enumeration
//! - [`store`] - persistent key-value tile storage (disk and in-memory)
//! - [`provider`] - tile endpoint configuration and the HTTP transport seam
//! - [`fetch`] - single-tile resolution against the store and network
//! - [`download`] - batched, rate-paced, cancellable area downloads
//! - [`stats`] - derived cache coverage reporting
//! - [`service`] - the facade the surrounding application consumes
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use offmap::service::TileService;
//! use offmap::store::{DiskStoreConfig, DiskTileStore};
//!
//! let store = Arc::new(DiskTileStore::new(DiskStoreConfig::default())?);
//! let service = TileService::with_defaults(store)?;
//!
//! // Cache 2 km around the venue for offline use.
//! let ok = service.download_and_store_tiles(17.117, 82.253, 2.0).await;
//! let stats = service.cache_stats().await?;
//! ```

pub mod coord;
pub mod download;
pub mod fetch;
pub mod logging;
pub mod provider;
pub mod service;
pub mod stats;
pub mod store;

pub use coord::{GeoBounds, GeoPoint, TileCoord};
pub use download::{DownloadConfig, DownloadError, DownloadReport};
pub use fetch::{FetchOutcome, TileFetcher};
pub use service::{TileService, TileUrl};
pub use stats::CacheStats;
pub use store::{DiskStoreConfig, DiskTileStore, MemoryTileStore, TileStore};

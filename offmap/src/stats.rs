//! Cache coverage reporting.
//!
//! Statistics are derived, never stored: every report re-enumerates the
//! store's keys, so the numbers cannot drift from the actual cache contents.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::coord::TileCoord;
use crate::store::{StoreError, TileStore};

/// Summary of cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached tiles.
    pub tile_count: usize,
    /// Distinct zoom levels present, ascending.
    pub zoom_levels: Vec<u8>,
}

/// Reports on the coverage of a [`TileStore`].
pub struct StatsReporter {
    store: Arc<dyn TileStore>,
}

impl StatsReporter {
    /// Create a reporter over the given store.
    pub fn new(store: Arc<dyn TileStore>) -> Self {
        Self { store }
    }

    /// Compute current cache statistics from the store's key set.
    ///
    /// Keys that do not decode as tile keys (garbage from prior schema
    /// versions or foreign writers) are skipped with a warning; they still
    /// count toward nothing.
    pub async fn stats(&self) -> Result<CacheStats, StoreError> {
        let keys = self.store.keys().await?;

        let mut tile_count = 0;
        let mut zooms = BTreeSet::new();
        for key in &keys {
            match TileCoord::from_key(key) {
                Ok(tile) => {
                    tile_count += 1;
                    zooms.insert(tile.zoom);
                }
                Err(_) => {
                    warn!(key = %key, "skipping malformed cache key");
                }
            }
        }

        Ok(CacheStats {
            tile_count,
            zoom_levels: zooms.into_iter().collect(),
        })
    }

    /// Whether a specific tile is already cached.
    pub async fn tile_exists(&self, tile: TileCoord) -> Result<bool, StoreError> {
        self.store.contains(&tile.key()).await
    }

    /// Remove every cached tile.
    pub async fn clear_cache(&self) -> Result<(), StoreError> {
        self.store.clear().await
    }
}

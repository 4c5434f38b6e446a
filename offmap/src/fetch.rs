//! Single-tile fetch with cache check.
//!
//! [`TileFetcher`] resolves one tile coordinate against the store and, on a
//! miss, against the network. Per-tile failures never escape: transport
//! errors, bad statuses and store write failures all collapse into
//! [`FetchOutcome::Failed`] so batch orchestration can keep counting instead
//! of aborting.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::coord::TileCoord;
use crate::provider::{HttpClient, TileProvider};
use crate::store::TileStore;

/// Result of resolving one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The tile was already in the store; no network access happened.
    CacheHit,
    /// The tile was fetched from the network and written to the store.
    Downloaded,
    /// The tile could not be made available (network or storage failure).
    Failed,
}

impl FetchOutcome {
    /// Whether the tile is now available locally.
    pub fn is_success(self) -> bool {
        !matches!(self, FetchOutcome::Failed)
    }
}

/// Fetches individual tiles, writing them through to a [`TileStore`].
pub struct TileFetcher<C: HttpClient> {
    store: Arc<dyn TileStore>,
    provider: TileProvider,
    client: C,
}

impl<C: HttpClient> TileFetcher<C> {
    /// Create a fetcher over the given store, provider and HTTP client.
    pub fn new(store: Arc<dyn TileStore>, provider: TileProvider, client: C) -> Self {
        Self {
            store,
            provider,
            client,
        }
    }

    /// The store this fetcher writes through to.
    pub fn store(&self) -> &Arc<dyn TileStore> {
        &self.store
    }

    /// The provider tiles are fetched from.
    pub fn provider(&self) -> &TileProvider {
        &self.provider
    }

    /// The HTTP client used for network fetches.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Make one tile available locally.
    ///
    /// Checks the store first and returns [`FetchOutcome::CacheHit`] without
    /// touching the network if the tile is present. Otherwise downloads the
    /// tile and writes it through. A store read error is treated as a miss; a
    /// fetch or write error yields [`FetchOutcome::Failed`] and leaves the
    /// store untouched.
    pub async fn fetch_and_cache(&self, tile: TileCoord) -> FetchOutcome {
        let key = tile.key();

        match self.store.get(&key).await {
            Ok(Some(_)) => {
                debug!(%tile, "tile already cached");
                return FetchOutcome::CacheHit;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%tile, error = %e, "store read failed, treating as miss");
            }
        }

        let url = self.provider.url_for(&tile);
        let payload = match self.client.get(&url).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%tile, %url, error = %e, "tile fetch failed");
                return FetchOutcome::Failed;
            }
        };

        match self.store.set(&key, payload).await {
            Ok(()) => {
                debug!(%tile, "tile downloaded and cached");
                FetchOutcome::Downloaded
            }
            Err(e) => {
                warn!(%tile, error = %e, "tile store write failed");
                FetchOutcome::Failed
            }
        }
    }
}

//! Public tile-cache operations.
//!
//! [`TileService`] is the surface the surrounding guide application talks
//! to: download an area for offline use, ask whether a tile is cached, build
//! tile URLs, and inspect or clear the cache. It wires a [`TileStore`], a
//! [`TileProvider`] and an HTTP client together; nothing here holds state of
//! its own.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::coord::{CoordError, GeoPoint, TileCoord};
use crate::download::{AreaDownloader, DownloadConfig, DownloadError, DownloadReport};
use crate::fetch::TileFetcher;
use crate::provider::{HttpClient, ProviderError, ReqwestClient, TileProvider};
use crate::stats::{CacheStats, StatsReporter};
use crate::store::{StoreError, TileStore};

/// Where a tile should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileUrl {
    /// The tile is cached locally under this store key.
    Cached { key: String },
    /// The tile is not cached; fetch it from this remote URL.
    Remote { url: String },
}

/// High-level facade over the offline tile cache.
pub struct TileService<C: HttpClient> {
    downloader: AreaDownloader<C>,
    reporter: StatsReporter,
}

impl TileService<ReqwestClient> {
    /// Create a service over the given store with the default OpenStreetMap
    /// provider, a real HTTP client and the default download configuration
    /// (zoom range 10–15, batches of 10, 100 ms pacing).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn with_defaults(store: Arc<dyn TileStore>) -> Result<Self, ProviderError> {
        let client = ReqwestClient::new()?;
        Ok(Self::new(
            store,
            TileProvider::default(),
            client,
            DownloadConfig::default(),
        ))
    }
}

impl<C: HttpClient> TileService<C> {
    /// Create a service from explicit parts.
    pub fn new(
        store: Arc<dyn TileStore>,
        provider: TileProvider,
        client: C,
        config: DownloadConfig,
    ) -> Self {
        let reporter = StatsReporter::new(store.clone());
        let fetcher = TileFetcher::new(store, provider, client);
        Self {
            downloader: AreaDownloader::new(fetcher, config),
            reporter,
        }
    }

    /// Download all tiles within `radius_km` of a point for the configured
    /// zoom range, collapsed to a boolean.
    ///
    /// Returns `true` whenever orchestration completed, even if individual
    /// tiles (or all of them) failed to download; only invalid input yields
    /// `false`. Callers that care about partial failure should use
    /// [`TileService::download_area`] and read the [`DownloadReport`].
    pub async fn download_and_store_tiles(&self, lat: f64, lon: f64, radius_km: f64) -> bool {
        match self
            .download_area(GeoPoint::new(lat, lon), radius_km, &CancellationToken::new())
            .await
        {
            Ok(_report) => true,
            Err(e) => {
                warn!(lat, lon, radius_km, error = %e, "area download failed to start");
                false
            }
        }
    }

    /// Download all tiles within `radius_km` of `center`, returning the
    /// structured report.
    ///
    /// The cancellation token is observed between batches, so a long download
    /// can be aborted from the UI.
    pub async fn download_area(
        &self,
        center: GeoPoint,
        radius_km: f64,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        self.downloader.download_area(center, radius_km, cancel).await
    }

    /// Whether the tile at `(zoom, x, y)` is cached locally.
    ///
    /// Storage errors degrade to `false`; a presence probe must never fail
    /// the caller.
    pub async fn tile_exists_locally(&self, zoom: u8, x: u32, y: u32) -> bool {
        let tile = TileCoord { x, y, zoom };
        match self.reporter.tile_exists(tile).await {
            Ok(present) => present,
            Err(e) => {
                warn!(%tile, error = %e, "tile presence check failed");
                false
            }
        }
    }

    /// The remote URL for a tile.
    ///
    /// Always returns the provider template regardless of cache state; this
    /// is the compatibility contract UI map widgets rely on. Use
    /// [`TileService::tile_url_preferring_cache`] to prefer cached data.
    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        self.downloader
            .fetcher()
            .provider()
            .url_for(&TileCoord { x, y, zoom })
    }

    /// The best source for a tile: the local cache entry when present,
    /// otherwise the remote URL.
    pub async fn tile_url_preferring_cache(&self, zoom: u8, x: u32, y: u32) -> TileUrl {
        let tile = TileCoord { x, y, zoom };
        if self.tile_exists_locally(zoom, x, y).await {
            TileUrl::Cached { key: tile.key() }
        } else {
            TileUrl::Remote {
                url: self.tile_url(zoom, x, y),
            }
        }
    }

    /// Raw payload of a cached tile, if present.
    pub async fn cached_tile(&self, zoom: u8, x: u32, y: u32) -> Result<Option<Vec<u8>>, StoreError> {
        let tile = TileCoord { x, y, zoom };
        self.downloader.fetcher().store().get(&tile.key()).await
    }

    /// Current cache coverage.
    pub async fn cache_stats(&self) -> Result<CacheStats, StoreError> {
        self.reporter.stats().await
    }

    /// Remove every cached tile.
    pub async fn clear_tile_cache(&self) -> Result<(), StoreError> {
        self.reporter.clear_cache().await
    }

    /// Parse a persisted cache key, e.g. for UI layers resolving
    /// [`TileUrl::Cached`] back to a coordinate.
    pub fn parse_key(key: &str) -> Result<TileCoord, CoordError> {
        TileCoord::from_key(key)
    }
}

//! Batch download orchestration.
//!
//! [`AreaDownloader`] drives the "make this area available offline"
//! operation: expand a center and radius into bounds, enumerate the covering
//! tiles for every zoom level in the configured range, and resolve them in
//! bounded-size batches with a pacing delay between batches. Within a batch
//! tile fetches fan out concurrently; batches and zoom levels are strictly
//! sequential, so peak in-flight requests never exceed the batch size.

use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coord::{bounds_from_radius, CoordError, GeoPoint, MAX_ZOOM};
use crate::fetch::{FetchOutcome, TileFetcher};
use crate::provider::HttpClient;

/// Default number of tiles fetched concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pacing delay between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Default zoom range used by the public download operation.
pub const DEFAULT_ZOOM_RANGE: (u8, u8) = (10, 15);

/// Errors that abort orchestration itself.
///
/// Individual tile failures are never errors; they are aggregated in the
/// [`DownloadReport`].
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The requested area could not be expanded into bounds.
    #[error(transparent)]
    Bounds(#[from] CoordError),

    /// Zoom range with `min > max`.
    #[error("invalid zoom range: {min} > {max}")]
    InvalidZoomRange { min: u8, max: u8 },

    /// Zoom range reaching past the supported maximum.
    #[error("zoom level {0} exceeds the maximum of {MAX_ZOOM}")]
    ZoomBeyondMax(u8),
}

/// Download configuration.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Lowest zoom level to download, inclusive.
    pub min_zoom: u8,
    /// Highest zoom level to download, inclusive.
    pub max_zoom: u8,
    /// Maximum tiles in flight at once.
    pub batch_size: usize,
    /// Pause between batches, bounding request rate against the provider.
    pub batch_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_ZOOM_RANGE.0,
            max_zoom: DEFAULT_ZOOM_RANGE.1,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl DownloadConfig {
    /// Set the inclusive zoom range.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set the batch size (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the pacing delay between batches.
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }
}

/// Aggregated result of an area download.
///
/// `succeeded_tiles` counts tiles available locally after the run, whether
/// freshly downloaded or already cached; `downloaded_tiles` counts only the
/// fresh network downloads. The surrounding application usually collapses
/// this into a boolean, but the structured report is the primary result so
/// callers can tell a full success from a 1% success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Tiles enumerated across all zoom levels that were started.
    pub total_tiles: usize,
    /// Tiles locally available after the run (cache hits + downloads).
    pub succeeded_tiles: usize,
    /// Tiles fetched over the network during this run.
    pub downloaded_tiles: usize,
    /// Tiles that could not be made available.
    pub failed_tiles: usize,
    /// Whether the run was cancelled before completing the zoom range.
    pub cancelled: bool,
}

impl DownloadReport {
    /// Whether every enumerated tile is now available locally.
    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.failed_tiles == 0 && self.succeeded_tiles == self.total_tiles
    }

    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::CacheHit => self.succeeded_tiles += 1,
            FetchOutcome::Downloaded => {
                self.succeeded_tiles += 1;
                self.downloaded_tiles += 1;
            }
            FetchOutcome::Failed => self.failed_tiles += 1,
        }
    }
}

/// Orchestrates batched area downloads over a [`TileFetcher`].
pub struct AreaDownloader<C: HttpClient> {
    fetcher: TileFetcher<C>,
    config: DownloadConfig,
}

impl<C: HttpClient> AreaDownloader<C> {
    /// Create a downloader with the given fetcher and configuration.
    pub fn new(fetcher: TileFetcher<C>, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// The fetcher used for individual tiles.
    pub fn fetcher(&self) -> &TileFetcher<C> {
        &self.fetcher
    }

    /// Download every tile covering `radius_km` around `center` for the
    /// configured zoom range.
    ///
    /// The cancellation token is checked before each batch; a cancelled run
    /// returns the partial report with `cancelled` set rather than an error.
    ///
    /// # Errors
    ///
    /// Only orchestration failures are errors: invalid center/radius input,
    /// a `min_zoom > max_zoom` configuration, or a zoom range reaching past
    /// [`MAX_ZOOM`]. All are rejected before any fetching starts. Per-tile
    /// fetch failures are reported as counters.
    pub async fn download_area(
        &self,
        center: GeoPoint,
        radius_km: f64,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        let config = &self.config;
        if config.min_zoom > config.max_zoom {
            return Err(DownloadError::InvalidZoomRange {
                min: config.min_zoom,
                max: config.max_zoom,
            });
        }
        // Whole-range validation up front; a mid-run enumeration error would
        // discard the counters for zoom levels already fetched.
        if config.max_zoom > MAX_ZOOM {
            return Err(DownloadError::ZoomBeyondMax(config.max_zoom));
        }

        let bounds = bounds_from_radius(center, radius_km)?;
        info!(
            ?center,
            radius_km,
            min_zoom = config.min_zoom,
            max_zoom = config.max_zoom,
            "starting area download"
        );

        let mut report = DownloadReport::default();
        let mut paced = false;

        'zooms: for zoom in config.min_zoom..=config.max_zoom {
            let tiles: Vec<_> = bounds.tiles(zoom)?.collect();
            report.total_tiles += tiles.len();
            debug!(zoom, tile_count = tiles.len(), "enumerated zoom level");

            for batch in tiles.chunks(config.batch_size) {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break 'zooms;
                }
                if paced && !config.batch_delay.is_zero() {
                    tokio::time::sleep(config.batch_delay).await;
                }
                paced = true;

                let outcomes =
                    join_all(batch.iter().map(|tile| self.fetcher.fetch_and_cache(*tile))).await;
                for outcome in outcomes {
                    report.record(outcome);
                }
            }
        }

        info!(
            total = report.total_tiles,
            succeeded = report.succeeded_tiles,
            downloaded = report.downloaded_tiles,
            failed = report.failed_tiles,
            cancelled = report.cancelled,
            "area download finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockHttpClient, ProviderError, TileProvider};
    use crate::store::{MemoryTileStore, TileStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CENTER: GeoPoint = GeoPoint {
        lat: 17.117,
        lon: 82.253,
    };

    fn downloader(
        client: MockHttpClient,
        config: DownloadConfig,
    ) -> (AreaDownloader<MockHttpClient>, Arc<MemoryTileStore>) {
        let store = Arc::new(MemoryTileStore::new());
        let fetcher = TileFetcher::new(store.clone(), TileProvider::default(), client);
        (AreaDownloader::new(fetcher, config), store)
    }

    fn fast_config(min_zoom: u8, max_zoom: u8) -> DownloadConfig {
        DownloadConfig::default()
            .with_zoom_range(min_zoom, max_zoom)
            .with_batch_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_downloads_every_tile_in_range() {
        let (downloader, store) = downloader(MockHttpClient::ok(vec![0xAB]), fast_config(10, 15));

        let report = downloader
            .download_area(CENTER, 1.0, &CancellationToken::new())
            .await
            .unwrap();

        // 1 tile at zooms 10-13, 4 at 14, 9 at 15 for a 1 km radius here
        assert_eq!(report.total_tiles, 17);
        assert_eq!(report.downloaded_tiles, 17);
        assert_eq!(report.succeeded_tiles, 17);
        assert_eq!(report.failed_tiles, 0);
        assert!(report.all_succeeded());
        assert_eq!(store.len(), 17);
    }

    #[tokio::test]
    async fn test_second_run_is_all_cache_hits() {
        let (downloader, _store) = downloader(MockHttpClient::ok(vec![1]), fast_config(14, 14));
        let cancel = CancellationToken::new();

        let first = downloader.download_area(CENTER, 1.0, &cancel).await.unwrap();
        let second = downloader.download_area(CENTER, 1.0, &cancel).await.unwrap();

        assert_eq!(first.downloaded_tiles, 4);
        assert_eq!(second.downloaded_tiles, 0);
        assert_eq!(second.succeeded_tiles, 4);
        // no re-download of tiles already present
        assert_eq!(downloader.fetcher().client().calls(), 4);
    }

    #[tokio::test]
    async fn test_provider_outage_is_counted_not_fatal() {
        let (downloader, store) =
            downloader(MockHttpClient::server_error(), fast_config(14, 14));

        let report = downloader
            .download_area(CENTER, 1.0, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.total_tiles, 4);
        assert_eq!(report.downloaded_tiles, 0);
        assert_eq!(report.failed_tiles, 4);
        assert!(!report.all_succeeded());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_before_first_batch() {
        let (downloader, store) = downloader(MockHttpClient::ok(vec![1]), fast_config(14, 14));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = downloader.download_area(CENTER, 1.0, &cancel).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.succeeded_tiles, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_zoom_range_is_an_error() {
        let (downloader, _store) = downloader(MockHttpClient::ok(vec![1]), fast_config(15, 10));

        let result = downloader
            .download_area(CENTER, 1.0, &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::InvalidZoomRange { min: 15, max: 10 })
        ));
    }

    #[tokio::test]
    async fn test_zoom_beyond_max_rejected_before_any_fetch() {
        let (downloader, store) =
            downloader(MockHttpClient::ok(vec![1]), fast_config(14, MAX_ZOOM + 1));

        let result = downloader
            .download_area(CENTER, 1.0, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(DownloadError::ZoomBeyondMax(z)) if z == MAX_ZOOM + 1));
        // rejected up front: the valid lower zoom levels were not fetched
        assert_eq!(downloader.fetcher().client().calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_polar_center_is_an_orchestration_error() {
        let (downloader, _store) = downloader(MockHttpClient::ok(vec![1]), fast_config(10, 12));

        let result = downloader
            .download_area(GeoPoint::new(89.0, 0.0), 1.0, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(DownloadError::Bounds(_))));
    }

    /// HTTP client that records the peak number of concurrent requests.
    struct ConcurrencyProbe {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ConcurrencyProbe {
        fn new() -> Self {
            Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl crate::provider::HttpClient for Arc<ConcurrencyProbe> {
        async fn get(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![0])
        }
    }

    #[tokio::test]
    async fn test_in_flight_requests_bounded_by_batch_size() {
        let probe = Arc::new(ConcurrencyProbe::new());
        let store: Arc<dyn TileStore> = Arc::new(MemoryTileStore::new());
        let fetcher = TileFetcher::new(store, TileProvider::default(), probe.clone());
        let downloader =
            AreaDownloader::new(fetcher, fast_config(15, 15).with_batch_size(2));

        downloader
            .download_area(CENTER, 1.0, &CancellationToken::new())
            .await
            .unwrap();

        assert!(
            probe.peak.load(Ordering::SeqCst) <= 2,
            "peak concurrency {} exceeded batch size",
            probe.peak.load(Ordering::SeqCst)
        );
    }
}

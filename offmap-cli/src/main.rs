//! Offmap CLI.
//!
//! Thin terminal front-end over the `offmap` library: download an area for
//! offline use, report cache coverage, or clear the cache.

mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use offmap::download::DownloadConfig;
use offmap::logging::{default_log_dir, default_log_file, init_logging};
use offmap::provider::{ReqwestClient, TileProvider};
use offmap::service::TileService;
use offmap::store::{DiskStoreConfig, DiskTileStore, TileStore};
use offmap::GeoPoint;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "offmap", version, about = "Offline map tile cache")]
struct Cli {
    /// Tile cache directory (defaults to the platform cache dir)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download all tiles covering an area for offline use
    Download {
        /// Center latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Center longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Radius around the center, in kilometers
        #[arg(long, default_value_t = 2.0)]
        radius: f64,
        /// Lowest zoom level to cache
        #[arg(long, default_value_t = 10)]
        min_zoom: u8,
        /// Highest zoom level to cache
        #[arg(long, default_value_t = 15)]
        max_zoom: u8,
        /// Tiles requested per batch
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        /// Pause between batches, in milliseconds
        #[arg(long, default_value_t = 100)]
        batch_delay_ms: u64,
        /// Tile URL template with {z}/{x}/{y} placeholders
        #[arg(long)]
        url: Option<String>,
    },
    /// Show cache coverage statistics
    Stats {
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Remove every cached tile
    Clear,
}

fn open_store(cache_dir: Option<PathBuf>) -> Result<Arc<dyn TileStore>, CliError> {
    let mut config = DiskStoreConfig::default();
    if let Some(dir) = cache_dir {
        config = config.with_directory(dir);
    }
    let store = DiskTileStore::new(config)?;
    info!(directory = %store.directory().display(), "tile cache opened");
    Ok(Arc::new(store))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = open_store(cli.cache_dir)?;

    match cli.command {
        Command::Download {
            lat,
            lon,
            radius,
            min_zoom,
            max_zoom,
            batch_size,
            batch_delay_ms,
            url,
        } => {
            let provider = match url {
                Some(template) => TileProvider::new("custom", template)?,
                None => TileProvider::default(),
            };
            let config = DownloadConfig::default()
                .with_zoom_range(min_zoom, max_zoom)
                .with_batch_size(batch_size)
                .with_batch_delay(Duration::from_millis(batch_delay_ms));
            let service = TileService::new(store, provider, ReqwestClient::new()?, config);

            let cancel = CancellationToken::new();
            let ctrlc_token = cancel.clone();
            ctrlc::set_handler(move || {
                eprintln!("\nStopping after the current batch...");
                ctrlc_token.cancel();
            })
            .ok();

            println!(
                "Downloading tiles within {radius} km of ({lat}, {lon}), zoom {min_zoom}-{max_zoom}"
            );
            let report = service
                .download_area(GeoPoint::new(lat, lon), radius, &cancel)
                .await?;

            println!("Tiles:      {}", report.total_tiles);
            println!("Cached:     {}", report.succeeded_tiles);
            println!("Downloaded: {}", report.downloaded_tiles);
            if report.failed_tiles > 0 {
                println!("Failed:     {}", report.failed_tiles);
            }
            if report.cancelled {
                println!("Cancelled before completion");
            }
        }
        Command::Stats { json } => {
            let service = TileService::with_defaults(store)?;
            let stats = service.cache_stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats).unwrap_or_default());
            } else {
                println!("Cached tiles: {}", stats.tile_count);
                let zooms: Vec<String> =
                    stats.zoom_levels.iter().map(|z| z.to_string()).collect();
                println!(
                    "Zoom levels:  {}",
                    if zooms.is_empty() {
                        "none".to_string()
                    } else {
                        zooms.join(", ")
                    }
                );
            }
        }
        Command::Clear => {
            let service = TileService::with_defaults(store)?;
            service.clear_tile_cache().await?;
            println!("Tile cache cleared");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _guard = init_logging(default_log_dir(), default_log_file()).ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the terminal user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("logging setup failed: {0}")]
    Logging(#[from] std::io::Error),

    #[error("invalid provider: {0}")]
    Provider(#[from] offmap::provider::ProviderError),

    #[error("cache store unavailable: {0}")]
    Store(#[from] offmap::store::StoreError),

    #[error("download failed: {0}")]
    Download(#[from] offmap::download::DownloadError),
}

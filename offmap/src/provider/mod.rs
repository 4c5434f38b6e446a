//! Raster tile provider abstraction
//!
//! A [`TileProvider`] names a slippy-map endpoint and turns tile coordinates
//! into request URLs. Providers are plain configuration; the HTTP transport
//! behind them is injected through the [`HttpClient`] trait.

mod http;

pub use http::{HttpClient, ReqwestClient};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use thiserror::Error;

use crate::coord::TileCoord;

/// Default tile endpoint (OpenStreetMap standard layer).
pub const DEFAULT_URL_TEMPLATE: &str = "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Errors produced by providers and their HTTP transport.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure (DNS, timeout, connection reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// URL template missing one of the `{z}`, `{x}`, `{y}` placeholders.
    #[error("invalid tile URL template: {0}")]
    InvalidTemplate(String),
}

/// A named slippy-map tile endpoint.
///
/// The template must contain `{z}`, `{x}` and `{y}` placeholders. Tiles are
/// fetched via unauthenticated GET; authentication schemes are a provider
/// concern this type deliberately does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileProvider {
    name: String,
    url_template: String,
}

impl TileProvider {
    /// Create a provider from a name and URL template.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidTemplate`] if any coordinate
    /// placeholder is missing.
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let url_template = url_template.into();
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !url_template.contains(placeholder) {
                return Err(ProviderError::InvalidTemplate(url_template));
            }
        }
        Ok(Self {
            name: name.into(),
            url_template,
        })
    }

    /// The OpenStreetMap standard tile layer.
    pub fn openstreetmap() -> Self {
        Self {
            name: "openstreetmap".to_string(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    /// Provider name, used in logs and cache reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the tile URL for the given coordinate.
    pub fn url_for(&self, tile: &TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for TileProvider {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

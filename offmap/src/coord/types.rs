//! Coordinate types for the Web Mercator tiling scheme.

use std::fmt;

use thiserror::Error;

/// Maximum latitude representable in the Web Mercator projection.
pub const MAX_LAT: f64 = 85.051_128_78;

/// Minimum latitude representable in the Web Mercator projection.
pub const MIN_LAT: f64 = -85.051_128_78;

/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Minimum supported zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 19;

/// Maximum absolute center latitude accepted by radius expansion.
///
/// Beyond this the `1 / cos(lat)` longitude widening degenerates, so the
/// spherical approximation is refused instead of returning garbage bounds.
pub const MAX_RADIUS_LAT: f64 = 80.0;

/// Errors produced by coordinate conversions.
#[derive(Debug, Error, PartialEq)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range.
    #[error("invalid latitude: {0} (must be within {MIN_LAT}..={MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0} (must be within {MIN_LON}..={MAX_LON})")]
    InvalidLongitude(f64),

    /// Zoom level outside the supported range.
    #[error("invalid zoom level: {0} (max: {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Radius must be strictly positive.
    #[error("invalid radius: {0} km (must be > 0)")]
    InvalidRadius(f64),

    /// Center latitude too close to a pole for radius expansion.
    #[error("center latitude {0} exceeds ±{MAX_RADIUS_LAT}°, too close to the poles")]
    PolarCenter(f64),

    /// The expanded bounds would wrap around the ±180° meridian.
    #[error("bounds cross the antimeridian: west={west}, east={east}")]
    AntimeridianCrossing { west: f64, east: f64 },

    /// A persisted tile key that does not decode to a tile coordinate.
    #[error("malformed tile key: {0:?}")]
    MalformedKey(String),
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A rectangular geographic area in degrees.
///
/// Invariant: `north > south`. East/west are plain degree values with no
/// antimeridian normalization; construction paths that could wrap reject
/// the input instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// A slippy-map tile coordinate.
///
/// For a given `zoom`, valid `x` and `y` lie in `[0, 2^zoom - 1]`.
/// `x` increases west to east, `y` increases north to south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column, west to east.
    pub x: u32,
    /// Row, north to south.
    pub y: u32,
    /// Zoom level.
    pub zoom: u8,
}

impl TileCoord {
    /// Render the persisted cache key, `"{z}_{x}_{y}"`.
    ///
    /// The encoding is bijective: [`TileCoord::from_key`] recovers the exact
    /// coordinate. Any storage backend must preserve this format so
    /// previously cached data stays addressable.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.zoom, self.x, self.y)
    }

    /// Parse a persisted cache key back into a tile coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::MalformedKey`] if the key is not three
    /// underscore-separated integers, or if `x`/`y` exceed the grid at the
    /// encoded zoom level.
    pub fn from_key(key: &str) -> Result<Self, CoordError> {
        let malformed = || CoordError::MalformedKey(key.to_string());

        let mut parts = key.split('_');
        let zoom: u8 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(malformed)?;
        let x: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(malformed)?;
        let y: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        if zoom > MAX_ZOOM {
            return Err(malformed());
        }
        let max = 1u32 << zoom;
        if x >= max || y >= max {
            return Err(malformed());
        }

        Ok(Self { x, y, zoom })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Row-major iterator over a rectangle of tile coordinates at one zoom level.
///
/// Yields `(x, y)` pairs with `y` in the outer loop, so enumeration order is
/// deterministic for a given rectangle. Produced by [`GeoBounds::tiles`].
#[derive(Debug, Clone)]
pub struct TileRect {
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
    zoom: u8,
    next_x: u32,
    next_y: u32,
    exhausted: bool,
}

impl TileRect {
    /// Create a rectangle from inclusive corner tiles.
    ///
    /// Corners may arrive in either order; they are normalized internally.
    pub(crate) fn new(a: TileCoord, b: TileCoord) -> Self {
        debug_assert_eq!(a.zoom, b.zoom);
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            zoom: a.zoom,
            next_x: min_x,
            next_y: min_y,
            exhausted: false,
        }
    }

    /// Total number of tiles in the full rectangle, independent of how far
    /// iteration has advanced.
    pub fn tile_count(&self) -> usize {
        let width = (self.max_x - self.min_x + 1) as usize;
        let height = (self.max_y - self.min_y + 1) as usize;
        width * height
    }
}

impl Iterator for TileRect {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.exhausted {
            return None;
        }
        let tile = TileCoord {
            x: self.next_x,
            y: self.next_y,
            zoom: self.zoom,
        };
        if self.next_x < self.max_x {
            self.next_x += 1;
        } else if self.next_y < self.max_y {
            self.next_x = self.min_x;
            self.next_y += 1;
        } else {
            self.exhausted = true;
        }
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining_rows = (self.max_y - self.next_y) as usize;
        let width = (self.max_x - self.min_x + 1) as usize;
        let in_row = (self.max_x - self.next_x + 1) as usize;
        let remaining = remaining_rows * width + in_row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileRect {}

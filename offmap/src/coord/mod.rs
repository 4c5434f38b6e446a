//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates in the standard slippy-map scheme, plus
//! expansion of a center point and radius into a rectangular area of
//! interest.

mod types;

pub use types::{
    CoordError, GeoBounds, GeoPoint, TileCoord, TileRect, MAX_LAT, MAX_LON, MAX_RADIUS_LAT,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Mean Earth radius in kilometers, used by the spherical radius expansion.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 19)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are
/// invalid. Results are clamped to `[0, 2^zoom - 1]` so the edge case
/// `lon = 180.0` maps onto the last column rather than off the grid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (1u32 << zoom) - 1;

    let x = (((lon + 180.0) / 360.0 * n) as u32).min(max_index);

    let lat_rad = lat * PI / 180.0;
    let y = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32).min(max_index);

    Ok(TileCoord { x, y, zoom })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Expands a center point and radius into a geographic bounding rectangle.
///
/// Treats the radius as a circle on a sphere of radius [`EARTH_RADIUS_KM`].
/// The latitude span is symmetric; the longitude span is widened by
/// `1 / cos(lat)` to compensate for meridian convergence.
///
/// # Preconditions
///
/// The spherical approximation degenerates near the poles and is not defined
/// across the antimeridian, so instead of returning incorrect bounds this
/// rejects:
/// - non-positive radii,
/// - center latitudes beyond ±[`MAX_RADIUS_LAT`]°,
/// - expansions whose east/west edges would leave [-180, 180].
pub fn bounds_from_radius(center: GeoPoint, radius_km: f64) -> Result<GeoBounds, CoordError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(CoordError::InvalidRadius(radius_km));
    }
    if !(MIN_LON..=MAX_LON).contains(&center.lon) {
        return Err(CoordError::InvalidLongitude(center.lon));
    }
    if center.lat.abs() > MAX_RADIUS_LAT {
        return Err(CoordError::PolarCenter(center.lat));
    }

    let rad_dist = radius_km / EARTH_RADIUS_KM;
    let lat_rad = center.lat.to_radians();

    let north = (lat_rad + rad_dist).to_degrees();
    let south = (lat_rad - rad_dist).to_degrees();
    if north > MAX_LAT || south < MIN_LAT {
        return Err(CoordError::PolarCenter(center.lat));
    }

    let delta_lon = (rad_dist / lat_rad.cos()).to_degrees();
    let east = center.lon + delta_lon;
    let west = center.lon - delta_lon;
    if west < MIN_LON || east > MAX_LON {
        return Err(CoordError::AntimeridianCrossing { west, east });
    }

    Ok(GeoBounds {
        north,
        south,
        east,
        west,
    })
}

impl GeoBounds {
    /// Enumerates the rectangle of tiles covering these bounds at one zoom
    /// level.
    ///
    /// The rectangle spans from the tile containing the northwest corner to
    /// the tile containing the southeast corner, inclusive, in deterministic
    /// row-major order. Tiles whose boundary merely touches the bounds are
    /// included; there are no gaps at the edges.
    pub fn tiles(&self, zoom: u8) -> Result<TileRect, CoordError> {
        let nw = to_tile_coords(self.north, self.west, zoom)?;
        let se = to_tile_coords(self.south, self.east, zoom)?;
        Ok(TileRect::new(nw, se))
    }
}

//! Web-Mercator projection helpers and detail-level scale factors.
//!
//! All clustering distances are computed in a planar coordinate space where
//! x is longitude in degrees and y is the Mercator-projected latitude on the
//! same degree scale. This module owns the projection in both directions and
//! the conversion between screen pixels and projected degrees at a given
//! detail level.

use std::f64::consts::PI;

/// Number of detail levels maintained by the engine (0 coarsest, 19 finest).
pub const NUM_LEVELS: usize = 20;

/// Index of the finest detail level.
pub const FINEST_LEVEL: usize = NUM_LEVELS - 1;

/// Latitude bound of the Web-Mercator projection, in degrees.
///
/// `lat2y` diverges at the poles; inputs are clamped to this range first.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Project a latitude (degrees) to Mercator y on the degree scale.
///
/// The result equals the latitude at the equator and grows toward
/// ±180 as the input approaches [`MAX_LATITUDE`].
///
/// # Examples
///
/// ```
/// use geocluster::mercator::lat2y;
///
/// assert_eq!(lat2y(0.0), 0.0);
/// assert!((lat2y(45.0) - 50.4987).abs() < 1e-3);
/// ```
pub fn lat2y(latitude: f64) -> f64 {
    let latitude = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    (180.0 / PI) * (PI / 4.0 + latitude.to_radians() / 2.0).tan().ln()
}

/// Inverse of [`lat2y`]: recover a latitude (degrees) from Mercator y.
///
/// # Examples
///
/// ```
/// use geocluster::mercator::{lat2y, y2lat};
///
/// let y = lat2y(40.7128);
/// assert!((y2lat(y) - 40.7128).abs() < 1e-9);
/// ```
pub fn y2lat(y: f64) -> f64 {
    (2.0 * (y * PI / 180.0).exp().atan() - PI / 2.0).to_degrees()
}

/// Projected degrees spanned by one screen pixel at `level`.
///
/// Level 0 maps the full 360° of longitude onto a single 256-pixel tile;
/// every finer level halves the span.
pub fn pixel_scale(level: usize) -> f64 {
    debug_assert!(level < NUM_LEVELS);
    let level0_scale = 360.0 / 256.0;
    level0_scale / f64::from(1u32 << level)
}

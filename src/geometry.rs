//! Geometric validation and containment predicates.
//!
//! Thin wrappers over the `geo` crate that pin down the coordinate
//! validation rules and the exact point-in-polygon semantics the engine
//! relies on.

use crate::error::{MaktabError, Result};
use crate::types::CoordinatePolicy;
use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};

/// Western longitude limit in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
/// Eastern longitude limit in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;
/// Southern latitude limit in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
/// Northern latitude limit in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Validate a lon/lat pair and produce a `Point`.
///
/// Non-finite values (NaN, infinities) are always rejected. Out-of-range
/// values are rejected or clamped into `[-180, 180] x [-90, 90]` depending
/// on `policy`.
///
/// # Examples
///
/// ```rust
/// use maktab::{validate_point, CoordinatePolicy};
///
/// let point = validate_point(69.5, 30.5, CoordinatePolicy::Reject).unwrap();
/// assert_eq!(point.x(), 69.5);
///
/// assert!(validate_point(190.0, 30.5, CoordinatePolicy::Reject).is_err());
///
/// let clamped = validate_point(190.0, 95.0, CoordinatePolicy::Clamp).unwrap();
/// assert_eq!(clamped.x(), 180.0);
/// assert_eq!(clamped.y(), 90.0);
/// ```
pub fn validate_point(longitude: f64, latitude: f64, policy: CoordinatePolicy) -> Result<Point> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(MaktabError::InvalidInput(format!(
            "Coordinates must be finite, got ({}, {})",
            longitude, latitude
        )));
    }

    match policy {
        CoordinatePolicy::Reject => {
            if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
                return Err(MaktabError::InvalidInput(format!(
                    "Longitude {} out of range [{}, {}]",
                    longitude, MIN_LONGITUDE, MAX_LONGITUDE
                )));
            }
            if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
                return Err(MaktabError::InvalidInput(format!(
                    "Latitude {} out of range [{}, {}]",
                    latitude, MIN_LATITUDE, MAX_LATITUDE
                )));
            }
            Ok(Point::new(longitude, latitude))
        }
        CoordinatePolicy::Clamp => Ok(Point::new(
            longitude.clamp(MIN_LONGITUDE, MAX_LONGITUDE),
            latitude.clamp(MIN_LATITUDE, MAX_LATITUDE),
        )),
    }
}

/// Test whether a district boundary contains a point.
///
/// Uses `geo::Contains`, which tests against the polygon interior: a point
/// lying exactly on a boundary edge or vertex is NOT contained, and points
/// inside interior rings (holes) are outside. This is the containment
/// semantics used for both assignment and aggregation.
///
/// # Examples
///
/// ```rust
/// use maktab::{point_in_boundary, MultiPolygon, Point};
/// use geo::polygon;
///
/// let boundary = MultiPolygon::new(vec![polygon![
///     (x: 69.0, y: 30.0),
///     (x: 70.0, y: 30.0),
///     (x: 70.0, y: 31.0),
///     (x: 69.0, y: 31.0),
/// ]]);
///
/// assert!(point_in_boundary(&boundary, &Point::new(69.5, 30.5)));
/// assert!(!point_in_boundary(&boundary, &Point::new(0.0, 0.0)));
/// ```
pub fn point_in_boundary(boundary: &MultiPolygon, point: &Point) -> bool {
    boundary.contains(point)
}

/// Bounding rectangle of a boundary, or None for an empty geometry.
pub fn boundary_envelope(boundary: &MultiPolygon) -> Option<Rect> {
    boundary.bounding_rect()
}

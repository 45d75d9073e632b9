//! Geospatial primitives for provider matching.
//!
//! This module owns the spherical-distance math; the SQL embodiment of the
//! same formulas lives in the `match_repo`. Keeping the reference
//! implementation here lets the ranking logic be unit-tested without a
//! database.

use crate::error::CoreError;

/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Validate client-supplied origin coordinates.
    ///
    /// Non-finite values and out-of-range coordinates are rejected so a bad
    /// origin surfaces as a validation error, never as a silent empty result.
    pub fn validate(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoreError::Validation(
                "Origin coordinates must be finite numbers".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::Validation(format!(
                "Latitude must be within [-90, 90], got {lat}"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::Validation(format!(
                "Longitude must be within [-180, 180], got {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Axis-aligned lat/lng box that fully contains the circle of
/// `radius_meters` around `origin`.
///
/// Used as an index prefilter: the composite `(latitude, longitude)` index
/// bounds the candidate set, then the exact haversine distance is evaluated
/// only over those candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(origin: GeoPoint, radius_meters: f64) -> Self {
        let lat_delta = (radius_meters / EARTH_RADIUS_METERS).to_degrees();

        // A degree of longitude shrinks with latitude. Near the poles the
        // box degenerates to the full longitude range; the exact distance
        // check after the prefilter keeps the result correct.
        let cos_lat = origin.lat.to_radians().cos();
        let lng_delta = if cos_lat <= f64::EPSILON {
            180.0
        } else {
            ((radius_meters / (EARTH_RADIUS_METERS * cos_lat)).to_degrees()).min(180.0)
        };

        Self {
            min_lat: (origin.lat - lat_delta).max(-90.0),
            max_lat: (origin.lat + lat_delta).min(90.0),
            min_lng: (origin.lng - lng_delta).max(-180.0),
            max_lng: (origin.lng + lng_delta).min(180.0),
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lng >= self.min_lng
            && p.lng <= self.max_lng
    }
}

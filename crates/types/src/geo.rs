// crates/types/src/geo.rs
//! Geographic primitives shared by the index store and its callers.
//!
//! The store answers radius queries with a bounding-box pre-filter over its
//! R*Tree table: cheap, index-accelerated, and a conservative *superset* of
//! the true great-circle radius. Callers that need exact distances refine
//! the candidate set with [`haversine_km`] against their own authoritative
//! coordinates.

use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Mean Earth radius in kilometres, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A single point location attached to a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A radius query: everything within `radius_km` of `(lat, lon)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl GeoFilter {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// An axis-aligned lat/lon box, the query shape the R*Tree understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Compute the box enclosing a `radius_km` circle around `center`.
    ///
    /// Degree deltas are the flat-earth approximation: one degree of
    /// latitude is ~111 km everywhere, one degree of longitude shrinks by
    /// cos(lat). The cosine is clamped away from zero so a query centered
    /// near a pole degrades to a (still correct) whole-longitude span
    /// instead of dividing by zero.
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let radius_km = radius_km.max(0.0);
        let delta_lat = radius_km / KM_PER_DEGREE;
        let cos_lat = center.lat.to_radians().cos().max(1e-6);
        let delta_lon = radius_km / (KM_PER_DEGREE * cos_lat);

        Self {
            min_lat: (center.lat - delta_lat).max(-90.0),
            max_lat: (center.lat + delta_lat).min(90.0),
            min_lon: (center.lon - delta_lon).max(-180.0),
            max_lon: (center.lon + delta_lon).min(180.0),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}

/// Great-circle distance between two points in kilometres.
///
/// This is the exact-distance refinement the owning application applies to
/// the store's bounding-box candidate set before display.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

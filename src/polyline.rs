//! Polyline representation for route geometries.
//!
//! Geometry arrives from the directions services as `[lng, lat]` pairs; it is
//! flipped to `(lat, lng)` at that boundary and stored decoded here.

use serde::{Deserialize, Serialize};

use crate::model::Coordinates;

/// A drivable path as an ordered list of `(latitude, longitude)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinates>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinates>) -> Self {
        Self { points }
    }

    /// Builds a polyline from GeoJSON-ordered `[lng, lat]` positions.
    pub fn from_lng_lat(positions: &[[f64; 2]]) -> Self {
        Self {
            points: positions.iter().map(|[lng, lat]| (*lat, *lng)).collect(),
        }
    }

    pub fn points(&self) -> &[Coordinates] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinates> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Plain coordinate average of two points.
///
/// Good enough for the short depot-to-first-stop legs it is used on; it is not
/// a great-circle midpoint.
pub fn midpoint(a: Coordinates, b: Coordinates) -> Coordinates {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

//! Haversine distance matrix (fallback when the live service is unavailable).
//!
//! Uses great-circle distance scaled by a road-circuity factor to estimate
//! road distance, and a fixed speed to estimate travel time.

use rayon::prelude::*;
use tracing::warn;

use crate::matrix::TravelMatrix;
use crate::model::Coordinates;

/// Average driving speed assumption for time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 60.0;

/// Ratio of real road distance to straight-line distance.
pub const DEFAULT_CIRCUITY: f64 = 1.4;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based distance matrix estimator.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier applied to great-circle distance.
    pub circuity: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            circuity: DEFAULT_CIRCUITY,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64, circuity: f64) -> Self {
        Self { speed_kmh, circuity }
    }

    /// Calculate haversine distance between two points in kilometers.
    ///
    /// Non-finite coordinates contribute zero distance instead of poisoning
    /// the whole matrix with NaN.
    pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;
        if ![lat1, lng1, lat2, lng2].iter().all(|v| v.is_finite()) {
            warn!(?from, ?to, "invalid coordinates in fallback matrix, using zero distance");
            return 0.0;
        }

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_KM * c
    }

    /// Estimated road distance in km.
    pub fn road_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        Self::haversine_km(from, to) * self.circuity
    }

    /// Convert a road distance in km to travel time in minutes.
    pub fn km_to_minutes(&self, km: f64) -> f64 {
        if self.speed_kmh <= 0.0 {
            return 0.0;
        }
        km / self.speed_kmh * 60.0
    }

    /// Compute the full fallback matrix. Rows are computed in parallel.
    pub fn compute(&self, locations: &[Coordinates]) -> TravelMatrix {
        let rows: Vec<(Vec<f64>, Vec<f64>)> = locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                let distances: Vec<f64> = locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| if i == j { 0.0 } else { self.road_km(*from, *to) })
                    .collect();
                let durations = distances.iter().map(|km| self.km_to_minutes(*km)).collect();
                (distances, durations)
            })
            .collect();

        let (distance_km, duration_minutes) = rows.into_iter().unzip();
        TravelMatrix::new(distance_km, duration_minutes, false)
    }
}

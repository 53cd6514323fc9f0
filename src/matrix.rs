//! Distance/duration matrices and source selection.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::haversine::HaversineMatrix;
use crate::model::Coordinates;
use crate::traits::DistanceMatrixProvider;

/// Square travel matrices indexed by a stable location ordering.
///
/// `distance_km[i][j]` and `duration_minutes[i][j]` are directed costs from
/// location `i` to location `j`; the diagonal is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMatrix {
    pub distance_km: Vec<Vec<f64>>,
    pub duration_minutes: Vec<Vec<f64>>,
    /// `true` when values came from a live road-network query.
    pub used_live_data: bool,
}

impl TravelMatrix {
    pub fn new(
        distance_km: Vec<Vec<f64>>,
        duration_minutes: Vec<Vec<f64>>,
        used_live_data: bool,
    ) -> Self {
        Self {
            distance_km,
            duration_minutes,
            used_live_data,
        }
    }

    pub fn len(&self) -> usize {
        self.distance_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_km.is_empty()
    }

    /// Both matrices are `n x n` with finite, non-negative entries.
    pub fn is_valid_for(&self, n: usize) -> bool {
        let square = |m: &Vec<Vec<f64>>| {
            m.len() == n
                && m.iter()
                    .all(|row| row.len() == n && row.iter().all(|v| v.is_finite() && *v >= 0.0))
        };
        square(&self.distance_km) && square(&self.duration_minutes)
    }

    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.distance_km.get(from)?.get(to).copied()
    }

    pub fn duration(&self, from: usize, to: usize) -> Option<f64> {
        self.duration_minutes.get(from)?.get(to).copied()
    }

    /// Scales every duration uniformly. Multipliers below 1.0 are treated as 1.0.
    pub fn with_traffic_multiplier(mut self, multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() { multiplier.max(1.0) } else { 1.0 };
        if multiplier > 1.0 {
            for row in &mut self.duration_minutes {
                for value in row.iter_mut() {
                    *value *= multiplier;
                }
            }
        }
        self
    }
}

/// Fetch a matrix from `primary`, falling back to the geometric estimate.
///
/// Never fails: an absent, unreachable or malformed primary source degrades to
/// `fallback`, which is tagged `used_live_data == false`.
pub fn fetch_matrix(
    primary: Option<&dyn DistanceMatrixProvider>,
    fallback: &HaversineMatrix,
    locations: &[Coordinates],
) -> TravelMatrix {
    if let Some(provider) = primary {
        match provider.matrix_for(locations) {
            Some(matrix) if matrix.is_valid_for(locations.len()) => {
                debug!(points = locations.len(), live = matrix.used_live_data, "matrix fetched");
                return matrix;
            }
            Some(_) => warn!(
                points = locations.len(),
                "matrix provider returned a malformed matrix, using fallback"
            ),
            None => warn!(points = locations.len(), "matrix provider unavailable, using fallback"),
        }
    }

    fallback.compute(locations)
}

//! Deterministic collaborators for pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use delivery_planner::incident::{IncidentAnalysis, IncidentType, Severity};
use delivery_planner::matrix::TravelMatrix;
use delivery_planner::model::Coordinates;
use delivery_planner::polyline::Polyline;
use delivery_planner::traits::{DistanceMatrixProvider, GeometryProvider, IncidentAnalyzer};

/// Manhattan distance matrix (simple, predictable).
///
/// One degree is 100 km and every kilometre takes one minute.
pub struct ManhattanMatrix;

impl DistanceMatrixProvider for ManhattanMatrix {
    fn matrix_for(&self, locations: &[Coordinates]) -> Option<TravelMatrix> {
        let grid: Vec<Vec<f64>> = locations
            .iter()
            .map(|from| {
                locations
                    .iter()
                    .map(|to| ((from.0 - to.0).abs() + (from.1 - to.1).abs()) * 100.0)
                    .collect()
            })
            .collect();
        Some(TravelMatrix::new(grid.clone(), grid, true))
    }
}

/// Always unreachable; counts how often it was asked.
#[derive(Clone, Default)]
pub struct UnavailableMatrix {
    pub calls: Arc<AtomicUsize>,
}

impl DistanceMatrixProvider for UnavailableMatrix {
    fn matrix_for(&self, _locations: &[Coordinates]) -> Option<TravelMatrix> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

/// Answers like [`ManhattanMatrix`] on the first call only, then goes down.
#[derive(Clone, Default)]
pub struct FlakyMatrix {
    pub calls: Arc<AtomicUsize>,
}

impl DistanceMatrixProvider for FlakyMatrix {
    fn matrix_for(&self, locations: &[Coordinates]) -> Option<TravelMatrix> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => ManhattanMatrix.matrix_for(locations),
            _ => None,
        }
    }
}

/// Returns the stop sequence as the path.
///
/// With `detours`, an avoid point adds a dog-leg east of the first stop so
/// the geometry differs from the unconstrained one.
pub struct EchoGeometry {
    pub detours: bool,
}

impl GeometryProvider for EchoGeometry {
    fn geometry_for(
        &self,
        stops: &[Coordinates],
        avoid: Option<Coordinates>,
    ) -> Option<Polyline> {
        let mut points = stops.to_vec();
        if let (true, Some(_)) = (self.detours, avoid) {
            let (lat, lng) = stops[0];
            points.insert(1, (lat, lng + 0.01));
        }
        Some(Polyline::new(points))
    }
}

/// Echoes the stop sequence and records the avoid point of every request.
///
/// With `refuse_avoid`, avoid-constrained requests fail.
#[derive(Clone, Default)]
pub struct RecordingGeometry {
    pub refuse_avoid: bool,
    pub requests: Arc<Mutex<Vec<Option<Coordinates>>>>,
}

impl RecordingGeometry {
    pub fn take_requests(&self) -> Vec<Option<Coordinates>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

impl GeometryProvider for RecordingGeometry {
    fn geometry_for(
        &self,
        stops: &[Coordinates],
        avoid: Option<Coordinates>,
    ) -> Option<Polyline> {
        self.requests.lock().unwrap().push(avoid);
        if self.refuse_avoid && avoid.is_some() {
            return None;
        }
        Some(Polyline::new(stops.to_vec()))
    }
}

/// Answers every incident with the same raw delay.
pub struct FixedAnalyzer {
    pub delay_minutes: f64,
}

impl IncidentAnalyzer for FixedAnalyzer {
    fn analyze(
        &self,
        _incident_type: &IncidentType,
        _route_index: usize,
    ) -> Option<IncidentAnalysis> {
        Some(IncidentAnalysis {
            fixed_delay_minutes: self.delay_minutes,
            severity: Severity::High,
            recommendation: "Reroute around the incident".to_string(),
            should_reroute: true,
        })
    }
}

/// Never answers.
pub struct SilentAnalyzer;

impl IncidentAnalyzer for SilentAnalyzer {
    fn analyze(
        &self,
        _incident_type: &IncidentType,
        _route_index: usize,
    ) -> Option<IncidentAnalysis> {
        None
    }
}

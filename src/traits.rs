//! Capability traits for the planner's external collaborators.
//!
//! Each trait has a single method so tests can substitute deterministic
//! fixtures for network calls. Unavailability is reported as `None`, never as
//! an error: the planner degrades to a fallback instead of failing the run.

use crate::incident::{IncidentAnalysis, IncidentType};
use crate::matrix::TravelMatrix;
use crate::model::Coordinates;
use crate::polyline::Polyline;

/// Provides a distance/duration matrix for a set of locations.
///
/// The matrix is indexed by the provided location order. Returns `None` when
/// the source is unreachable or answers with something unusable.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinates]) -> Option<TravelMatrix>;
}

/// Provides a drivable path through an ordered list of stops.
pub trait GeometryProvider {
    /// Fetch the path through `stops`, steering around `avoid` when given.
    fn geometry_for(&self, stops: &[Coordinates], avoid: Option<Coordinates>) -> Option<Polyline>;
}

/// Estimates the delay and severity of a simulated incident.
pub trait IncidentAnalyzer {
    fn analyze(&self, incident_type: &IncidentType, route_index: usize) -> Option<IncidentAnalysis>;
}

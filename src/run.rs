//! Optimization run record and its incident state machine.
//!
//! Transitions are pure: [`OptimizationRun::apply`] takes the current run and a
//! [`RunEvent`] carrying freshly built routes, and returns the next run. The
//! caller persists the result; the old record is never partially updated.

use jiff::civil::Time;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PlannerError;
use crate::incident::{IncidentAnalysis, IncidentType};
use crate::matrix::TravelMatrix;
use crate::model::{Coordinates, Location, LocationId, Route, Vehicle};
use crate::solver::BuildOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentState {
    Normal,
    IncidentActive(ActiveIncident),
}

/// Everything needed to compare against, and restore, the pre-incident plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveIncident {
    pub incident_type: IncidentType,
    pub route_index: usize,
    pub location: Coordinates,
    pub analysis: IncidentAnalysis,
    /// `false` when the rerouted first route kept the baseline geometry.
    pub alternative_found: bool,
    pub baseline_routes: Vec<Route>,
    pub baseline_total_distance_km: f64,
    pub baseline_total_duration_minutes: f64,
}

impl IncidentState {
    pub fn ensure_can_simulate(&self) -> Result<(), PlannerError> {
        match self {
            Self::Normal => Ok(()),
            Self::IncidentActive(_) => Err(PlannerError::IncidentAlreadyActive),
        }
    }

    pub fn ensure_can_resolve(&self) -> Result<(), PlannerError> {
        match self {
            Self::Normal => Err(PlannerError::NoActiveIncident),
            Self::IncidentActive(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    IncidentSimulated {
        incident_type: IncidentType,
        route_index: usize,
        location: Coordinates,
        analysis: IncidentAnalysis,
        outcome: BuildOutcome,
    },
    IncidentResolved {
        outcome: BuildOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRun {
    pub id: String,
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub departure: Time,
    /// Matrix the baseline was built from; incident transitions rebuild on it.
    pub matrix: TravelMatrix,
    pub routes: Vec<Route>,
    pub unassigned: Vec<LocationId>,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    pub incident: IncidentState,
}

impl OptimizationRun {
    pub fn new(
        id: impl Into<String>,
        vehicles: Vec<Vehicle>,
        locations: Vec<Location>,
        departure: Time,
        matrix: TravelMatrix,
        outcome: BuildOutcome,
    ) -> Self {
        let (total_distance_km, total_duration_minutes) = totals(&outcome.routes);
        Self {
            id: id.into(),
            vehicles,
            locations,
            departure,
            matrix,
            routes: outcome.routes,
            unassigned: outcome.unassigned,
            total_distance_km,
            total_duration_minutes,
            incident: IncidentState::Normal,
        }
    }

    pub fn is_incident_active(&self) -> bool {
        matches!(self.incident, IncidentState::IncidentActive(_))
    }

    pub fn active_incident(&self) -> Option<&ActiveIncident> {
        match &self.incident {
            IncidentState::IncidentActive(incident) => Some(incident),
            IncidentState::Normal => None,
        }
    }

    /// Returns the run that results from `event`, leaving `self` untouched.
    pub fn apply(&self, event: RunEvent) -> Result<Self, PlannerError> {
        match event {
            RunEvent::IncidentSimulated {
                incident_type,
                route_index,
                location,
                analysis,
                outcome,
            } => {
                self.incident.ensure_can_simulate()?;

                let baseline_geometry = self.routes.first().and_then(|r| r.geometry.as_ref());
                let new_geometry = outcome.routes.first().and_then(|r| r.geometry.as_ref());
                let alternative_found = new_geometry != baseline_geometry;

                info!(
                    run = %self.id,
                    incident = %incident_type,
                    route_index,
                    delay = analysis.fixed_delay_minutes,
                    severity = ?analysis.severity,
                    alternative_found,
                    "incident simulated"
                );

                let incident = ActiveIncident {
                    incident_type,
                    route_index,
                    location,
                    analysis,
                    alternative_found,
                    baseline_routes: self.routes.clone(),
                    baseline_total_distance_km: self.total_distance_km,
                    baseline_total_duration_minutes: self.total_duration_minutes,
                };
                Ok(self.with_outcome(outcome, IncidentState::IncidentActive(incident)))
            }
            RunEvent::IncidentResolved { outcome } => {
                self.incident.ensure_can_resolve()?;
                info!(run = %self.id, routes = outcome.routes.len(), "incident resolved");
                Ok(self.with_outcome(outcome, IncidentState::Normal))
            }
        }
    }

    fn with_outcome(&self, outcome: BuildOutcome, incident: IncidentState) -> Self {
        let (total_distance_km, total_duration_minutes) = totals(&outcome.routes);
        Self {
            routes: outcome.routes,
            unassigned: outcome.unassigned,
            total_distance_km,
            total_duration_minutes,
            incident,
            ..self.clone()
        }
    }
}

/// Aggregate distance and duration over all routes.
pub fn totals(routes: &[Route]) -> (f64, f64) {
    routes.iter().fold((0.0, 0.0), |(distance, duration), route| {
        (distance + route.total_distance_km, duration + route.total_duration_minutes)
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;
    use crate::incident::Severity;
    use crate::model::VehicleSlot;
    use crate::model::VehicleId;
    use crate::polyline::Polyline;

    fn route(distance: f64, duration: f64, geometry: Option<Polyline>) -> Route {
        Route {
            vehicle: VehicleSlot {
                vehicle_id: VehicleId::new("v1"),
                unit: 1,
                label: "Van".to_string(),
                capacity: 20,
            },
            stops: Vec::new(),
            total_distance_km: distance,
            total_duration_minutes: duration,
            capacity_used: 0,
            geometry,
            used_live_data: false,
        }
    }

    fn outcome(routes: Vec<Route>) -> BuildOutcome {
        BuildOutcome {
            routes,
            unassigned: Vec::new(),
        }
    }

    fn analysis() -> IncidentAnalysis {
        IncidentAnalysis {
            fixed_delay_minutes: 60.0,
            severity: Severity::High,
            recommendation: "detour".to_string(),
            should_reroute: true,
        }
    }

    fn base_run() -> OptimizationRun {
        let line = Polyline::new(vec![(0.0, 0.0), (1.0, 1.0)]);
        OptimizationRun::new(
            "run-1",
            Vec::new(),
            Vec::new(),
            time(8, 0, 0, 0),
            TravelMatrix::new(Vec::new(), Vec::new(), false),
            outcome(vec![route(10.0, 40.0, Some(line)), route(5.0, 20.0, None)]),
        )
    }

    fn simulated(geometry: Option<Polyline>) -> RunEvent {
        RunEvent::IncidentSimulated {
            incident_type: IncidentType::Accident,
            route_index: 0,
            location: (0.5, 0.5),
            analysis: analysis(),
            outcome: outcome(vec![route(12.0, 110.0, geometry), route(5.0, 20.0, None)]),
        }
    }

    #[test]
    fn new_run_sums_totals() {
        let run = base_run();
        assert_eq!(run.total_distance_km, 15.0);
        assert_eq!(run.total_duration_minutes, 60.0);
        assert!(!run.is_incident_active());
    }

    #[test]
    fn simulate_stores_baseline() {
        let run = base_run();
        let detour = Polyline::new(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        let next = run.apply(simulated(Some(detour))).unwrap();

        assert!(next.is_incident_active());
        let incident = next.active_incident().unwrap();
        assert_eq!(incident.baseline_routes, run.routes);
        assert_eq!(incident.baseline_total_duration_minutes, 60.0);
        assert!(incident.alternative_found);
        assert_eq!(next.total_duration_minutes, 130.0);
    }

    #[test]
    fn identical_geometry_means_no_alternative() {
        let run = base_run();
        let same = run.routes[0].geometry.clone();
        let next = run.apply(simulated(same)).unwrap();
        assert!(!next.active_incident().unwrap().alternative_found);
    }

    #[test]
    fn double_simulate_is_rejected() {
        let active = base_run().apply(simulated(None)).unwrap();
        assert_eq!(active.apply(simulated(None)), Err(PlannerError::IncidentAlreadyActive));
    }

    #[test]
    fn resolve_without_incident_is_rejected() {
        let run = base_run();
        let result = run.apply(RunEvent::IncidentResolved { outcome: outcome(Vec::new()) });
        assert_eq!(result, Err(PlannerError::NoActiveIncident));
        assert!(!run.is_incident_active());
    }

    #[test]
    fn resolve_clears_incident() {
        let run = base_run();
        let active = run.apply(simulated(None)).unwrap();
        let restored = active
            .apply(RunEvent::IncidentResolved { outcome: outcome(run.routes.clone()) })
            .unwrap();

        assert_eq!(restored.incident, IncidentState::Normal);
        assert_eq!(restored.total_distance_km, run.total_distance_km);
        assert_eq!(restored.total_duration_minutes, run.total_duration_minutes);
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let json = serde_json::to_value(&base_run().incident).unwrap();
        assert_eq!(json["status"], "NORMAL");
    }
}

//! Routing pipeline and incident controller.
//!
//! A run flows through matrix acquisition, greedy route construction, timing
//! annotation and geometry lookup, strictly in that order. Incident
//! simulation and resolution rebuild on the matrix stored with the run, with
//! different build options, and hand the result to [`OptimizationRun::apply`].

use std::borrow::Cow;

use jiff::civil::Time;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::PlannerConfig;
use crate::directions::DirectionsClient;
use crate::error::PlannerError;
use crate::haversine::HaversineMatrix;
use crate::incident::{IncidentAnalysis, IncidentType, RuleBasedAnalyzer};
use crate::matrix::{TravelMatrix, fetch_matrix};
use crate::model::{Coordinates, Location, Route, Vehicle};
use crate::osrm::OsrmClient;
use crate::polyline::{Polyline, midpoint};
use crate::run::{OptimizationRun, RunEvent};
use crate::solver::{BuildOptions, BuildOutcome, build_routes, expand_slots};
use crate::traits::{DistanceMatrixProvider, GeometryProvider, IncidentAnalyzer};

type SharedMatrixProvider = Box<dyn DistanceMatrixProvider + Send + Sync>;
type SharedGeometryProvider = Box<dyn GeometryProvider + Send + Sync>;
type SharedAnalyzer = Box<dyn IncidentAnalyzer + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub id: String,
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub departure: Time,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateIncidentRequest {
    pub incident_type: IncidentType,
    /// Route the incident is placed on.
    #[serde(default)]
    pub route_index: usize,
    /// Exact point on the affected route, when the caller picked one.
    #[serde(default)]
    pub incident_point: Option<Coordinates>,
}

impl SimulateIncidentRequest {
    pub fn new(incident_type: IncidentType) -> Self {
        Self {
            incident_type,
            route_index: 0,
            incident_point: None,
        }
    }

    pub fn on_route(mut self, route_index: usize) -> Self {
        self.route_index = route_index;
        self
    }

    pub fn at(mut self, point: Coordinates) -> Self {
        self.incident_point = Some(point);
        self
    }
}

pub struct Planner {
    config: PlannerConfig,
    fallback: HaversineMatrix,
    matrix_provider: Option<SharedMatrixProvider>,
    geometry_provider: Option<SharedGeometryProvider>,
    analyzer: Option<SharedAnalyzer>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("config", &self.config)
            .field("matrix_provider", &self.matrix_provider.is_some())
            .field("geometry_provider", &self.geometry_provider.is_some())
            .field("analyzer", &self.analyzer.is_some())
            .finish()
    }
}

impl Planner {
    /// A planner with no live collaborators: geometric matrices, no geometry,
    /// rule-based incident analysis.
    pub fn new(config: PlannerConfig) -> Self {
        let fallback =
            HaversineMatrix::new(config.routing.fallback_speed_kmh, config.routing.circuity);
        Self {
            config,
            fallback,
            matrix_provider: None,
            geometry_provider: None,
            analyzer: None,
        }
    }

    /// Builds HTTP clients for every service named in `config`.
    pub fn from_config(config: PlannerConfig) -> Result<Self, reqwest::Error> {
        let osrm = config.osrm.clone().map(OsrmClient::new).transpose()?;
        let directions = config.directions.clone().map(DirectionsClient::new).transpose()?;

        let mut planner = Self::new(config);
        if let Some(directions) = directions {
            planner = planner.with_geometry_provider(directions);
        } else if let Some(osrm) = &osrm {
            planner = planner.with_geometry_provider(osrm.clone());
        }
        if let Some(osrm) = osrm {
            planner = planner.with_matrix_provider(osrm);
        }
        Ok(planner)
    }

    pub fn with_matrix_provider(
        mut self,
        provider: impl DistanceMatrixProvider + Send + Sync + 'static,
    ) -> Self {
        self.matrix_provider = Some(Box::new(provider));
        self
    }

    pub fn with_geometry_provider(
        mut self,
        provider: impl GeometryProvider + Send + Sync + 'static,
    ) -> Self {
        self.geometry_provider = Some(Box::new(provider));
        self
    }

    pub fn with_analyzer(
        mut self,
        analyzer: impl IncidentAnalyzer + Send + Sync + 'static,
    ) -> Self {
        self.analyzer = Some(Box::new(analyzer));
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn create_run(&self, request: CreateRunRequest) -> Result<OptimizationRun, PlannerError> {
        let depot = self.validate(&request.vehicles, &request.locations)?;
        let matrix = self.acquire_matrix(&request.locations);
        let outcome = self.optimize(
            &request.vehicles,
            &request.locations,
            depot,
            &matrix,
            request.departure,
            &self.build_options(),
            None,
        )?;

        Ok(OptimizationRun::new(
            request.id,
            request.vehicles,
            request.locations,
            request.departure,
            matrix,
            outcome,
        ))
    }

    /// `NORMAL -> INCIDENT_ACTIVE`. Returns the updated run; `run` is untouched.
    pub fn simulate_incident(
        &self,
        run: &OptimizationRun,
        request: SimulateIncidentRequest,
    ) -> Result<OptimizationRun, PlannerError> {
        run.incident.ensure_can_simulate()?;

        let affected =
            run.routes.get(request.route_index).ok_or(PlannerError::InvalidRouteIndex {
                index: request.route_index,
                routes: run.routes.len(),
            })?;

        let location = match request.incident_point {
            Some(point) => point,
            None => default_incident_point(affected).ok_or_else(|| {
                error!(
                    run = %run.id,
                    route_index = request.route_index,
                    "affected route has no stops"
                );
                PlannerError::Internal
            })?,
        };

        let analysis = self.analyze(&request.incident_type, request.route_index).clamped();
        let options = self.build_options().with_fixed_delay(analysis.fixed_delay_minutes);
        let outcome = self.rebuild(run, &options, Some(location))?;

        run.apply(RunEvent::IncidentSimulated {
            incident_type: request.incident_type,
            route_index: request.route_index,
            location,
            analysis,
            outcome,
        })
    }

    /// `INCIDENT_ACTIVE -> NORMAL`. Rebuilds without delay or avoid point.
    pub fn resolve_incident(
        &self,
        run: &OptimizationRun,
    ) -> Result<OptimizationRun, PlannerError> {
        run.incident.ensure_can_resolve()?;

        let outcome = self.rebuild(run, &self.build_options(), None)?;
        run.apply(RunEvent::IncidentResolved { outcome })
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            service_minutes: self.config.routing.service_minutes,
            ..BuildOptions::default()
        }
    }

    fn analyze(&self, incident_type: &IncidentType, route_index: usize) -> IncidentAnalysis {
        let analysis = self
            .analyzer
            .as_ref()
            .and_then(|analyzer| analyzer.analyze(incident_type, route_index));

        analysis.unwrap_or_else(|| {
            if self.analyzer.is_some() {
                warn!(incident = %incident_type, "incident analysis unavailable, using rule table");
            }
            RuleBasedAnalyzer.estimate(incident_type)
        })
    }

    /// Index of the single depot, after rejecting unusable inputs.
    fn validate(
        &self,
        vehicles: &[Vehicle],
        locations: &[Location],
    ) -> Result<usize, PlannerError> {
        let slots: usize = vehicles.iter().map(|v| v.count as usize).sum();
        if slots == 0 {
            return Err(PlannerError::NoVehicles);
        }
        if locations.is_empty() {
            return Err(PlannerError::NoLocations);
        }

        let depots: Vec<usize> = locations
            .iter()
            .enumerate()
            .filter(|(_, location)| location.is_depot)
            .map(|(index, _)| index)
            .collect();
        let depot = match depots.as_slice() {
            [] => return Err(PlannerError::MissingDepot),
            [depot] => *depot,
            many => return Err(PlannerError::MultipleDepots(many.len())),
        };

        if locations.len() < 2 {
            return Err(PlannerError::NoLocations);
        }

        let limits = &self.config.limits;
        if locations.len() > limits.max_locations {
            return Err(PlannerError::TooManyLocations {
                count: locations.len(),
                max: limits.max_locations,
            });
        }
        if slots > limits.max_vehicles {
            return Err(PlannerError::TooManyVehicles {
                count: slots,
                max: limits.max_vehicles,
            });
        }

        Ok(depot)
    }

    fn acquire_matrix(&self, locations: &[Location]) -> TravelMatrix {
        let coords: Vec<Coordinates> = locations.iter().map(Location::coords).collect();
        let primary = self
            .matrix_provider
            .as_deref()
            .map(|p| p as &dyn DistanceMatrixProvider);
        fetch_matrix(primary, &self.fallback, &coords)
    }

    /// Rebuilds `run` on its stored matrix so incident totals differ from the
    /// baseline only by the options applied.
    fn rebuild(
        &self,
        run: &OptimizationRun,
        options: &BuildOptions,
        avoid: Option<Coordinates>,
    ) -> Result<BuildOutcome, PlannerError> {
        let depot = self.validate(&run.vehicles, &run.locations)?;

        let matrix = if run.matrix.is_valid_for(run.locations.len()) {
            Cow::Borrowed(&run.matrix)
        } else {
            warn!(run = %run.id, "stored matrix does not match the run's locations, refetching");
            Cow::Owned(self.acquire_matrix(&run.locations))
        };

        self.optimize(
            &run.vehicles,
            &run.locations,
            depot,
            &matrix,
            run.departure,
            options,
            avoid,
        )
    }

    /// Routes -> timing -> geometry.
    #[allow(clippy::too_many_arguments)]
    fn optimize(
        &self,
        vehicles: &[Vehicle],
        locations: &[Location],
        depot: usize,
        matrix: &TravelMatrix,
        departure: Time,
        options: &BuildOptions,
        avoid: Option<Coordinates>,
    ) -> Result<BuildOutcome, PlannerError> {
        let slots = expand_slots(vehicles);
        let mut outcome = build_routes(&slots, locations, depot, matrix, departure, options)?;
        if outcome.routes.is_empty() {
            warn!(
                locations = locations.len(),
                slots = slots.len(),
                "no location fits any vehicle"
            );
            return Err(PlannerError::NoFeasibleRoutes);
        }

        let geometry = self
            .geometry_provider
            .as_deref()
            .map(|p| p as &dyn GeometryProvider);
        for route in &mut outcome.routes {
            route.geometry = route_geometry(geometry, &route.coordinates(), avoid);
        }

        debug!(
            routes = outcome.routes.len(),
            unassigned = outcome.unassigned.len(),
            live = matrix.used_live_data,
            "optimization complete"
        );
        Ok(outcome)
    }
}

/// Midpoint of the leg from the depot to the route's first delivery.
fn default_incident_point(route: &Route) -> Option<Coordinates> {
    match route.stops.as_slice() {
        [depot, first, ..] => Some(midpoint(depot.coords, first.coords)),
        [only] => Some(only.coords),
        [] => None,
    }
}

/// Path through `stops`, avoiding `avoid` if possible.
///
/// An avoid-constrained request that fails is retried once without the
/// constraint. Returns `None` for fewer than two stops or no provider; callers
/// draw straight lines between stops in that case.
pub fn route_geometry(
    provider: Option<&dyn GeometryProvider>,
    stops: &[Coordinates],
    avoid: Option<Coordinates>,
) -> Option<Polyline> {
    let provider = provider?;
    if stops.len() < 2 {
        return None;
    }

    provider.geometry_for(stops, avoid).or_else(|| {
        avoid.and_then(|point| {
            warn!(?point, "geometry with avoid point unavailable, retrying without it");
            provider.geometry_for(stops, None)
        })
    })
}

//! Planner error taxonomy.

use thiserror::Error;

/// Machine-distinguishable category of a [`PlannerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inputs rejected before any computation.
    Validation,
    /// Inputs were individually valid but no route could be built.
    Optimization,
    /// The requested incident transition is not legal in the current state.
    State,
    /// Unexpected failure; details are logged, not returned.
    Internal,
}

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum PlannerError {
    #[error("no depot location provided")]
    MissingDepot,
    #[error("exactly one depot is allowed, found {0}")]
    MultipleDepots(usize),
    #[error("at least one vehicle is required")]
    NoVehicles,
    #[error("at least one delivery location is required")]
    NoLocations,
    #[error("{count} locations exceeds the limit of {max}")]
    TooManyLocations { count: usize, max: usize },
    #[error("{count} vehicles exceeds the limit of {max}")]
    TooManyVehicles { count: usize, max: usize },
    #[error("route index {index} is out of range for {routes} routes")]
    InvalidRouteIndex { index: usize, routes: usize },
    #[error("run {0} not found")]
    RunNotFound(String),
    #[error("no location fits any vehicle capacity")]
    NoFeasibleRoutes,
    #[error("no active incident to resolve")]
    NoActiveIncident,
    #[error("an incident is already active for this run")]
    IncidentAlreadyActive,
    #[error("internal planner error")]
    Internal,
}

impl PlannerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDepot
            | Self::MultipleDepots(_)
            | Self::NoVehicles
            | Self::NoLocations
            | Self::TooManyLocations { .. }
            | Self::TooManyVehicles { .. }
            | Self::InvalidRouteIndex { .. }
            | Self::RunNotFound(_) => ErrorKind::Validation,
            Self::NoFeasibleRoutes => ErrorKind::Optimization,
            Self::NoActiveIncident | Self::IncidentAlreadyActive => ErrorKind::State,
            Self::Internal => ErrorKind::Internal,
        }
    }
}

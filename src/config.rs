//! Planner configuration.
//!
//! Every section has defaults and deserializes with `#[serde(default)]`, so a
//! partial JSON document is enough. [`PlannerConfig::from_env`] overlays
//! `PLANNER_*` environment variables on the defaults.

use serde::Deserialize;
use tracing::warn;

use crate::annotate::SERVICE_MINUTES;
use crate::directions::DirectionsConfig;
use crate::haversine::{DEFAULT_CIRCUITY, DEFAULT_SPEED_KMH};
use crate::osrm::OsrmConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub service_minutes: f64,
    pub fallback_speed_kmh: f64,
    pub circuity: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            service_minutes: SERVICE_MINUTES,
            fallback_speed_kmh: DEFAULT_SPEED_KMH,
            circuity: DEFAULT_CIRCUITY,
        }
    }
}

/// Dataset caps enforced before any computation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_locations: usize,
    /// Counted after expanding vehicle `count`s into slots.
    pub max_vehicles: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_locations: 200,
            max_vehicles: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub routing: RoutingConfig,
    pub limits: LimitsConfig,
    /// Live matrix service; `None` means always use the geometric fallback.
    pub osrm: Option<OsrmConfig>,
    /// Directions service for geometry; `None` falls back to OSRM geometry when
    /// OSRM is configured.
    pub directions: Option<DirectionsConfig>,
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let timeout = parse(&lookup, "PLANNER_TIMEOUT_SECS");

        if let Some(base_url) = lookup("PLANNER_OSRM_URL") {
            let mut osrm = OsrmConfig {
                base_url,
                ..OsrmConfig::default()
            };
            if let Some(profile) = lookup("PLANNER_OSRM_PROFILE") {
                osrm.profile = profile;
            }
            if let Some(secs) = timeout {
                osrm.timeout_secs = secs;
            }
            config.osrm = Some(osrm);
        }

        if let Some(base_url) = lookup("PLANNER_DIRECTIONS_URL") {
            let mut directions = DirectionsConfig {
                base_url,
                api_key: lookup("PLANNER_DIRECTIONS_API_KEY"),
                ..DirectionsConfig::default()
            };
            if let Some(secs) = timeout {
                directions.timeout_secs = secs;
            }
            config.directions = Some(directions);
        }

        if let Some(max) = parse(&lookup, "PLANNER_MAX_LOCATIONS") {
            config.limits.max_locations = max;
        }
        if let Some(max) = parse(&lookup, "PLANNER_MAX_VEHICLES") {
            config.limits.max_vehicles = max;
        }

        config
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

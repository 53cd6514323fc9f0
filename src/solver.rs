//! Greedy capacity-constrained route builder.
//!
//! Vehicle slots are filled one at a time: each starts at the depot and keeps
//! driving to the nearest unassigned location that still fits its remaining
//! capacity. This is a construction heuristic, not an exact solver.

use std::borrow::Cow;

use jiff::civil::Time;
use tracing::debug;

use crate::annotate::{SERVICE_MINUTES, annotate};
use crate::error::PlannerError;
use crate::matrix::TravelMatrix;
use crate::model::{Location, LocationId, Route, Vehicle, VehicleSlot};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Legacy global slowdown applied to every duration. Values below 1.0 are ignored.
    pub traffic_multiplier: f64,
    /// Flat delay added once, to the first constructed route only.
    pub fixed_delay_minutes: f64,
    /// Dwell time per delivery stop.
    pub service_minutes: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            traffic_multiplier: 1.0,
            fixed_delay_minutes: 0.0,
            service_minutes: SERVICE_MINUTES,
        }
    }
}

impl BuildOptions {
    pub fn with_fixed_delay(mut self, minutes: f64) -> Self {
        self.fixed_delay_minutes = minutes;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub routes: Vec<Route>,
    /// Non-depot locations that did not fit any vehicle.
    pub unassigned: Vec<LocationId>,
}

#[derive(Debug, Clone)]
struct RouteState<'a> {
    slot: &'a VehicleSlot,
    path: Vec<usize>,
    remaining: u32,
}

/// Expands each vehicle record into `count` independent slots, in input order.
pub fn expand_slots(vehicles: &[Vehicle]) -> Vec<VehicleSlot> {
    vehicles
        .iter()
        .flat_map(|vehicle| {
            (1..=vehicle.count).map(move |unit| VehicleSlot {
                vehicle_id: vehicle.id.clone(),
                unit,
                label: if vehicle.count > 1 {
                    format!("{} #{}", vehicle.name, unit)
                } else {
                    vehicle.name.clone()
                },
                capacity: vehicle.capacity,
            })
        })
        .collect()
}

pub fn build_routes(
    slots: &[VehicleSlot],
    locations: &[Location],
    depot: usize,
    matrix: &TravelMatrix,
    departure: Time,
    options: &BuildOptions,
) -> Result<BuildOutcome, PlannerError> {
    let matrix = if options.traffic_multiplier > 1.0 {
        Cow::Owned(matrix.clone().with_traffic_multiplier(options.traffic_multiplier))
    } else {
        Cow::Borrowed(matrix)
    };

    let (states, assigned) = partition(slots, locations, depot, &matrix);

    let mut routes = Vec::with_capacity(states.len());
    for state in states {
        let stops = annotate(&state.path, locations, &matrix, departure, options.service_minutes)?;
        let (total_distance_km, total_duration_minutes) = stops
            .last()
            .map(|stop| (stop.cumulative_distance_km, stop.cumulative_duration_minutes))
            .unwrap_or_default();

        routes.push(Route {
            vehicle: state.slot.clone(),
            stops,
            total_distance_km,
            total_duration_minutes,
            capacity_used: state.slot.capacity - state.remaining,
            geometry: None,
            used_live_data: matrix.used_live_data,
        });
    }

    let delay = options.fixed_delay_minutes.max(0.0);
    if delay > 0.0 {
        if let Some(first) = routes.first_mut() {
            first.total_duration_minutes += delay;
        }
    }

    let unassigned = locations
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != depot && !assigned[*index])
        .map(|(_, location)| location.id.clone())
        .collect();

    Ok(BuildOutcome { routes, unassigned })
}

/// Greedy nearest-unassigned partition.
///
/// Returns the non-empty routes (depot first and last) and the assignment mask.
fn partition<'a>(
    slots: &'a [VehicleSlot],
    locations: &[Location],
    depot: usize,
    matrix: &TravelMatrix,
) -> (Vec<RouteState<'a>>, Vec<bool>) {
    let mut assigned = vec![false; locations.len()];
    let to_assign = locations.len().saturating_sub(1);
    let mut assigned_count = 0;
    let mut routes = Vec::new();

    for slot in slots {
        if assigned_count >= to_assign {
            break;
        }

        let mut route = RouteState {
            slot,
            path: vec![depot],
            remaining: slot.capacity,
        };
        let mut current = depot;

        while let Some(next) =
            nearest_fitting(current, route.remaining, locations, depot, &assigned, matrix)
        {
            route.path.push(next);
            route.remaining -= locations[next].demand;
            assigned[next] = true;
            assigned_count += 1;
            current = next;
        }

        if route.path.len() > 1 {
            route.path.push(depot);
            debug!(
                vehicle = %slot.label,
                stops = route.path.len() - 2,
                load = slot.capacity - route.remaining,
                "route built"
            );
            routes.push(route);
        }
    }

    (routes, assigned)
}

/// Closest unassigned non-depot location whose demand fits `remaining`.
///
/// Ties keep the first location in input order.
fn nearest_fitting(
    current: usize,
    remaining: u32,
    locations: &[Location],
    depot: usize,
    assigned: &[bool],
    matrix: &TravelMatrix,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, location) in locations.iter().enumerate() {
        if index == depot || assigned[index] || location.demand > remaining {
            continue;
        }

        let distance = matrix.distance(current, index).unwrap_or(f64::INFINITY);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
}

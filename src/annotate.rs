//! Per-stop distance, timing and arrival estimates for a built route.

use jiff::civil::Time;
use tracing::error;

use crate::error::PlannerError;
use crate::matrix::TravelMatrix;
use crate::model::{Location, Stop};

/// Dwell time at every delivery stop, in minutes.
pub const SERVICE_MINUTES: f64 = 15.0;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Walk `path` (location indices, depot first and last) and build annotated stops.
///
/// Every stop except the closing one carries `service_minutes` on top of its
/// travel time from the previous stop.
pub fn annotate(
    path: &[usize],
    locations: &[Location],
    matrix: &TravelMatrix,
    departure: Time,
    service_minutes: f64,
) -> Result<Vec<Stop>, PlannerError> {
    let mut stops = Vec::with_capacity(path.len());
    let mut cumulative_distance = 0.0;
    let mut cumulative_duration = 0.0;
    let last = path.len().saturating_sub(1);

    for (order, &index) in path.iter().enumerate() {
        let location = locations.get(index).ok_or_else(|| {
            error!(index, locations = locations.len(), "route references unknown location");
            PlannerError::Internal
        })?;

        let (leg_distance, leg_duration) = match order {
            0 => (0.0, 0.0),
            _ => {
                let previous = path[order - 1];
                let lookup = matrix
                    .distance(previous, index)
                    .zip(matrix.duration(previous, index));
                let (distance, travel) = lookup.ok_or_else(|| {
                    error!(previous, index, size = matrix.len(), "matrix lookup out of range");
                    PlannerError::Internal
                })?;
                let service = if order == last { 0.0 } else { service_minutes };
                (distance, travel + service)
            }
        };

        cumulative_distance += leg_distance;
        cumulative_duration += leg_duration;

        stops.push(Stop {
            location_id: location.id.clone(),
            name: location.name.clone(),
            coords: location.coords(),
            demand: location.demand,
            order,
            distance_from_previous_km: leg_distance,
            duration_from_previous_minutes: leg_duration,
            cumulative_distance_km: cumulative_distance,
            cumulative_duration_minutes: cumulative_duration,
            eta: format_eta(departure, cumulative_duration),
        });
    }

    Ok(stops)
}

/// Formats `departure + elapsed_minutes` as a 12-hour clock, e.g. `"1:05 PM"`.
///
/// Wraps past midnight; hour 0 renders as 12.
pub fn format_eta(departure: Time, elapsed_minutes: f64) -> String {
    let start = i64::from(departure.hour()) * 60 + i64::from(departure.minute());
    let elapsed = if elapsed_minutes.is_finite() { elapsed_minutes.round() as i64 } else { 0 };
    let minute_of_day = (start + elapsed).rem_euclid(MINUTES_PER_DAY);

    let hour = minute_of_day / 60;
    let minute = minute_of_day % 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };

    format!("{hour12}:{minute:02} {period}")
}

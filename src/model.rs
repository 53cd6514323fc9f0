//! Domain records shared by every planner stage.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// Latitude/longitude pair in degrees.
pub type Coordinates = (f64, f64);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// A delivery stop or the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Capacity units consumed when visited.
    pub demand: u32,
    pub is_depot: bool,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: LocationId::new(id),
            name: name.into(),
            latitude,
            longitude,
            demand: 0,
            is_depot: false,
        }
    }

    pub fn with_demand(mut self, demand: u32) -> Self {
        self.demand = demand;
        self
    }

    pub fn depot(mut self) -> Self {
        self.is_depot = true;
        self
    }

    pub fn coords(&self) -> Coordinates {
        (self.latitude, self.longitude)
    }
}

/// A vehicle record standing for `count` identical physical vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub capacity: u32,
    pub count: u32,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: VehicleId::new(id),
            name: name.into(),
            capacity,
            count: 1,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// One physical vehicle after expanding a [`Vehicle`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSlot {
    pub vehicle_id: VehicleId,
    /// 1-based unit number within the vehicle record.
    pub unit: u32,
    pub label: String,
    pub capacity: u32,
}

/// A visited point along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location_id: LocationId,
    pub name: String,
    pub coords: Coordinates,
    pub demand: u32,
    /// 0-based position within the route.
    pub order: usize,
    pub distance_from_previous_km: f64,
    pub duration_from_previous_minutes: f64,
    pub cumulative_distance_km: f64,
    pub cumulative_duration_minutes: f64,
    /// Formatted 12-hour arrival estimate, e.g. `"9:05 AM"`.
    pub eta: String,
}

/// An ordered depot-to-depot tour served by one vehicle slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle: VehicleSlot,
    pub stops: Vec<Stop>,
    pub total_distance_km: f64,
    /// Travel plus service time, plus any injected incident delay.
    pub total_duration_minutes: f64,
    pub capacity_used: u32,
    pub geometry: Option<Polyline>,
    pub used_live_data: bool,
}

impl Route {
    /// Stops excluding the opening and closing depot visits.
    pub fn deliveries(&self) -> &[Stop] {
        match self.stops.len() {
            0..=2 => &[],
            len => &self.stops[1..len - 1],
        }
    }

    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.stops.iter().map(|stop| stop.coords).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, order: usize) -> Stop {
        Stop {
            location_id: LocationId::new(id),
            name: id.to_string(),
            coords: (0.0, 0.0),
            demand: 0,
            order,
            distance_from_previous_km: 0.0,
            duration_from_previous_minutes: 0.0,
            cumulative_distance_km: 0.0,
            cumulative_duration_minutes: 0.0,
            eta: String::new(),
        }
    }

    #[test]
    fn deliveries_strip_depot_visits() {
        let route = Route {
            vehicle: VehicleSlot {
                vehicle_id: VehicleId::new("v"),
                unit: 1,
                label: "Van".to_string(),
                capacity: 10,
            },
            stops: vec![stop("depot", 0), stop("a", 1), stop("b", 2), stop("depot", 3)],
            total_distance_km: 0.0,
            total_duration_minutes: 0.0,
            capacity_used: 0,
            geometry: None,
            used_live_data: false,
        };

        let ids: Vec<_> = route.deliveries().iter().map(|s| s.location_id.0.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn vehicle_defaults_to_single_unit() {
        let vehicle = Vehicle::new("v1", "Van", 20);
        assert_eq!(vehicle.count, 1);
        assert_eq!(vehicle.with_count(3).count, 3);
    }

    #[test]
    fn location_serializes_with_plain_id() {
        let location = Location::new("loc-1", "Depot", 36.1, -115.1).depot();
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["id"], "loc-1");
        assert_eq!(json["is_depot"], true);
    }
}

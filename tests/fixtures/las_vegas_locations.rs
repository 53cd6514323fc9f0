//! Real Las Vegas locations for delivery fixtures.
//!
//! Coordinates sourced from OpenStreetMap. They are routable with OSRM Nevada
//! data and close enough together for single-depot delivery tests.

use delivery_planner::model::Location;

/// A named point with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Depots
// ============================================================================

pub const DEPOTS: &[Place] = &[
    Place::new("MGM Grand", 36.1023654, -115.1688720),
    Place::new("Wynn Las Vegas", 36.1263781, -115.1658180),
];

// ============================================================================
// Strip Area Restaurants (delivery stops)
// ============================================================================

pub const STRIP_RESTAURANTS: &[Place] = &[
    Place::new("Hard Rock Cafe", 36.1041592, -115.1722166),
    Place::new("SW Steakhouse", 36.1262145, -115.1669146),
    Place::new("Sinatra", 36.1300035, -115.1654850),
    Place::new("Public House", 36.1219193, -115.1689317),
    Place::new("The Crack Shack", 36.1050709, -115.1735287),
    Place::new("Brooklyn Bowl", 36.1175388, -115.1695094),
    Place::new("Gordon Ramsay BurGR", 36.1107195, -115.1720818),
    Place::new("Earl of Sandwich Planet Hollywood", 36.1093912, -115.1720087),
    Place::new("Spago by Wolfgang Puck", 36.1139368, -115.1741462),
    Place::new("BLT Steakhouse", 36.1135528, -115.1690095),
];

/// Depot at `depot` followed by `stops`, each with the same `demand`.
pub fn delivery_locations(depot: &Place, stops: &[Place], demand: u32) -> Vec<Location> {
    let mut locations = vec![Location::new("depot", depot.name, depot.lat, depot.lng).depot()];
    locations.extend(
        stops
            .iter()
            .enumerate()
            .map(|(i, place)| {
                Location::new(format!("stop-{i}"), place.name, place.lat, place.lng)
                    .with_demand(demand)
            }),
    );
    locations
}

//! OSRM HTTP adapter for distance matrices and route geometry.

use serde::Deserialize;
use tracing::warn;

use crate::matrix::TravelMatrix;
use crate::model::Coordinates;
use crate::polyline::Polyline;
use crate::traits::{DistanceMatrixProvider, GeometryProvider};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn service_url(&self, service: &str, locations: &[Coordinates]) -> String {
        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            service,
            self.config.profile,
            coordinate_path(locations)
        )
    }
}

/// OSRM expects `lng,lat` pairs separated by semicolons.
fn coordinate_path(locations: &[Coordinates]) -> String {
    locations
        .iter()
        .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
        .collect::<Vec<_>>()
        .join(";")
}

impl DistanceMatrixProvider for OsrmClient {
    fn matrix_for(&self, locations: &[Coordinates]) -> Option<TravelMatrix> {
        if locations.is_empty() {
            return None;
        }

        let url = format!("{}?annotations=distance,duration", self.service_url("table", locations));

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>());

        match response {
            Ok(body) => body.into_matrix(),
            Err(err) => {
                warn!(error = %err, "OSRM table request failed");
                None
            }
        }
    }
}

impl GeometryProvider for OsrmClient {
    /// OSRM has no point exclusion, so avoid-point requests are declined and
    /// the caller retries without the constraint.
    fn geometry_for(&self, stops: &[Coordinates], avoid: Option<Coordinates>) -> Option<Polyline> {
        if stops.len() < 2 || avoid.is_some() {
            return None;
        }

        let url = format!("{}?overview=full&geometries=geojson", self.service_url("route", stops));

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>());

        match response {
            Ok(body) => body
                .routes
                .into_iter()
                .next()
                .map(|route| Polyline::from_lng_lat(&route.geometry.coordinates)),
            Err(err) => {
                warn!(error = %err, "OSRM route request failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    /// Meters.
    distances: Option<Vec<Vec<Option<f64>>>>,
    /// Seconds.
    durations: Option<Vec<Vec<Option<f64>>>>,
}

impl OsrmTableResponse {
    /// Converts to km/minutes; any missing field or unreachable pair makes the
    /// whole response unusable.
    fn into_matrix(self) -> Option<TravelMatrix> {
        if self.code != "Ok" {
            warn!(code = %self.code, "OSRM table returned non-Ok code");
            return None;
        }

        let convert = |rows: Vec<Vec<Option<f64>>>, divisor: f64| -> Option<Vec<Vec<f64>>> {
            rows.into_iter()
                .map(|row| row.into_iter().map(|cell| cell.map(|v| v / divisor)).collect())
                .collect()
        };

        let distance_km = convert(self.distances?, 1000.0)?;
        let duration_minutes = convert(self.durations?, 60.0)?;
        Some(TravelMatrix::new(distance_km, duration_minutes, true))
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    coordinates: Vec<[f64; 2]>,
}

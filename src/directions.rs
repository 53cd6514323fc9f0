//! Directions service adapter that can route around a point.
//!
//! Speaks the OpenRouteService GeoJSON directions API: the avoid point is sent
//! as a small square `avoid_polygons` constraint.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::model::Coordinates;
use crate::polyline::Polyline;
use crate::traits::GeometryProvider;

/// Half-width of the square excluded around an avoid point, in degrees (~250 m).
const AVOID_HALF_WIDTH_DEG: f64 = 0.0025;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub profile: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            profile: "driving-car".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }
}

/// Request body with `[lng, lat]` coordinates and an optional exclusion square.
fn request_body(stops: &[Coordinates], avoid: Option<Coordinates>) -> Value {
    let coordinates: Vec<[f64; 2]> = stops.iter().map(|(lat, lng)| [*lng, *lat]).collect();
    let mut body = json!({ "coordinates": coordinates });

    if let Some((lat, lng)) = avoid {
        let d = AVOID_HALF_WIDTH_DEG;
        let ring = [
            [lng - d, lat - d],
            [lng + d, lat - d],
            [lng + d, lat + d],
            [lng - d, lat + d],
            [lng - d, lat - d],
        ];
        body["options"] = json!({
            "avoid_polygons": { "type": "Polygon", "coordinates": [ring] }
        });
    }

    body
}

impl GeometryProvider for DirectionsClient {
    fn geometry_for(&self, stops: &[Coordinates], avoid: Option<Coordinates>) -> Option<Polyline> {
        if stops.len() < 2 {
            return None;
        }

        let mut request = self.client.post(self.url()).json(&request_body(stops, avoid));
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", key);
        }

        let response = request
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectionsResponse>());

        match response {
            Ok(body) => body
                .features
                .into_iter()
                .next()
                .map(|feature| Polyline::from_lng_lat(&feature.geometry.coordinates)),
            Err(err) => {
                warn!(error = %err, avoiding = avoid.is_some(), "directions request failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: LineString,
}

#[derive(Debug, Deserialize)]
struct LineString {
    coordinates: Vec<[f64; 2]>,
}

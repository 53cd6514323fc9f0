//! Incident types and the analysis collaborator's contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::traits::IncidentAnalyzer;

/// Shortest delay an incident may inject, in minutes.
pub const MIN_INCIDENT_DELAY_MINUTES: f64 = 30.0;
/// Longest delay an incident may inject, in minutes.
pub const MAX_INCIDENT_DELAY_MINUTES: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    Accident,
    RoadClosure,
    Construction,
    Weather,
    HeavyTraffic,
}

impl IncidentType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accident => "ACCIDENT",
            Self::RoadClosure => "ROAD_CLOSURE",
            Self::Construction => "CONSTRUCTION",
            Self::Weather => "WEATHER",
            Self::HeavyTraffic => "HEAVY_TRAFFIC",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown incident type: {0}")]
pub struct UnknownIncidentType(pub String);

impl FromStr for IncidentType {
    type Err = UnknownIncidentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "ACCIDENT" => Ok(Self::Accident),
            "ROAD_CLOSURE" | "CLOSURE" => Ok(Self::RoadClosure),
            "CONSTRUCTION" => Ok(Self::Construction),
            "WEATHER" => Ok(Self::Weather),
            "HEAVY_TRAFFIC" | "TRAFFIC" => Ok(Self::HeavyTraffic),
            _ => Err(UnknownIncidentType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

/// Delay estimate and metadata returned by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAnalysis {
    pub fixed_delay_minutes: f64,
    pub severity: Severity,
    pub recommendation: String,
    pub should_reroute: bool,
}

impl IncidentAnalysis {
    /// Forces the delay into the allowed window; non-finite delays take the minimum.
    pub fn clamped(mut self) -> Self {
        self.fixed_delay_minutes = clamp_delay(self.fixed_delay_minutes);
        self
    }
}

pub fn clamp_delay(minutes: f64) -> f64 {
    if minutes.is_finite() {
        minutes.clamp(MIN_INCIDENT_DELAY_MINUTES, MAX_INCIDENT_DELAY_MINUTES)
    } else {
        MIN_INCIDENT_DELAY_MINUTES
    }
}

/// Static per-type estimates, used when no analysis service answers.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAnalyzer;

impl RuleBasedAnalyzer {
    pub fn estimate(&self, incident_type: &IncidentType) -> IncidentAnalysis {
        let (delay, severity, recommendation) = match incident_type {
            IncidentType::Accident => (
                60.0,
                Severity::High,
                "Avoid the collision site and notify affected customers.",
            ),
            IncidentType::RoadClosure => (
                120.0,
                Severity::Critical,
                "Road is impassable; detour around the closure.",
            ),
            IncidentType::Construction => (
                45.0,
                Severity::Moderate,
                "Expect lane restrictions; allow extra time.",
            ),
            IncidentType::Weather => (
                90.0,
                Severity::High,
                "Reduce speed and delay non-urgent deliveries.",
            ),
            IncidentType::HeavyTraffic => (
                30.0,
                Severity::Low,
                "Minor slowdown; keep the current plan.",
            ),
        };

        IncidentAnalysis {
            fixed_delay_minutes: delay,
            severity,
            recommendation: recommendation.to_string(),
            should_reroute: severity != Severity::Low,
        }
    }
}

impl IncidentAnalyzer for RuleBasedAnalyzer {
    fn analyze(
        &self,
        incident_type: &IncidentType,
        _route_index: usize,
    ) -> Option<IncidentAnalysis> {
        Some(self.estimate(incident_type))
    }
}

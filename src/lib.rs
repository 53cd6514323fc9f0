//! delivery-planner core
//!
//! Capacity-constrained delivery routing with incident re-optimization.

pub mod annotate;
pub mod config;
pub mod directions;
pub mod error;
pub mod haversine;
pub mod incident;
pub mod matrix;
pub mod model;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod registry;
pub mod run;
pub mod solver;
pub mod traits;

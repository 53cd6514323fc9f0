//! Test fixtures for delivery-planner.
//!
//! Provides real Las Vegas coordinates and deterministic stand-ins for the
//! network collaborators.

#![allow(dead_code)]

pub mod las_vegas_locations;
pub mod providers;

pub use las_vegas_locations::*;
pub use providers::*;

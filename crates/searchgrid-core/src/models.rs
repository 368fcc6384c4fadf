//! Configuration and boundary types for the planner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planner configuration.
///
/// All distances are meters except `altitude_ft`, which is the output
/// altitude written for generated search waypoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Minimum turn radius of the aircraft in meters.
    pub turn_radius_m: f64,
    /// Spacing between sweep lines in meters. Values below the turn radius
    /// are clamped up to it; see [`PlannerConfig::offset`].
    pub sweep_offset_m: f64,
    /// Distance sweep endpoints are pulled inward so the aircraft can
    /// reach and exit each waypoint.
    pub correction_m: f64,
    /// Output altitude for generated waypoints, in feet.
    pub altitude_ft: f64,
    /// Effective infinity for sweep-line extension and non-adjacent tour
    /// weights. Must exceed any polygon diameter without overflowing when
    /// multiplied by an edge slope.
    pub extent: f64,
    /// Tolerance for intersection and collinearity predicates.
    pub epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            turn_radius_m: 36.6,
            sweep_offset_m: 36.6,
            correction_m: 36.6,
            altitude_ft: 150.0,
            extent: 1e6,
            epsilon: f64::EPSILON,
        }
    }
}

impl PlannerConfig {
    /// Sweep-line spacing with the turn-radius lower bound applied.
    pub fn offset(&self) -> f64 {
        self.sweep_offset_m.max(self.turn_radius_m)
    }
}

/// A GPS position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// The three point streams a planning invocation consumes.
///
/// The first search-grid point anchors the local tangent frame; the last
/// mission point is where the aircraft will be when it enters the search
/// task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionInput {
    pub mission: Vec<GpsPoint>,
    pub search: Vec<GpsPoint>,
    pub boundary: Vec<GpsPoint>,
}

/// Planner output: the transit leg from the inbound point to the start of
/// the sweep, and the sweep waypoints themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionPlan {
    pub transit: Vec<GpsPoint>,
    pub search: Vec<GpsPoint>,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("polygon needs at least {expected} vertices, got {actual}")]
    TooFewVertices { expected: usize, actual: usize },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("geometry failure: {operation}")]
    Geometry { operation: String },
}

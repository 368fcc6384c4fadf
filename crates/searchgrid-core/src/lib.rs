//! Searchgrid core - coverage path planning for fixed-wing search
//! missions.
//!
//! This crate contains the planar geometry pipeline and waypoint
//! generation with NO file or network dependencies: convex decomposition
//! of the search polygon, width-aligned sweep traversal per subregion,
//! tour ordering across subregions, and boundary-safe rerouting, all in a
//! local tangent frame anchored at the search grid.

pub mod decompose;
pub mod geometry;
pub mod models;
pub mod planner;
pub mod routing;
pub mod spatial;
pub mod sweep;
pub mod tour;

pub use models::{GpsPoint, MissionInput, MissionPlan, PlanError, PlannerConfig};
pub use planner::{plan_mission, plan_naive_path, plan_search_path, SweepMode};

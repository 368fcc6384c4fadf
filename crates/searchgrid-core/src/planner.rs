//! Pipeline orchestration: polygon in, ordered waypoints out.
//!
//! The metric pipeline is decompose -> merge -> per-subregion sweeps ->
//! tour -> flatten. `plan_mission` wraps it with the GPS conversions and
//! the boundary-safe transit leg from the inbound point.

use crate::decompose::{decompose, merge_subregions};
use crate::geometry::{Point, Polygon};
use crate::models::{GpsPoint, MissionInput, MissionPlan, PlanError, PlannerConfig};
use crate::routing::route_between;
use crate::spatial::TangentFrame;
use crate::sweep::{naive_sweep, sweep_polygon};
use crate::tour::{assign_start_states, flatten, SubregionNode, TourGraph};

/// Which traversal strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// Single east-west sweep over the whole polygon.
    Naive,
    /// Convex decomposition with width-aligned sweeps per subregion.
    Decompose,
}

fn check_config(cfg: &PlannerConfig) -> Result<(), PlanError> {
    // A non-positive step would stall the sweep loop.
    if !cfg.offset().is_finite() || cfg.offset() <= 0.0 {
        return Err(PlanError::MalformedInput {
            reason: "sweep offset and turn radius must be positive".to_string(),
        });
    }
    Ok(())
}

/// Coverage path for a search polygon in local metric coordinates.
pub fn plan_search_path(polygon: &Polygon, cfg: &PlannerConfig) -> Result<Vec<Point>, PlanError> {
    check_config(cfg)?;
    if polygon.is_convex() {
        // Nothing to decompose or order; sweep the region directly.
        let sweeps = sweep_polygon(polygon, cfg);
        let node = SubregionNode::new(0, sweeps);
        return Ok(flatten(&[0], std::slice::from_ref(&node)));
    }

    let subregions = merge_subregions(decompose(polygon)?);

    // Subregions too slim to fit one corrected sweep contribute no
    // waypoints and would break corner selection; leave them out of the
    // tour.
    let nodes: Vec<SubregionNode> = subregions
        .iter()
        .enumerate()
        .map(|(i, subregion)| SubregionNode::new(i, sweep_polygon(subregion, cfg)))
        .filter(|node| !node.sweeps.is_empty())
        .collect();
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let graph = TourGraph::build(&nodes, &subregions, cfg.extent);
    let order = graph.min_traversal();
    let mut nodes = nodes;
    assign_start_states(&order, &mut nodes, &subregions);
    Ok(flatten(&order, &nodes))
}

/// Coverage path using the naive east-west traversal.
pub fn plan_naive_path(polygon: &Polygon, cfg: &PlannerConfig) -> Result<Vec<Point>, PlanError> {
    check_config(cfg)?;
    let sweeps = naive_sweep(polygon, cfg);
    let node = SubregionNode::new(0, sweeps);
    Ok(flatten(&[0], std::slice::from_ref(&node)))
}

/// Full GPS-level planning invocation.
///
/// The tangent frame is anchored at the first search-grid point; both
/// polygons are canonicalised to CCW on ingest. The transit leg runs from
/// the last mission point to the first sweep waypoint without crossing
/// the flight boundary.
pub fn plan_mission(
    input: &MissionInput,
    mode: SweepMode,
    cfg: &PlannerConfig,
) -> Result<MissionPlan, PlanError> {
    let reference = input
        .search
        .first()
        .ok_or_else(|| PlanError::MalformedInput {
            reason: "search grid is empty".to_string(),
        })?;
    let frame = TangentFrame::new(
        reference.lon_deg.to_radians(),
        reference.lat_deg.to_radians(),
    );

    let search = Polygon::new(to_local(&frame, &input.search))?;
    let boundary = Polygon::new(to_local(&frame, &input.boundary))?;

    let path = match mode {
        SweepMode::Decompose => plan_search_path(&search, cfg)?,
        SweepMode::Naive => plan_naive_path(&search, cfg)?,
    };

    let transit = match (input.mission.last(), path.first()) {
        (Some(inbound), Some(&entry)) => {
            let start = frame.to_local(inbound.lon_deg.to_radians(), inbound.lat_deg.to_radians());
            route_between(start, entry, &boundary, cfg)?
        }
        _ => Vec::new(),
    };

    Ok(MissionPlan {
        transit: to_gps(&frame, &transit),
        search: to_gps(&frame, &path),
    })
}

fn to_local(frame: &TangentFrame, points: &[GpsPoint]) -> Vec<Point> {
    points
        .iter()
        .map(|g| frame.to_local(g.lon_deg.to_radians(), g.lat_deg.to_radians()))
        .collect()
}

fn to_gps(frame: &TangentFrame, points: &[Point]) -> Vec<GpsPoint> {
    points
        .iter()
        .map(|&p| {
            let (lon_rad, lat_rad) = frame.to_gps(p);
            GpsPoint {
                lat_deg: lat_rad.to_degrees(),
                lon_deg: lon_rad.to_degrees(),
            }
        })
        .collect()
}

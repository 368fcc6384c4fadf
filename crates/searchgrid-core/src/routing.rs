//! Boundary-safe rerouting between two interior points.
//!
//! When the straight segment between two points crosses the flight
//! boundary, each crossing is replaced by a waypoint pushed one turn
//! radius inside the boundary, and the expanded polyline is unfolded
//! again until a full pass over it inserts nothing.

use crate::geometry::{segment_intersection, Edge, Point, Polygon};
use crate::models::{PlanError, PlannerConfig};
use std::f64::consts::FRAC_PI_2;

/// Bound on unfolding passes; hitting it means the boundary keeps
/// generating fresh crossings faster than offsets resolve them.
const MAX_UNFOLD_PASSES: usize = 32;

/// Tolerance for recognising an offset waypoint the polyline already has.
/// Re-deriving an existing waypoint must not splice it in again, or a
/// notch the offset cannot clear would unfold forever.
const DUPLICATE_TOL_M: f64 = 1e-9;

/// Intermediate waypoints making the leg from `from` to `to` stay inside
/// the boundary polygon. Empty when the straight segment already does.
///
/// The boundary must be CCW (canonicalised at ingest): the inward normal
/// of edge `e` is taken as `theta(e) + pi/2`.
pub fn route_between(
    from: Point,
    to: Point,
    boundary: &Polygon,
    cfg: &PlannerConfig,
) -> Result<Vec<Point>, PlanError> {
    let mut path = vec![from, to];
    for _ in 0..MAX_UNFOLD_PASSES {
        let mut changed = false;
        let mut i = 0;
        while i + 1 < path.len() {
            changed |= expand_segment(&mut path, i, boundary, cfg);
            i += 1;
        }
        if !changed {
            return Ok(path[1..path.len() - 1].to_vec());
        }
    }
    Err(PlanError::Geometry {
        operation: "boundary reroute did not converge".to_string(),
    })
}

/// Replace the crossings of segment `i` with inward-offset waypoints.
/// Returns whether anything was inserted.
fn expand_segment(path: &mut Vec<Point>, i: usize, boundary: &Polygon, cfg: &PlannerConfig) -> bool {
    let segment = Edge::new(path[i], path[i + 1]);
    let mut crossings: Vec<(usize, Point)> = (0..boundary.len())
        .filter_map(|e| segment_intersection(segment, boundary.edge(e), cfg.epsilon).map(|p| (e, p)))
        .collect();
    if crossings.is_empty() {
        return false;
    }
    crossings.sort_by(|a, b| {
        segment
            .a
            .distance_to(a.1)
            .total_cmp(&segment.a.distance_to(b.1))
    });

    let mut inserted = 0;
    for (edge_index, crossing) in crossings {
        let inward = boundary.edge(edge_index).theta() + FRAC_PI_2;
        let waypoint = Point::new(
            crossing.x + cfg.turn_radius_m * inward.cos(),
            crossing.y + cfg.turn_radius_m * inward.sin(),
        );
        // Offsets that escape the polygon (sharp concave corners) would
        // route the aircraft outward; drop them instead.
        if !boundary.contains_point(waypoint) {
            continue;
        }
        if path
            .iter()
            .any(|p| p.distance_to(waypoint) < DUPLICATE_TOL_M)
        {
            continue;
        }
        path.insert(i + 1 + inserted, waypoint);
        inserted += 1;
    }
    inserted > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(radius: f64) -> PlannerConfig {
        PlannerConfig {
            turn_radius_m: radius,
            sweep_offset_m: radius,
            correction_m: radius,
            ..PlannerConfig::default()
        }
    }

    fn crossing_count(polyline: &[Point], boundary: &Polygon) -> usize {
        polyline
            .windows(2)
            .map(|pair| {
                let segment = Edge::new(pair[0], pair[1]);
                (0..boundary.len())
                    .filter(|&i| {
                        segment_intersection(segment, boundary.edge(i), f64::EPSILON).is_some()
                    })
                    .count()
            })
            .sum()
    }

    #[test]
    fn interior_segment_needs_no_waypoints() {
        let boundary = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ])
        .unwrap();
        let waypoints = route_between(
            Point::new(10.0, 10.0),
            Point::new(90.0, 90.0),
            &boundary,
            &config(10.0),
        )
        .unwrap();
        assert!(waypoints.is_empty());
    }

    #[test]
    fn c_shape_crossing_inserts_two_inward_waypoints() {
        // C-shaped boundary: a slot from the top down to y = 3 between
        // x = 40 and x = 60. The straight segment at y = 5 exits through
        // one slot wall and re-enters through the other.
        let boundary = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(60.0, 100.0),
            Point::new(60.0, 3.0),
            Point::new(40.0, 3.0),
            Point::new(40.0, 100.0),
            Point::new(0.0, 100.0),
        ])
        .unwrap();
        let from = Point::new(5.0, 5.0);
        let to = Point::new(95.0, 5.0);
        let waypoints = route_between(from, to, &boundary, &config(1.0)).unwrap();
        assert_eq!(waypoints.len(), 2);
        // One radius inside each slot wall, ordered from `from`.
        assert!((waypoints[0].x - 39.0).abs() < 1e-9);
        assert!((waypoints[0].y - 5.0).abs() < 1e-9);
        assert!((waypoints[1].x - 61.0).abs() < 1e-9);
        assert!(waypoints.iter().all(|w| boundary.contains_point(*w)));
    }

    #[test]
    fn corner_clip_reroutes_around_the_reflex_vertex() {
        // L-shaped boundary; the straight leg clips the inner corner at
        // (30, 30). The unfold staircases around it and the final
        // polyline is crossing-free.
        let boundary = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(60.0, 30.0),
            Point::new(30.0, 30.0),
            Point::new(30.0, 60.0),
            Point::new(0.0, 60.0),
        ])
        .unwrap();
        let from = Point::new(20.0, 50.0);
        let to = Point::new(50.0, 20.0);
        let waypoints = route_between(from, to, &boundary, &config(2.0)).unwrap();
        assert!(!waypoints.is_empty());
        assert!(waypoints.iter().all(|w| boundary.contains_point(*w)));

        let mut polyline = vec![from];
        polyline.extend(&waypoints);
        polyline.push(to);
        assert_eq!(crossing_count(&polyline, &boundary), 0);
    }
}

//! Sweep traversal of a convex subregion.
//!
//! An infinite sweep line parallel to the width edge advances through the
//! polygon in steps of the configured offset; its intersections with the
//! polygon edges become waypoint pairs, pulled inward by the turn-radius
//! correction and emitted in alternating order so the flight path snakes.

use crate::decompose::width;
use crate::geometry::{segment_intersection, Edge, Point, Polygon};
use crate::models::PlannerConfig;

/// Generate the ordered sweep segments for a convex polygon.
pub fn sweep_polygon(polygon: &Polygon, cfg: &PlannerConfig) -> Vec<Edge> {
    let span = width(polygon);
    let advance_theta = span.theta();
    let step = Point::new(
        cfg.offset() * advance_theta.cos(),
        cfg.offset() * advance_theta.sin(),
    );

    // Start collinear with the width edge, stretched far past the polygon,
    // then take the first step so the opening sweep sits one offset inside.
    let mut line = extend(span.edge, cfg.extent).translated(step);

    let mut sweeps = Vec::new();
    let mut parity = 0usize;
    loop {
        let Some((inter1, inter2)) = crossing_pair(polygon, line, cfg.epsilon) else {
            break;
        };
        if let Some(segment) = corrected_segment(inter1, inter2, line, cfg) {
            sweeps.push(if parity % 2 == 0 {
                segment
            } else {
                Edge::new(segment.b, segment.a)
            });
        }
        line = line.translated(step);
        parity += 1;
    }

    trim_final_sweep(&mut sweeps, polygon, advance_theta, cfg);
    sweeps
}

/// Stretch an edge by `extent` on both ends, preserving its orientation.
fn extend(edge: Edge, extent: f64) -> Edge {
    let mut e = edge;
    if e.is_vertical() {
        e.a.y = -extent;
        e.b.y = extent;
        return e;
    }
    let slope = e.slope();
    if e.a.x < e.b.x {
        e.a.x -= extent;
        e.a.y -= extent * slope;
        e.b.x += extent;
        e.b.y += extent * slope;
    } else {
        e.b.x -= extent;
        e.b.y -= extent * slope;
        e.a.x += extent;
        e.a.y += extent * slope;
    }
    e
}

/// First and next distinct intersection of the sweep line with the
/// polygon's edges, scanning in edge-index order. Fewer than two distinct
/// crossings means the region is exhausted.
fn crossing_pair(polygon: &Polygon, line: Edge, eps: f64) -> Option<(Point, Point)> {
    let mut first: Option<Point> = None;
    for i in 0..polygon.len() {
        if let Some(p) = segment_intersection(line, polygon.edge(i), eps) {
            match first {
                None => first = Some(p),
                Some(f) if p != f => return Some((f, p)),
                Some(_) => {}
            }
        }
    }
    None
}

/// Pull both endpoints inward by the turn-radius correction, independently
/// per axis, dropping the sweep when the endpoints cross each other.
fn corrected_segment(inter1: Point, inter2: Point, line: Edge, cfg: &PlannerConfig) -> Option<Edge> {
    let theta = line.theta();
    let dx = (cfg.correction_m * theta.cos()).abs();
    let dy = (cfg.correction_m * theta.sin()).abs();
    let (mut a, mut b) = (inter1, inter2);
    if b.x > a.x {
        b.x -= dx;
        a.x += dx;
    } else {
        b.x += dx;
        a.x -= dx;
    }
    if b.y > a.y {
        b.y -= dy;
        a.y += dy;
    } else {
        b.y += dy;
        a.y -= dy;
    }
    // The corrected segment must still point the same way as the raw one.
    if (inter2 - inter1).dot(b - a) > 0.0 {
        Some(Edge::new(a, b))
    } else {
        None
    }
}

/// Drop the last sweep when either endpoint has less than one turn radius
/// of clearance before the polygon boundary in the advance direction.
fn trim_final_sweep(sweeps: &mut Vec<Edge>, polygon: &Polygon, advance_theta: f64, cfg: &PlannerConfig) {
    let Some(last) = sweeps.last().copied() else {
        return;
    };
    let probe_blocked = |v: Point| {
        let tip = Point::new(
            v.x + cfg.turn_radius_m * advance_theta.cos(),
            v.y + cfg.turn_radius_m * advance_theta.sin(),
        );
        let probe = Edge::new(v, tip);
        (0..polygon.len())
            .any(|i| segment_intersection(probe, polygon.edge(i), cfg.epsilon).is_some())
    };
    if probe_blocked(last.a) || probe_blocked(last.b) {
        sweeps.pop();
    }
}

/// Naive east-west traversal: a horizontal sweep line stepped from the
/// lowest vertex upward, ignoring the width direction entirely. Kept for
/// the `naive` planning mode.
pub fn naive_sweep(polygon: &Polygon, cfg: &PlannerConfig) -> Vec<Edge> {
    let min_y = polygon
        .vertices()
        .iter()
        .map(|v| v.y)
        .fold(f64::INFINITY, f64::min);
    // Half-offset stepping is historical behaviour for this mode.
    let step = cfg.offset() / 2.0;
    let mut line = Edge::new(
        Point::new(-cfg.extent, min_y + step),
        Point::new(cfg.extent, min_y + step),
    );

    let mut sweeps = Vec::new();
    let mut parity = 0usize;
    loop {
        let mut crossings: Vec<Point> = (0..polygon.len())
            .filter_map(|i| segment_intersection(polygon.edge(i), line, cfg.epsilon))
            .collect();
        if crossings.is_empty() {
            break;
        }
        if crossings.len() >= 2 {
            // Only the extreme pair matters when a corner produces extras.
            crossings.sort_by(|p, q| p.x.total_cmp(&q.x));
            let mut inter1 = crossings[0];
            let mut inter2 = crossings[crossings.len() - 1];
            inter1.x += cfg.correction_m;
            inter2.x -= cfg.correction_m;
            if inter1.x < inter2.x {
                sweeps.push(if parity % 2 == 0 {
                    Edge::new(inter1, inter2)
                } else {
                    Edge::new(inter2, inter1)
                });
            }
        }
        line = line.translated(Point::new(0.0, step));
        parity += 1;
    }
    sweeps
}

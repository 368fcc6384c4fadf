//! Convex decomposition by greedy minimum-width-sum splitting, with a
//! convexity-restoring merge pass.
//!
//! A concave polygon is split along a chord from a concave vertex chosen
//! so that the sum of the two children's widths is minimal, recursively,
//! until every piece is convex. Adjacent pieces whose union is convex are
//! then merged back together.

use crate::geometry::{Polygon, Span};
use crate::models::PlanError;

/// Width of a polygon as a vertex-edge span.
///
/// Simple O(n^2) scan: for each edge, the farthest non-incident vertex
/// forms a candidate span; the shortest candidate is the width. Ties keep
/// the lowest edge index. Rotating calipers would be O(n) but subregions
/// here are small and the scan is easier to trust.
pub fn width(polygon: &Polygon) -> Span {
    let mut best = span_for_edge(polygon, 0);
    for i in 1..polygon.len() {
        let candidate = span_for_edge(polygon, i);
        if candidate.length() < best.length() {
            best = candidate;
        }
    }
    best
}

fn span_for_edge(polygon: &Polygon, i: usize) -> Span {
    let edge = polygon.edge(i);
    let n = polygon.len();
    let mut vertex = polygon.vertex(i + 2);
    let mut max_distance = edge.distance_to_point(vertex);
    for j in 3..n {
        let candidate = polygon.vertex((i + j) % n);
        let distance = edge.distance_to_point(candidate);
        if distance > max_distance {
            max_distance = distance;
            vertex = candidate;
        }
    }
    Span { vertex, edge }
}

/// Split a polygon along the chord between vertex indices `v1` and `v2`
/// (non-adjacent). Both chord endpoints appear in both children.
fn split(polygon: &Polygon, v1: usize, v2: usize) -> (Polygon, Polygon) {
    let (lo, hi) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
    let verts = polygon.vertices();
    let first = verts[lo..=hi].to_vec();
    let mut second = verts[hi..].to_vec();
    second.extend_from_slice(&verts[..=lo]);
    (Polygon::from_ccw(first), Polygon::from_ccw(second))
}

/// Whether the chord from vertex `c` (concave) to vertex `j` starts into
/// the polygon's interior.
///
/// At a reflex vertex the interior cone spans more than pi, so the chord
/// direction `d` is interior iff it is left of the outgoing edge OR right
/// of the incoming one. This is the algebraic form of the interior-angle
/// sector test; it avoids wrapping direction angles around +-pi.
fn chord_is_interior(polygon: &Polygon, c: usize, j: usize) -> bool {
    let b = polygon.vertex(c);
    let d = polygon.vertex(j) - b;
    let out_dir = polygon.vertex(c + 1) - b;
    let in_dir = polygon.vertex(polygon.prev_index(c)) - b;
    out_dir.cross(d) >= 0.0 || d.cross(in_dir) >= 0.0
}

/// Decompose a polygon into convex pieces.
///
/// Chords run concave-to-concave while possible; when no such chord is
/// valid (or only one concave vertex exists) convex targets are accepted
/// too. No valid chord at all means the input was not a simple polygon.
pub fn decompose(polygon: &Polygon) -> Result<Vec<Polygon>, PlanError> {
    let mut out = Vec::new();
    decompose_into(polygon, &mut out)?;
    Ok(out)
}

fn decompose_into(polygon: &Polygon, out: &mut Vec<Polygon>) -> Result<(), PlanError> {
    let concave = polygon.concave_indices();
    if concave.is_empty() {
        out.push(polygon.clone());
        return Ok(());
    }
    let mut accept_convex = concave.len() == 1;
    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for &c in &concave {
            for j in 0..polygon.len() {
                let adjacent = j == (c + 1) % polygon.len() || j == polygon.prev_index(c);
                if j == c || adjacent {
                    continue;
                }
                if !(accept_convex || polygon.is_concave_vertex(j)) {
                    continue;
                }
                if !chord_is_interior(polygon, c, j) {
                    continue;
                }
                let (p1, p2) = split(polygon, c, j);
                // Children may still be concave; the width only ranks
                // chords, so that is acceptable here.
                let score = width(&p1).length() + width(&p2).length();
                if best.map_or(true, |(s, _, _)| score < s) {
                    best = Some((score, c, j));
                }
            }
        }
        match best {
            Some((_, v1, v2)) => {
                let (p1, p2) = split(polygon, v1, v2);
                decompose_into(&p1, out)?;
                decompose_into(&p2, out)?;
                return Ok(());
            }
            None if !accept_convex => accept_convex = true,
            None => {
                return Err(PlanError::Geometry {
                    operation: format!(
                        "no valid split chord in a {}-vertex subregion",
                        polygon.len()
                    ),
                })
            }
        }
    }
}

/// Join two polygons across the shared edge at index `i` of `p1` and `j`
/// of `p2`: walk `p1` starting after the shared edge, then append `p2`'s
/// chain minus the shared vertices.
fn merge(p1: &Polygon, p2: &Polygon, i: usize, j: usize) -> Polygon {
    let mut result = Vec::with_capacity(p1.len() + p2.len() - 2);
    for z in 0..p1.len() {
        result.push(p1.vertex(i + 1 + z));
    }
    for z in 1..(p2.len() - 1) {
        result.push(p2.vertex(j + 1 + z));
    }
    Polygon::from_ccw(result)
}

/// Merge adjacent subregions whose union is convex, sweeping until a full
/// pass makes no change. The pass is idempotent: a second application
/// returns its input.
pub fn merge_subregions(mut subregions: Vec<Polygon>) -> Vec<Polygon> {
    loop {
        let mut merged_any = false;
        let mut i = 0;
        'outer: while i < subregions.len() {
            let mut j = 0;
            while j < subregions.len() {
                if i != j {
                    if let Some((ei, ej)) = subregions[i].shared_edge(&subregions[j]) {
                        let candidate = merge(&subregions[i], &subregions[j], ei, ej);
                        if candidate.is_convex() {
                            subregions[i] = candidate;
                            subregions.remove(j);
                            merged_any = true;
                            // Restart the inner scan; indices shifted.
                            continue 'outer;
                        }
                    }
                }
                j += 1;
            }
            i += 1;
        }
        if !merged_any {
            return subregions;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn l_shape() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(60.0, 30.0),
            Point::new(30.0, 30.0),
            Point::new(30.0, 60.0),
            Point::new(0.0, 60.0),
        ])
        .unwrap()
    }

    fn total_area(polygons: &[Polygon]) -> f64 {
        polygons.iter().map(Polygon::area).sum()
    }

    #[test]
    fn width_of_rectangle_is_short_side() {
        let rect = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 30.0),
            Point::new(0.0, 30.0),
        ])
        .unwrap();
        let w = width(&rect);
        assert!((w.length() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn width_of_triangle_is_shortest_altitude() {
        let tri = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.66),
        ])
        .unwrap();
        // Base 10, two sides of 10.0 (within rounding): equilateral, all
        // altitudes ~8.66; the minimum span must match one of them.
        assert!((width(&tri).length() - 8.66).abs() < 0.01);
    }

    #[test]
    fn convex_polygon_decomposes_to_itself() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ])
        .unwrap();
        let parts = decompose(&square).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], square);
    }

    #[test]
    fn l_shape_decomposes_and_merges_to_two_convex_parts() {
        let l = l_shape();
        let parts = decompose(&l).unwrap();
        assert!(parts.len() >= 2);
        assert!(parts.iter().all(Polygon::is_convex));
        assert!((total_area(&parts) - l.area()).abs() < 1e-6);

        let merged = merge_subregions(parts);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(Polygon::is_convex));
        assert!((total_area(&merged) - l.area()).abs() < 1e-6);
    }

    #[test]
    fn merge_pass_is_idempotent() {
        let parts = decompose(&l_shape()).unwrap();
        let once = merge_subregions(parts);
        let twice = merge_subregions(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn u_shape_decomposes_to_convex_union() {
        // Two concave vertices; exercises the concave-to-concave chord
        // preference.
        let u = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(90.0, 0.0),
            Point::new(90.0, 60.0),
            Point::new(60.0, 60.0),
            Point::new(60.0, 20.0),
            Point::new(30.0, 20.0),
            Point::new(30.0, 60.0),
            Point::new(0.0, 60.0),
        ])
        .unwrap();
        let parts = merge_subregions(decompose(&u).unwrap());
        assert!(parts.iter().all(Polygon::is_convex));
        assert!((total_area(&parts) - u.area()).abs() < 1e-6);
        assert!(parts.iter().all(|p| p.area() > 0.0));
    }

    #[test]
    fn all_output_rings_stay_ccw() {
        let parts = merge_subregions(decompose(&l_shape()).unwrap());
        assert!(parts.iter().all(|p| p.area() > 0.0));
    }
}

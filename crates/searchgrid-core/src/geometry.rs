//! Planar geometric primitives.
//!
//! All coordinates are meters in the local tangent frame (y up). Polygons
//! are stored counter-clockwise; constructors reverse clockwise input.

use crate::models::PlanError;
use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Add, Mul, Sub};

/// A 2D point, also used as a vector from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross).
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - other.x * self.y
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).norm()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A directed segment between two points.
///
/// Equality is undirected: two edges are equal when their endpoint sets
/// match, which is what the shared-edge tests need.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
}

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        self.a.distance_to(self.b)
    }

    pub fn is_vertical(&self) -> bool {
        self.a.x == self.b.x
    }

    pub fn slope(&self) -> f64 {
        (self.b.y - self.a.y) / (self.b.x - self.a.x)
    }

    /// Direction angle in (-pi, pi]: exactly pi/2 for upward vertical,
    /// -pi/2 for downward vertical, 0 / pi for horizontal.
    pub fn theta(&self) -> f64 {
        if self.is_vertical() {
            if self.a.y < self.b.y {
                FRAC_PI_2
            } else {
                -FRAC_PI_2
            }
        } else if self.a.y == self.b.y {
            if self.a.x < self.b.x {
                0.0
            } else {
                PI
            }
        } else {
            (self.b.y - self.a.y).atan2(self.b.x - self.a.x)
        }
    }

    /// Perpendicular distance from a point to the infinite line through
    /// this edge, via standard-form coefficients. Vertical edges cannot be
    /// written in slope form and are measured directly.
    pub fn distance_to_point(&self, p: Point) -> f64 {
        if self.is_vertical() {
            return (self.a.x - p.x).abs();
        }
        let m = self.slope();
        let (a, b, c) = (-m, 1.0, m * self.a.x - self.a.y);
        (a * p.x + b * p.y + c).abs() / (a * a + b * b).sqrt()
    }

    /// The edge shifted by a displacement vector.
    pub fn translated(&self, d: Point) -> Edge {
        Edge::new(self.a + d, self.b + d)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

/// A vertex-edge span: the perpendicular distance from a vertex to the
/// line through an edge. The minimum-length span of a convex polygon is
/// its width and fixes the sweep direction.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub vertex: Point,
    pub edge: Edge,
}

impl Span {
    pub fn length(&self) -> f64 {
        self.edge.distance_to_point(self.vertex)
    }

    /// Direction the sweep advances along: perpendicular to the edge,
    /// pointing into the polygon.
    pub fn theta(&self) -> f64 {
        self.edge.theta() + FRAC_PI_2
    }
}

/// A simple polygon stored as a CCW vertex ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from an arbitrary ring, reversing clockwise input
    /// so downstream code can rely on CCW order.
    pub fn new(mut vertices: Vec<Point>) -> Result<Self, PlanError> {
        if vertices.len() < 3 {
            return Err(PlanError::TooFewVertices {
                expected: 3,
                actual: vertices.len(),
            });
        }
        if is_clockwise(&vertices) {
            vertices.reverse();
        }
        Ok(Self { vertices })
    }

    /// Internal constructor for vertex chains already known to be CCW
    /// (split and merge products of a CCW parent).
    pub(crate) fn from_ccw(vertices: Vec<Point>) -> Self {
        debug_assert!(vertices.len() >= 3);
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i % self.vertices.len()]
    }

    pub fn prev_index(&self, i: usize) -> usize {
        (i + self.vertices.len() - 1) % self.vertices.len()
    }

    /// Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping).
    pub fn edge(&self, i: usize) -> Edge {
        Edge::new(self.vertex(i), self.vertex(i + 1))
    }

    /// Concavity test at vertex `i`. With A, B, C the previous, current and
    /// next vertices, the vertex is concave iff cross(BA, BC) > 0 -- this
    /// sign convention holds for CCW rings with y up and is load-bearing:
    /// flipping it silently breaks decomposition.
    pub fn is_concave_vertex(&self, i: usize) -> bool {
        let a = self.vertex(self.prev_index(i));
        let b = self.vertex(i);
        let c = self.vertex(i + 1);
        (a - b).cross(c - b) > 0.0
    }

    pub fn concave_indices(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.is_concave_vertex(i))
            .collect()
    }

    pub fn is_convex(&self) -> bool {
        (0..self.len()).all(|i| !self.is_concave_vertex(i))
    }

    /// Center of the bounding box. A coarse but stable stand-in for the
    /// true centroid, used only as a tour-distance heuristic.
    pub fn center(&self) -> Point {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
    }

    /// Signed area via the shoelace formula; positive for CCW rings.
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            sum += p.x * q.y - q.x * p.y;
        }
        sum / 2.0
    }

    /// Index pair of an edge shared with `other`, if any.
    pub fn shared_edge(&self, other: &Polygon) -> Option<(usize, usize)> {
        for i in 0..self.len() {
            let e1 = self.edge(i);
            for j in 0..other.len() {
                if e1 == other.edge(j) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Ray-casting point containment.
    pub fn contains_point(&self, p: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if ((vi.y > p.y) != (vj.y > p.y))
                && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// True when the ring is in clockwise order (y-up frame), by the sign of
/// the summed edge cross terms.
pub fn is_clockwise(points: &[Point]) -> bool {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        sum += (q.x - p.x) * (q.y + p.y);
    }
    sum > 0.0
}

/// Intersection point of two closed segments, if they share exactly one.
///
/// Parametric test: with `r` and `s` the segment vectors, collinear
/// segments (`|r x s|` and `|qp x r|` both below `eps`) report no
/// intersection even when they overlap, and parallel disjoint segments
/// report none.
pub fn segment_intersection(e1: Edge, e2: Edge, eps: f64) -> Option<Point> {
    let r = e1.b - e1.a;
    let s = e2.b - e2.a;
    let rxs = r.cross(s);
    let qp = e2.a - e1.a;
    let qpxr = qp.cross(r);
    if rxs.abs() < eps {
        return None;
    }
    let t = qp.cross(s) / rxs;
    let u = qpxr / rxs;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(e1.a + r * t)
    } else {
        None
    }
}

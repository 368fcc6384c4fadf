//! Ordering the subregion visits and chaining their sweep paths.
//!
//! Subregions become nodes of a small weighted graph; a minimum-cost
//! visiting order is found by brute force (the merge pass keeps the node
//! count tiny), then each node is assigned the sweep-corner to enter from
//! so consecutive subregions link by the shortest jump.

use crate::geometry::{Edge, Point, Polygon};

/// Which of the four terminal corners of a sweep list the path enters at.
///
/// `StartV1` reads each sweep `v1 -> v2` in order; `StartV2` flips the
/// vertices; the `End*` states read the sweep list back to front. The exit
/// corner follows by parity: entering at the front leaves at the back and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartState {
    StartV1,
    StartV2,
    EndV1,
    EndV2,
}

/// One subregion of the tour: an index into the decomposition list, its
/// sweep segments, and the chosen entry corner.
#[derive(Debug, Clone)]
pub struct SubregionNode {
    pub region: usize,
    pub sweeps: Vec<Edge>,
    pub start: StartState,
}

impl SubregionNode {
    pub fn new(region: usize, sweeps: Vec<Edge>) -> Self {
        Self {
            region,
            sweeps,
            start: StartState::StartV1,
        }
    }

    fn front(&self) -> &Edge {
        &self.sweeps[0]
    }

    fn back(&self) -> &Edge {
        &self.sweeps[self.sweeps.len() - 1]
    }

    /// The corner the path leaves this subregion from, given its entry
    /// state.
    fn exit_corner(&self) -> Point {
        match self.start {
            StartState::StartV1 => self.back().b,
            StartState::StartV2 => self.back().a,
            StartState::EndV1 => self.front().b,
            StartState::EndV2 => self.front().a,
        }
    }

    /// Entry corner candidates in state order.
    fn entry_corners(&self) -> [(StartState, Point); 4] {
        [
            (StartState::StartV1, self.front().a),
            (StartState::StartV2, self.front().b),
            (StartState::EndV1, self.back().a),
            (StartState::EndV2, self.back().b),
        ]
    }
}

/// Brute-force permutation search is bounded; beyond this many nodes a
/// nearest-neighbour greedy takes over.
pub const MAX_BRUTE_FORCE_NODES: usize = 10;

/// Weighted directed graph over the tour nodes.
///
/// Adjacent subregions (sharing an edge) weigh the distance between their
/// centers; everything else weighs `extent` plus that distance, so
/// non-adjacent hops stay comparable but always lose to adjacent ones.
#[derive(Debug)]
pub struct TourGraph {
    adjacency: Vec<Vec<bool>>,
    weight: Vec<Vec<f64>>,
}

impl TourGraph {
    pub fn build(nodes: &[SubregionNode], subregions: &[Polygon], extent: f64) -> Self {
        let n = nodes.len();
        let mut adjacency = vec![vec![false; n]; n];
        let mut weight = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let a = &subregions[nodes[i].region];
                let b = &subregions[nodes[j].region];
                let centers = a.center().distance_to(b.center());
                if a.shared_edge(b).is_some() {
                    adjacency[i][j] = true;
                    weight[i][j] = centers;
                } else {
                    weight[i][j] = extent + centers;
                }
            }
        }
        Self { adjacency, weight }
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    pub fn is_adjacent(&self, i: usize, j: usize) -> bool {
        self.adjacency[i][j]
    }

    fn tour_length(&self, order: &[usize]) -> f64 {
        order
            .windows(2)
            .map(|pair| self.weight[pair[0]][pair[1]])
            .sum()
    }

    /// Minimum-cost visiting order over all nodes.
    pub fn min_traversal(&self) -> Vec<usize> {
        let n = self.len();
        if n <= 1 {
            return (0..n).collect();
        }
        if n > MAX_BRUTE_FORCE_NODES {
            return self.greedy_traversal();
        }
        let mut order: Vec<usize> = (0..n).collect();
        let mut best = order.clone();
        let mut best_length = self.tour_length(&order);
        while next_permutation(&mut order) {
            let length = self.tour_length(&order);
            if length < best_length {
                best_length = length;
                best = order.clone();
            }
        }
        best
    }

    /// Nearest-neighbour fallback, best over every start node.
    fn greedy_traversal(&self) -> Vec<usize> {
        let n = self.len();
        let mut best: Option<(f64, Vec<usize>)> = None;
        for start in 0..n {
            let mut visited = vec![false; n];
            let mut order = vec![start];
            visited[start] = true;
            while order.len() < n {
                let here = order[order.len() - 1];
                let mut next: Option<usize> = None;
                for candidate in 0..n {
                    if visited[candidate] {
                        continue;
                    }
                    if next.map_or(true, |chosen| {
                        self.weight[here][candidate] < self.weight[here][chosen]
                    }) {
                        next = Some(candidate);
                    }
                }
                let Some(next) = next else {
                    break;
                };
                visited[next] = true;
                order.push(next);
            }
            let length = self.tour_length(&order);
            if best.as_ref().map_or(true, |(l, _)| length < *l) {
                best = Some((length, order));
            }
        }
        best.map(|(_, order)| order).unwrap_or_default()
    }
}

/// Lexicographic next permutation; false once the sequence is the last.
fn next_permutation(order: &mut [usize]) -> bool {
    let n = order.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && order[i - 1] >= order[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while order[j] <= order[i - 1] {
        j -= 1;
    }
    order.swap(i - 1, j);
    order[i..].reverse();
    true
}

/// Assign every node's entry corner along the visiting order.
///
/// The first node starts wherever one of its four corners is closest to
/// the next subregion's center; after that, each node starts at the corner
/// closest to the previous node's exit.
pub fn assign_start_states(order: &[usize], nodes: &mut [SubregionNode], subregions: &[Polygon]) {
    if order.len() < 2 {
        return;
    }
    let first = order[0];
    let next_center = subregions[nodes[order[1]].region].center();
    // Exit-corner candidates for the first node, in state order.
    let candidates = [
        (StartState::StartV1, nodes[first].back().b),
        (StartState::StartV2, nodes[first].back().a),
        (StartState::EndV1, nodes[first].front().b),
        (StartState::EndV2, nodes[first].front().a),
    ];
    nodes[first].start = nearest_state(&candidates, next_center);

    for k in 0..order.len() - 1 {
        let joint = nodes[order[k]].exit_corner();
        let next = order[k + 1];
        let candidates = nodes[next].entry_corners();
        nodes[next].start = nearest_state(&candidates, joint);
    }
}

fn nearest_state(candidates: &[(StartState, Point); 4], target: Point) -> StartState {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1.distance_to(target) < best.1.distance_to(target) {
            best = *candidate;
        }
    }
    best.0
}

/// Expand the ordered subregion sweeps into a flat waypoint list.
pub fn flatten(order: &[usize], nodes: &[SubregionNode]) -> Vec<Point> {
    let mut path = Vec::new();
    for &index in order {
        let node = &nodes[index];
        match node.start {
            StartState::StartV1 => {
                for sweep in &node.sweeps {
                    path.push(sweep.a);
                    path.push(sweep.b);
                }
            }
            StartState::StartV2 => {
                for sweep in &node.sweeps {
                    path.push(sweep.b);
                    path.push(sweep.a);
                }
            }
            StartState::EndV1 => {
                for sweep in node.sweeps.iter().rev() {
                    path.push(sweep.a);
                    path.push(sweep.b);
                }
            }
            StartState::EndV2 => {
                for sweep in node.sweeps.iter().rev() {
                    path.push(sweep.b);
                    path.push(sweep.a);
                }
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
        .unwrap()
    }

    fn segment(ax: f64, ay: f64, bx: f64, by: f64) -> Edge {
        Edge::new(Point::new(ax, ay), Point::new(bx, by))
    }

    #[test]
    fn next_permutation_cycles_all_orders() {
        let mut order = vec![0, 1, 2];
        let mut count = 1;
        while next_permutation(&mut order) {
            count += 1;
        }
        assert_eq!(count, 6);
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn adjacent_regions_weigh_less_than_detached_ones() {
        let subregions = vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(10.0, 0.0, 20.0, 10.0),
            rect(50.0, 0.0, 60.0, 10.0),
        ];
        let nodes: Vec<SubregionNode> = (0..3).map(|i| SubregionNode::new(i, Vec::new())).collect();
        let graph = TourGraph::build(&nodes, &subregions, 1e6);
        assert!(graph.is_adjacent(0, 1));
        assert!(!graph.is_adjacent(0, 2));
        assert!(graph.weight[0][1] < graph.weight[0][2]);
        assert!(graph.weight[0][2] > 1e6);
    }

    #[test]
    fn min_traversal_walks_the_strip_in_order() {
        // Three rectangles in a row: the cheapest tour visits them left to
        // right (or right to left), never middle-first.
        let subregions = vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(10.0, 0.0, 20.0, 10.0),
            rect(20.0, 0.0, 30.0, 10.0),
        ];
        let nodes: Vec<SubregionNode> = (0..3).map(|i| SubregionNode::new(i, Vec::new())).collect();
        let graph = TourGraph::build(&nodes, &subregions, 1e6);
        let order = graph.min_traversal();
        assert!(order == vec![0, 1, 2] || order == vec![2, 1, 0]);
    }

    #[test]
    fn greedy_fallback_visits_every_node_once() {
        let subregions: Vec<Polygon> = (0..12)
            .map(|i| rect(i as f64 * 10.0, 0.0, (i + 1) as f64 * 10.0, 10.0))
            .collect();
        let nodes: Vec<SubregionNode> =
            (0..12).map(|i| SubregionNode::new(i, Vec::new())).collect();
        let graph = TourGraph::build(&nodes, &subregions, 1e6);
        let mut order = graph.min_traversal();
        assert_eq!(order.len(), 12);
        order.sort_unstable();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn start_states_chain_by_shortest_jump() {
        // Two side-by-side regions, each with two horizontal sweeps. The
        // first node should exit at a corner near the second region, and
        // the second should enter at its nearest corner to that exit.
        let subregions = vec![rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 20.0, 10.0)];
        let mut nodes = vec![
            SubregionNode::new(
                0,
                vec![segment(2.0, 2.0, 8.0, 2.0), segment(8.0, 8.0, 2.0, 8.0)],
            ),
            SubregionNode::new(
                1,
                vec![segment(12.0, 2.0, 18.0, 2.0), segment(18.0, 8.0, 12.0, 8.0)],
            ),
        ];
        let order = vec![0, 1];
        assign_start_states(&order, &mut nodes, &subregions);
        // Exit of node 0 must be one of its right-hand corners (x = 8).
        assert!((nodes[0].exit_corner().x - 8.0).abs() < 1e-9);
        // Node 1 enters at the corner nearest that exit (x = 12).
        let entry = match nodes[1].start {
            StartState::StartV1 => nodes[1].front().a,
            StartState::StartV2 => nodes[1].front().b,
            StartState::EndV1 => nodes[1].back().a,
            StartState::EndV2 => nodes[1].back().b,
        };
        assert!((entry.x - 12.0).abs() < 1e-9);
        let jump = nodes[0].exit_corner().distance_to(entry);
        assert!(jump <= 10.0 + 1e-9);
    }

    #[test]
    fn flatten_respects_all_four_states() {
        let sweeps = vec![segment(0.0, 0.0, 1.0, 0.0), segment(1.0, 1.0, 0.0, 1.0)];
        let mut node = SubregionNode::new(0, sweeps);
        let order = [0usize];

        node.start = StartState::StartV1;
        let p = flatten(&order, std::slice::from_ref(&node));
        assert_eq!((p[0], p[3]), (Point::new(0.0, 0.0), Point::new(0.0, 1.0)));

        node.start = StartState::StartV2;
        let p = flatten(&order, std::slice::from_ref(&node));
        assert_eq!((p[0], p[3]), (Point::new(1.0, 0.0), Point::new(1.0, 1.0)));

        node.start = StartState::EndV1;
        let p = flatten(&order, std::slice::from_ref(&node));
        assert_eq!((p[0], p[3]), (Point::new(1.0, 1.0), Point::new(1.0, 0.0)));

        node.start = StartState::EndV2;
        let p = flatten(&order, std::slice::from_ref(&node));
        assert_eq!((p[0], p[3]), (Point::new(0.0, 1.0), Point::new(0.0, 0.0)));
    }
}

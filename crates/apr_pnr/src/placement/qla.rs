//! Quadratic bound-to-bound (B2B) solve: the analytic core of the QLA placer.

use crate::linalg::{conjugate_gradient, SolveStatus, SparseMatrix};
use apr_common::rng::DeterministicRng;
use apr_common::{Coord, Rect};

/// Whether a [`PlacerNode`] may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacerNodeKind {
    /// Subject to the solve and legalization passes.
    Movable,
    /// Anchors the system; never repositioned.
    Fixed,
}

/// A node in the derived placer netlist (§3).
#[derive(Debug, Clone)]
pub struct PlacerNode {
    /// Movable or fixed.
    pub kind: PlacerNodeKind,
    /// Footprint size, `(width, height)` nanometers.
    pub size: (i64, i64),
    /// Current position (the lower-left corner).
    pub position: Coord,
    /// Weight used by the row-legalization cost metric.
    pub weight: i64,
}

impl PlacerNode {
    /// `true` if this node participates in the solve/legalize passes.
    pub fn is_movable(&self) -> bool {
        self.kind == PlacerNodeKind::Movable
    }
}

/// A net in the derived placer netlist.
#[derive(Debug, Clone)]
pub struct PlacerNet {
    /// Net weight.
    pub weight: f64,
    /// Indices into the node list this net connects.
    pub nodes: Vec<usize>,
}

/// Configuration for one QLA placement run, with the §6 defaults.
#[derive(Debug, Clone)]
pub struct QlaConfig {
    /// Relative-residual tolerance for the CG solves.
    pub cg_tolerance: f64,
    /// Smallest bisection block width, in nanometers.
    pub min_block_width: i64,
    /// Smallest bisection block height, in nanometers.
    pub min_block_height: i64,
    /// Iteration stops once HPWL improves by less than this fraction.
    pub hpwl_improvement_threshold: f64,
    /// Hard cap on solve/legalize iterations, to bound runtime regardless of
    /// the improvement threshold.
    pub max_iterations: usize,
}

impl Default for QlaConfig {
    fn default() -> Self {
        Self {
            cg_tolerance: 1e-3,
            min_block_width: 0, // caller derives from site width: 4 * site_width
            min_block_height: 0, // caller derives from site height: 1 * site_height
            hpwl_improvement_threshold: 0.01,
            max_iterations: 20,
        }
    }
}

/// Assigns each movable node a uniformly random position inside `region`,
/// nudged so its upper-right corner stays inside the region (§4.D Stage 2).
pub fn initial_placement(nodes: &mut [PlacerNode], region: Rect, rng: &mut DeterministicRng) {
    for node in nodes.iter_mut() {
        if !node.is_movable() {
            continue;
        }
        let max_x = (region.ur.x - node.size.0).max(region.ll.x);
        let max_y = (region.ur.y - node.size.1).max(region.ll.y);
        let x = region.ll.x + rng.gen_range_i64(0, (max_x - region.ll.x).max(0) + 1);
        let y = region.ll.y + rng.gen_range_i64(0, (max_y - region.ll.y).max(0) + 1);
        node.position = Coord::new(x, y);
    }
}

/// Total half-perimeter wire length across all nets.
pub fn hpwl(nodes: &[PlacerNode], nets: &[PlacerNet]) -> f64 {
    nets.iter()
        .map(|net| {
            if net.nodes.len() < 2 {
                return 0.0;
            }
            let (mut min_x, mut max_x) = (i64::MAX, i64::MIN);
            let (mut min_y, mut max_y) = (i64::MAX, i64::MIN);
            for &n in &net.nodes {
                let p = nodes[n].position;
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                min_y = min_y.min(p.y);
                max_y = max_y.max(p.y);
            }
            ((max_x - min_x) + (max_y - min_y)) as f64
        })
        .sum()
}

fn axis_value(pos: Coord, axis_is_x: bool) -> i64 {
    if axis_is_x { pos.x } else { pos.y }
}

/// Finds the extreme node on each side of `net` along one axis, breaking
/// ties at a shared extreme value with `rng` per §9's resolved open question.
fn extremes(net: &PlacerNet, nodes: &[PlacerNode], axis_is_x: bool, rng: &mut DeterministicRng) -> (usize, usize) {
    let values: Vec<i64> = net.nodes.iter().map(|&n| axis_value(nodes[n].position, axis_is_x)).collect();
    let min_v = *values.iter().min().unwrap();
    let max_v = *values.iter().max().unwrap();
    let min_candidates: Vec<usize> = (0..net.nodes.len()).filter(|&i| values[i] == min_v).collect();
    let max_candidates: Vec<usize> = (0..net.nodes.len()).filter(|&i| values[i] == max_v).collect();
    let min_pick = min_candidates[rng.gen_range_usize(min_candidates.len())];
    let max_pick = max_candidates[rng.gen_range_usize(max_candidates.len())];
    (net.nodes[min_pick], net.nodes[max_pick])
}

/// Solves one axis's B2B spring system and writes the result back into
/// `nodes`' positions on that axis.
///
/// Matrix indices mirror the node list 1:1; fixed rows are pinned to an
/// identity so the whole-node system stays well-posed without the caller
/// tracking a separate movable-only index space (§4.B's "pin empty rows"
/// invariant, applied uniformly).
fn solve_axis(
    nodes: &mut [PlacerNode],
    nets: &[PlacerNet],
    axis_is_x: bool,
    tol: f64,
    rng: &mut DeterministicRng,
) -> SolveStatus {
    let n = nodes.len();
    if n == 0 {
        return SolveStatus::Success;
    }
    let mut a = SparseMatrix::new(n);
    let mut b = vec![0.0; n];

    for (i, node) in nodes.iter().enumerate() {
        if !node.is_movable() {
            a.add(i, i, 1.0);
            b[i] = axis_value(node.position, axis_is_x) as f64;
        }
    }

    for net in nets {
        let p = net.nodes.len();
        if p < 2 {
            continue;
        }
        if p == 2 {
            add_spring(&mut a, &mut b, nodes, net.nodes[0], net.nodes[1], net.weight / (p as f64 - 1.0), axis_is_x);
            continue;
        }
        let (lo, hi) = extremes(net, nodes, axis_is_x, rng);
        let k_extreme = net.weight / (p as f64 - 1.0);
        add_spring(&mut a, &mut b, nodes, lo, hi, k_extreme, axis_is_x);
        for &interior in &net.nodes {
            if interior == lo || interior == hi {
                continue;
            }
            add_spring(&mut a, &mut b, nodes, interior, lo, k_extreme, axis_is_x);
            add_spring(&mut a, &mut b, nodes, interior, hi, k_extreme, axis_is_x);
        }
    }

    a.pin_empty_rows();
    let csr = a.finalize();
    let result = conjugate_gradient(&csr, &b, tol, None);

    for (i, node) in nodes.iter_mut().enumerate() {
        if node.is_movable() {
            let v = result.x[i].round() as i64;
            if axis_is_x {
                node.position = Coord::new(v, node.position.y);
            } else {
                node.position = Coord::new(node.position.x, v);
            }
        }
    }
    result.status
}

fn add_spring(a: &mut SparseMatrix, b: &mut [f64], nodes: &[PlacerNode], i: usize, j: usize, weight_numerator: f64, axis_is_x: bool) {
    if i == j {
        return;
    }
    let pi = axis_value(nodes[i].position, axis_is_x);
    let pj = axis_value(nodes[j].position, axis_is_x);
    let dist = (pi - pj).unsigned_abs().max(1) as f64;
    let movable_i = nodes[i].is_movable();
    let movable_j = nodes[j].is_movable();

    if movable_i && movable_j {
        let k = weight_numerator / dist;
        a.add(i, i, k);
        a.add(j, j, k);
        a.add(i, j, -k);
        a.add(j, i, -k);
    } else if movable_i {
        a.add(i, i, weight_numerator);
        b[i] += weight_numerator * pj as f64;
    } else if movable_j {
        a.add(j, j, weight_numerator);
        b[j] += weight_numerator * pi as f64;
    }
    // both fixed: no coupling, per the invariant that fixed-to-fixed springs
    // contribute nothing beyond the anchor rows already pinned.
}

/// Runs the quadratic solve on both axes independently, in the order §5
/// mandates (sequential, not parallel).
pub fn solve(nodes: &mut [PlacerNode], nets: &[PlacerNet], tol: f64, rng: &mut DeterministicRng) -> (SolveStatus, SolveStatus) {
    let x_status = solve_axis(nodes, nets, true, tol, rng);
    let y_status = solve_axis(nodes, nets, false, tol, rng);
    (x_status, y_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movable(x: i64, y: i64) -> PlacerNode {
        PlacerNode { kind: PlacerNodeKind::Movable, size: (1, 1), position: Coord::new(x, y), weight: 1 }
    }

    fn fixed(x: i64, y: i64) -> PlacerNode {
        PlacerNode { kind: PlacerNodeKind::Fixed, size: (1, 1), position: Coord::new(x, y), weight: 1 }
    }

    #[test]
    fn four_node_spring_string_matches_expected_positions() {
        // Fixed at (0,0) and (100,300); two movable nodes in a chain.
        let mut nodes = vec![fixed(0, 0), movable(10, 10), movable(90, 290), fixed(100, 300)];
        let nets = vec![
            PlacerNet { weight: 1.0, nodes: vec![0, 1] },
            PlacerNet { weight: 1.0, nodes: vec![1, 2] },
            PlacerNet { weight: 1.0, nodes: vec![2, 3] },
        ];
        let mut rng = DeterministicRng::new(1);
        for _ in 0..40 {
            solve(&mut nodes, &nets, 1e-9, &mut rng);
        }
        assert!((nodes[1].position.x - 33).abs() <= 1, "x1={}", nodes[1].position.x);
        assert!((nodes[1].position.y - 100).abs() <= 1, "y1={}", nodes[1].position.y);
        assert!((nodes[2].position.x - 66).abs() <= 1, "x2={}", nodes[2].position.x);
        assert!((nodes[2].position.y - 200).abs() <= 1, "y2={}", nodes[2].position.y);
    }

    #[test]
    fn fixed_nodes_never_move() {
        let mut nodes = vec![fixed(5, 5), movable(50, 50)];
        let nets = vec![PlacerNet { weight: 1.0, nodes: vec![0, 1] }];
        let mut rng = DeterministicRng::new(2);
        solve(&mut nodes, &nets, 1e-6, &mut rng);
        assert_eq!(nodes[0].position, Coord::new(5, 5));
    }

    #[test]
    fn degenerate_nets_contribute_no_force() {
        let mut nodes = vec![movable(10, 10)];
        let nets = vec![PlacerNet { weight: 5.0, nodes: vec![0] }];
        let mut rng = DeterministicRng::new(3);
        let (xs, ys) = solve(&mut nodes, &nets, 1e-6, &mut rng);
        assert_eq!(xs, SolveStatus::Success);
        assert_eq!(ys, SolveStatus::Success);
    }

    #[test]
    fn hpwl_zero_for_colocated_nodes() {
        let nodes = vec![movable(5, 5), movable(5, 5)];
        let nets = vec![PlacerNet { weight: 1.0, nodes: vec![0, 1] }];
        assert_eq!(hpwl(&nodes, &nets), 0.0);
    }

    #[test]
    fn initial_placement_stays_in_region() {
        let region = Rect::new(Coord::ORIGIN, Coord::new(100, 100));
        let mut nodes = vec![movable(0, 0); 20];
        for n in &mut nodes {
            n.size = (10, 10);
        }
        let mut rng = DeterministicRng::new(5);
        initial_placement(&mut nodes, region, &mut rng);
        for n in &nodes {
            assert!(n.position.x >= 0 && n.position.x + 10 <= 100);
            assert!(n.position.y >= 0 && n.position.y + 10 <= 100);
        }
    }
}

//! Prim-MST net decomposition into two-point routing tasks (§4.F).

use apr_common::Coord;

fn manhattan(a: Coord, b: Coord) -> i64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Decomposes `terminals` into a minimum spanning tree by Prim's algorithm
/// with Manhattan-distance edge weights. Returns edges as index pairs into
/// `terminals`, in the order they were added to the tree — the order the
/// router should process them in, so each edge's source end is already
/// reachable from a prior edge (or is the implicit root, `terminals[0]`).
///
/// Ties are broken by the lowest candidate index, for determinism.
pub fn prim_mst(terminals: &[Coord]) -> Vec<(usize, usize)> {
    let n = terminals.len();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best_dist = vec![i64::MAX; n];
    let mut best_from = vec![0usize; n];
    in_tree[0] = true;
    for j in 1..n {
        best_dist[j] = manhattan(terminals[0], terminals[j]);
        best_from[j] = 0;
    }

    let mut edges = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next = None;
        let mut next_dist = i64::MAX;
        for j in 0..n {
            if !in_tree[j] && best_dist[j] < next_dist {
                next_dist = best_dist[j];
                next = Some(j);
            }
        }
        let next = next.expect("connected candidate set is never exhausted before n-1 edges");
        edges.push((best_from[next], next));
        in_tree[next] = true;
        for j in 0..n {
            if !in_tree[j] {
                let d = manhattan(terminals[next], terminals[j]);
                if d < best_dist[j] {
                    best_dist[j] = d;
                    best_from[j] = next;
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_terminal_has_no_edges() {
        assert!(prim_mst(&[Coord::new(0, 0)]).is_empty());
    }

    #[test]
    fn two_terminals_produce_one_edge() {
        let edges = prim_mst(&[Coord::new(0, 0), Coord::new(10, 0)]);
        assert_eq!(edges, vec![(0, 1)]);
    }

    #[test]
    fn star_topology_picked_over_chain_when_cheaper() {
        // Center at origin, three points equidistant: MST should use the
        // center as the hub rather than chaining the outer points together.
        let terminals = vec![Coord::new(0, 0), Coord::new(10, 0), Coord::new(0, 10), Coord::new(-10, 0)];
        let edges = prim_mst(&terminals);
        assert_eq!(edges.len(), 3);
        let total: i64 = edges
            .iter()
            .map(|&(a, b)| manhattan(terminals[a], terminals[b]))
            .sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn every_edges_endpoint_is_reachable_from_the_root() {
        let terminals: Vec<Coord> = (0..12).map(|i| Coord::new(i * 17 % 100, i * 31 % 80)).collect();
        let edges = prim_mst(&terminals);
        let mut reachable = vec![false; terminals.len()];
        reachable[0] = true;
        for &(from, to) in &edges {
            assert!(reachable[from], "edge processed before its source was reachable");
            reachable[to] = true;
        }
        assert!(reachable.iter().all(|&r| r));
    }
}

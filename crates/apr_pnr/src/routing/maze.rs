//! Two-point maze routing with A* and net-level Prim decomposition (§4.F).

use crate::routing::grid::GCellGrid;
use crate::routing::mst::prim_mst;
use apr_common::Coord;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use thiserror::Error;

/// Configuration for the global router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Minimum routing tracks targeted per GCell, per axis.
    pub min_tracks_per_gcell: u32,
    /// Weight applied to the Manhattan heuristic in the A* cost function.
    pub astar_heuristic_weight: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { min_tracks_per_gcell: 3, astar_heuristic_weight: 1.0 }
    }
}

/// A net failed to route because the expansion queue exhausted before
/// reaching any target; capacity is left unmutated (§4.F step 6).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no route found")]
pub struct NoRoute;

/// Cardinal direction of one routed hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// +X
    East,
    /// -X
    West,
    /// +Y
    North,
    /// -Y
    South,
}

/// One run of same-direction hops in a reconstructed route, linking back to
/// the segment it branched from (`m_parent` in the original).
#[derive(Debug, Clone, Copy)]
pub struct RouteSegment {
    /// GCell coordinates this segment starts at.
    pub start: (usize, usize),
    /// Direction of travel.
    pub direction: Direction,
    /// Number of GCell hops in this run.
    pub length: i64,
    /// Index of the segment this one branched from, `None` for the first.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    x: usize,
    y: usize,
    g: f64,
    f: f64,
    order: u64,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(x: usize, y: usize, targets: &[(usize, usize)], weight: f64) -> f64 {
    targets
        .iter()
        .map(|&(tx, ty)| ((x as i64 - tx as i64).abs() + (y as i64 - ty as i64).abs()) as f64)
        .fold(f64::INFINITY, f64::min)
        * weight
}

const MOVES: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Routes from `sources` to the nearest of `targets`, A*-expanding with
/// ties broken by insertion order for determinism (§4.F step 3/6).
///
/// On success, increments capacity along the discovered path and returns the
/// direction-run segment list with parent links. On failure, capacity is
/// left untouched.
pub fn route_two_point(
    grid: &mut GCellGrid,
    sources: &[(usize, usize)],
    targets: &[(usize, usize)],
    config: &RouterConfig,
) -> Result<Vec<RouteSegment>, NoRoute> {
    grid.clear_expansion_state();
    let target_set: HashSet<(usize, usize)> = targets.iter().copied().collect();

    let mut came_from: std::collections::HashMap<(usize, usize), (usize, usize)> = std::collections::HashMap::new();
    let mut open = BinaryHeap::new();
    let mut order: u64 = 0;

    for &(sx, sy) in sources {
        grid.cell_mut(sx, sy).flags.source = true;
        grid.cell_mut(sx, sy).cost = 0.0;
        grid.cell_mut(sx, sy).flags.valid = true;
        open.push(Frontier { x: sx, y: sy, g: 0.0, f: heuristic(sx, sy, targets, config.astar_heuristic_weight), order });
        order += 1;
    }

    let mut goal = None;
    while let Some(current) = open.pop() {
        let cell = grid.cell(current.x, current.y);
        if cell.flags.valid && current.g > cell.cost + 1e-9 {
            continue;
        }
        if target_set.contains(&(current.x, current.y)) {
            goal = Some((current.x, current.y));
            break;
        }
        grid.cell_mut(current.x, current.y).flags.reached = true;

        for &(dx, dy) in &MOVES {
            let nx = current.x as i64 + dx;
            let ny = current.y as i64 + dy;
            if nx < 0 || ny < 0 || nx as usize >= grid.width() || ny as usize >= grid.height() {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !grid.has_room(nx, ny) && !grid.cell(nx, ny).flags.source {
                continue;
            }
            let tentative_g = current.g + 1.0;
            let better = !grid.cell(nx, ny).flags.valid || tentative_g < grid.cell(nx, ny).cost - 1e-9;
            if better {
                grid.cell_mut(nx, ny).cost = tentative_g;
                grid.cell_mut(nx, ny).flags.valid = true;
                came_from.insert((nx, ny), (current.x, current.y));
                open.push(Frontier { x: nx, y: ny, g: tentative_g, f: tentative_g + heuristic(nx, ny, targets, config.astar_heuristic_weight), order });
                order += 1;
            }
        }
    }

    let goal = goal.ok_or(NoRoute)?;
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(&prev) = came_from.get(&cursor) {
        path.push(prev);
        cursor = prev;
        if sources.contains(&cursor) {
            break;
        }
    }
    path.reverse();

    for &(x, y) in &path {
        grid.cell_mut(x, y).capacity += 1;
    }

    Ok(compress_path(&path))
}

fn direction_of(from: (usize, usize), to: (usize, usize)) -> Direction {
    if to.0 > from.0 {
        Direction::East
    } else if to.0 < from.0 {
        Direction::West
    } else if to.1 > from.1 {
        Direction::North
    } else {
        Direction::South
    }
}

fn compress_path(path: &[(usize, usize)]) -> Vec<RouteSegment> {
    if path.len() < 2 {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut start = path[0];
    let mut dir = direction_of(path[0], path[1]);
    let mut length = 1;
    let mut parent = None;

    for window in path.windows(2).skip(1) {
        let step_dir = direction_of(window[0], window[1]);
        if step_dir == dir {
            length += 1;
        } else {
            segments.push(RouteSegment { start, direction: dir, length, parent });
            parent = Some(segments.len() - 1);
            start = window[0];
            dir = step_dir;
            length = 1;
        }
    }
    segments.push(RouteSegment { start, direction: dir, length, parent });
    segments
}

/// Decomposes `terminals` into a Prim MST and routes each edge as a
/// two-point maze route, letting any GCell already part of the net act as
/// an additional source for later edges (§4.F net-level contract).
///
/// Fails with [`NoRoute`] if any edge cannot be routed; GCells committed by
/// prior edges in this call remain committed (only the failing edge's
/// capacity is left unmutated).
pub fn route_net(grid: &mut GCellGrid, terminals: &[Coord], config: &RouterConfig) -> Result<Vec<RouteSegment>, NoRoute> {
    if terminals.len() < 2 {
        return Ok(Vec::new());
    }
    let gcells: Vec<(usize, usize)> = terminals.iter().map(|&t| grid.locate(t)).collect();
    let edges = prim_mst(terminals);

    let mut routed: HashSet<(usize, usize)> = HashSet::new();
    let mut all_segments = Vec::new();

    for (a, b) in edges {
        routed.insert(gcells[a]);
        let sources: Vec<(usize, usize)> = routed.iter().copied().collect();
        let segments = route_two_point(grid, &sources, &[gcells[b]], config)?;
        routed.insert(gcells[b]);
        all_segments.extend(segments);
    }

    Ok(all_segments)
}

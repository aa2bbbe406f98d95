//! Look-ahead legalization (recursive bisection) and row legalization
//! (§4.D Stages 4 and 6).

use super::qla::{PlacerNode, PlacerNodeKind};
use apr_common::{Coord, Rect};
use std::collections::VecDeque;

/// Recursively bisects `region`, rescaling each block's node positions to an
/// even spread along the split axis, until blocks fall below the configured
/// minimum size.
///
/// The split axis alternates by BFS level: even levels split on X, odd
/// levels on Y, matching `lookaheadLegaliser`'s traversal order. Within each
/// block, nodes are remapped to equally spaced positions in rank order — the
/// resolved "nonlinear rescaling" (a monotonic, shape-preserving warp that
/// never crosses a neighbor's original order).
pub fn lookahead_legalize(
    nodes: &mut [PlacerNode],
    region: Rect,
    movable_indices: Vec<usize>,
    min_block_width: i64,
    min_block_height: i64,
) {
    let mut queue: VecDeque<(Rect, usize, Vec<usize>)> = VecDeque::new();
    queue.push_back((region, 0, movable_indices));

    while let Some((block, level, indices)) = queue.pop_front() {
        if indices.len() < 2 || block.width() <= min_block_width || block.height() <= min_block_height {
            continue;
        }

        let axis_is_x = level % 2 == 0;
        let mut sorted = indices.clone();
        sorted.sort_by_key(|&i| if axis_is_x { nodes[i].position.x } else { nodes[i].position.y });

        rescale_block(nodes, &sorted, block, axis_is_x);

        let (lo_rect, hi_rect) = split_block(block, axis_is_x);
        let split_point = if axis_is_x { lo_rect.ur.x } else { lo_rect.ur.y };

        let mut lo = Vec::new();
        let mut hi = Vec::new();
        for &i in &sorted {
            let v = if axis_is_x { nodes[i].position.x } else { nodes[i].position.y };
            if v <= split_point {
                lo.push(i);
            } else {
                hi.push(i);
            }
        }

        queue.push_back((lo_rect, level + 1, lo));
        queue.push_back((hi_rect, level + 1, hi));
    }
}

fn split_block(block: Rect, axis_is_x: bool) -> (Rect, Rect) {
    if axis_is_x {
        let mid = (block.ll.x + block.ur.x) / 2;
        (
            Rect::new(block.ll, Coord::new(mid, block.ur.y)),
            Rect::new(Coord::new(mid, block.ll.y), block.ur),
        )
    } else {
        let mid = (block.ll.y + block.ur.y) / 2;
        (
            Rect::new(block.ll, Coord::new(block.ur.x, mid)),
            Rect::new(Coord::new(block.ll.x, mid), block.ur),
        )
    }
}

/// Remaps `sorted` (already ordered along the split axis) to equally spaced
/// positions spanning `block`, preserving rank order exactly.
fn rescale_block(nodes: &mut [PlacerNode], sorted: &[usize], block: Rect, axis_is_x: bool) {
    let m = sorted.len();
    if m == 0 {
        return;
    }
    let (lo, hi) = if axis_is_x { (block.ll.x, block.ur.x) } else { (block.ll.y, block.ur.y) };
    let span = (hi - lo).max(0);
    for (rank, &idx) in sorted.iter().enumerate() {
        let offset = if m == 1 { span / 2 } else { span * rank as i64 / (m as i64 - 1) };
        let v = lo + offset;
        let pos = nodes[idx].position;
        nodes[idx].position = if axis_is_x { Coord::new(v, pos.y) } else { Coord::new(pos.x, v) };
    }
}

/// One cell queued for row legalization: its analytic (pre-legal) x,
/// footprint width, and weight for the displacement cost metric.
#[derive(Debug, Clone, Copy)]
pub struct RowCell {
    /// Node index this entry came from, for writing the legal position back.
    pub node: usize,
    /// Analytic (pre-legal) x position.
    pub x: i64,
    /// Footprint width.
    pub width: i64,
    /// Weight for the `Σ w(v) · |x_legal − x_global|` cost metric.
    pub weight: i64,
}

fn round_to_multiple(value: i64, step: i64) -> i64 {
    if step <= 0 {
        return value;
    }
    let q = value.div_euclid(step);
    let r = value.rem_euclid(step);
    if r * 2 >= step { (q + 1) * step } else { q * step }
}

/// Legalizes one row: places its movable cells left-to-right, snapping each
/// cell's x to a multiple of `snap_width` (the smallest configured filler
/// width, or the site width) and never overlapping an already-placed cell's
/// right edge.
///
/// Returns the displacement cost `Σ w(v) · |x_legal(v) − x_global(v)|`.
pub fn legalize_row(row: Rect, snap_width: i64, cells: &mut [RowCell], nodes: &mut [PlacerNode]) -> i64 {
    cells.sort_by_key(|c| c.x);
    let mut cursor = row.ll.x;
    let mut cost = 0i64;
    for cell in cells.iter() {
        let candidate = round_to_multiple(cell.x, snap_width).max(cursor).max(row.ll.x);
        cost += cell.weight * (candidate - cell.x).abs();
        nodes[cell.node].position = Coord::new(candidate, nodes[cell.node].position.y);
        cursor = candidate + cell.width;
    }
    cost
}

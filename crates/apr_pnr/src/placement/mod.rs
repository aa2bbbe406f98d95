//! Analytic quadratic placement with look-ahead legalization (§4.D).
//!
//! Projects a [`apr_db::Chip`]'s netlist into a dense [`qla::PlacerNode`] /
//! [`qla::PlacerNet`] view, alternates the B2B solve with look-ahead
//! legalization until HPWL improvement falls below a threshold, legalizes
//! rows, then writes placed positions back into the chip database.

pub mod legalize;
pub mod qla;

pub use legalize::{legalize_row, lookahead_legalize, RowCell};
pub use qla::{hpwl, initial_placement, solve, PlacerNet, PlacerNode, PlacerNodeKind, QlaConfig};

use apr_common::rng::DeterministicRng;
use apr_common::Rect;
use apr_db::{Chip, InstanceKind, ObjectKey, PlacementStatus};
use apr_diagnostics::{Category, Context, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::HashMap;
use crate::linalg::SolveStatus;

/// Summary of one placement run.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    /// Number of solve/legalize iterations performed.
    pub iterations: usize,
    /// Final total HPWL.
    pub final_hpwl: f64,
}

/// Builds the placer netlist by projecting `chip`'s top netlist: every
/// instance not in [`PlacementStatus::Ignore`] becomes a node (movable
/// unless `PlacedAndFixed`), and every net becomes a [`PlacerNet`] over the
/// node indices its connections reach.
fn project_placer_netlist(chip: &Chip) -> (Vec<PlacerNode>, Vec<PlacerNet>, Vec<ObjectKey>) {
    let netlist = chip.netlist();
    let mut nodes = Vec::new();
    let mut order = Vec::new();
    let mut index_of: HashMap<ObjectKey, usize> = HashMap::new();

    for (key, inst) in netlist.instances().iter() {
        if inst.status == PlacementStatus::Ignore {
            continue;
        }
        let size = if inst.kind == InstanceKind::Cell {
            chip.library.get(inst.archetype).map(|c| c.size).unwrap_or((0, 0))
        } else {
            (0, 0)
        };
        let kind = if inst.status == PlacementStatus::PlacedAndFixed {
            PlacerNodeKind::Fixed
        } else {
            PlacerNodeKind::Movable
        };
        let position = inst.position.unwrap_or(apr_common::Coord::ORIGIN);
        index_of.insert(key, nodes.len());
        order.push(key);
        nodes.push(PlacerNode { kind, size, position, weight: size.0.max(1) });
    }

    let nets = netlist
        .nets()
        .iter()
        .map(|(_, net)| {
            let mut members: Vec<usize> = net
                .connections()
                .iter()
                .filter_map(|&(inst, _)| index_of.get(&inst).copied())
                .collect();
            members.sort_unstable();
            members.dedup();
            PlacerNet { weight: net.weight as f64, nodes: members }
        })
        .collect();

    (nodes, nets, order)
}

/// Runs the full QLA pipeline: initial placement, alternating B2B solve and
/// look-ahead legalization until HPWL improvement drops below
/// `config.hpwl_improvement_threshold`, row legalization, and write-back.
///
/// `site_width`/`site_height` size the look-ahead legalizer's leaf blocks
/// (`4 * site_width`, `1 * site_height` per §6 unless overridden in
/// `config`); `rows` lists each placement row for Stage 6, paired with the
/// snap width to legalize against (the smallest configured filler cell
/// width, falling back to `site_width`).
pub fn place(
    chip: &mut Chip,
    region: Rect,
    site_width: i64,
    site_height: i64,
    rows: &[(Rect, i64)],
    config: &QlaConfig,
    rng: &mut DeterministicRng,
    sink: &mut DiagnosticSink,
    mut progress: impl FnMut(&[PlacerNode], f64),
) -> PlacementOutcome {
    let (mut nodes, nets, order) = project_placer_netlist(chip);

    initial_placement(&mut nodes, region, rng);

    let min_block_width = if config.min_block_width > 0 { config.min_block_width } else { 4 * site_width };
    let min_block_height = if config.min_block_height > 0 { config.min_block_height } else { site_height };

    let mut prev_hpwl = f64::INFINITY;
    let mut iterations = 0;
    let mut current_hpwl = hpwl(&nodes, &nets);

    for _ in 0..config.max_iterations {
        let (x_status, y_status) = solve(&mut nodes, &nets, config.cg_tolerance, rng);
        for (axis, status) in [("x", x_status), ("y", y_status)] {
            if status != SolveStatus::Success {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Placer, 101),
                    format!("{axis}-axis B2B solve returned {status:?}"),
                    Context::none(),
                ));
            }
        }

        let movable_indices: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].is_movable()).collect();
        lookahead_legalize(&mut nodes, region, movable_indices, min_block_width, min_block_height);

        current_hpwl = hpwl(&nodes, &nets);
        iterations += 1;
        progress(&nodes, current_hpwl);

        if prev_hpwl.is_finite() {
            let improvement = (prev_hpwl - current_hpwl) / prev_hpwl.max(1.0);
            if improvement < config.hpwl_improvement_threshold {
                break;
            }
        }
        prev_hpwl = current_hpwl;
    }

    for &(row_rect, snap_width) in rows {
        let mut cells: Vec<RowCell> = (0..nodes.len())
            .filter(|&i| nodes[i].is_movable() && row_rect.contains_point(nodes[i].position))
            .map(|i| RowCell { node: i, x: nodes[i].position.x, width: nodes[i].size.0.max(1), weight: nodes[i].weight })
            .collect();
        legalize_row(row_rect, snap_width, &mut cells, &mut nodes);
    }

    let netlist = chip.netlist_mut();
    for (i, &key) in order.iter().enumerate() {
        if !nodes[i].is_movable() {
            continue;
        }
        if let Some(inst) = netlist.instances_mut().get_mut(key) {
            inst.position = Some(nodes[i].position);
            inst.status = PlacementStatus::Placed;
        }
    }

    PlacementOutcome { iterations, final_hpwl: current_hpwl }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apr_common::Coord;
    use apr_db::{Instance, InstanceKind};

    fn sample_chip() -> Chip {
        let mut chip = Chip::new("top", (10_000, 10_000));
        let a = Instance::new("u1", InstanceKind::Abstract, ObjectKey::NOT_FOUND, vec!["A".into()]);
        let b = Instance::new("u2", InstanceKind::Abstract, ObjectKey::NOT_FOUND, vec!["A".into()]);
        let netlist = chip.netlist_mut();
        let k1 = netlist.add_instance(a).unwrap();
        let k2 = netlist.add_instance(b).unwrap();
        let n = netlist.add_net("n1", false, 1).unwrap();
        netlist.connect(k1, 0, n).unwrap();
        netlist.connect(k2, 0, n).unwrap();
        chip
    }

    #[test]
    fn place_writes_positions_back_into_the_chip() {
        let mut chip = sample_chip();
        let region = Rect::new(Coord::ORIGIN, Coord::new(10_000, 10_000));
        let mut rng = DeterministicRng::new(11);
        let mut sink = DiagnosticSink::new();
        let outcome = place(&mut chip, region, 100, 1000, &[], &QlaConfig::default(), &mut rng, &mut sink, |_, _| {});
        assert!(outcome.iterations > 0);
        for (_, inst) in chip.netlist().instances().iter() {
            assert!(inst.position.is_some());
            assert_eq!(inst.status, apr_db::PlacementStatus::Placed);
        }
    }

    #[test]
    fn placed_instances_land_inside_region() {
        let mut chip = sample_chip();
        let region = Rect::new(Coord::ORIGIN, Coord::new(5_000, 5_000));
        let mut rng = DeterministicRng::new(3);
        let mut sink = DiagnosticSink::new();
        place(&mut chip, region, 100, 1000, &[], &QlaConfig::default(), &mut rng, &mut sink, |_, _| {});
        for (_, inst) in chip.netlist().instances().iter() {
            assert!(region.contains_point(inst.position.unwrap()));
        }
    }
}

//! Two-way Fiduccia-Mattheyses min-cut partitioning.

use apr_common::rng::DeterministicRng;
use apr_common::{Coord, Rect};
use apr_db::{Chip, InstanceKind, ObjectKey, PlacementStatus};
use std::collections::{BTreeMap, HashMap};

/// Configuration for one partitioning run, with the §6 defaults.
#[derive(Debug, Clone)]
pub struct FmConfig {
    /// Stop after this many consecutive non-improving cycles.
    pub max_no_improvement_cycles: u32,
    /// Additive weight bonus for nets that touch a module-level pin instance.
    pub pin_net_weight_bonus: i64,
    /// Additive weight bonus for clock nets, left as a tunable per §9.
    pub clock_net_bonus: i64,
}

impl Default for FmConfig {
    fn default() -> Self {
        Self {
            max_no_improvement_cycles: 3,
            pin_net_weight_bonus: 4,
            clock_net_bonus: 0,
        }
    }
}

/// One movable or fixed node in the derived FM container (§3).
#[derive(Debug, Clone)]
pub struct FmNode {
    /// Cut-axis weight, typically the originating instance's footprint
    /// width (§9's supplemented behavior).
    pub weight: i64,
    /// `true` if this node may never change partition.
    pub fixed: bool,
    /// Position, required for fixed nodes (used to pick the closer half);
    /// optional for movable nodes.
    pub position: Option<Coord>,
    /// `true` if this node is a module-boundary pin instance; its incident
    /// nets receive `pin_net_weight_bonus`.
    pub is_pin: bool,
    /// Back-reference to the originating instance, for result reporting.
    pub instance: ObjectKey,
}

/// One net in the derived FM container.
#[derive(Debug, Clone)]
pub struct FmNet {
    /// Base net weight.
    pub weight: i64,
    /// `true` if this net carries a clock signal.
    pub is_clock_net: bool,
    /// Indices into the container's node list.
    pub nodes: Vec<usize>,
}

/// The derived FM input: a region and the nodes/nets projected into it.
#[derive(Debug, Clone)]
pub struct FmContainer {
    /// The rectangle being bisected.
    pub region: Rect,
    /// Nodes, indexed 0..n.
    pub nodes: Vec<FmNode>,
    /// Nets, referencing node indices.
    pub nets: Vec<FmNet>,
}

/// The outcome of a partitioning run.
#[derive(Debug, Clone)]
pub struct FmResult {
    /// Final partition (0 or 1) of every node, indexed as `container.nodes`.
    pub partition: Vec<u8>,
    /// `Σ_e w(e) · min(n0(e), n1(e))` for the final partition.
    pub cut_cost: i64,
}

/// Builds an [`FmContainer`] by projecting `chip`'s top netlist over
/// `region`: every instance not in [`PlacementStatus::Ignore`] becomes a
/// node, weighted by its archetype's footprint on the cut axis (the
/// original's `instanceSize().m_x`, §9's supplemented behavior) or `1` for
/// pseudo-instances with no footprint; fixed nodes carry their current
/// position so [`initial_sides`] can seat them on the closer half. Returns
/// the node order alongside the container so a caller can map partition
/// results back onto instances.
pub fn project_fm_container(chip: &Chip, region: Rect) -> (FmContainer, Vec<ObjectKey>) {
    let netlist = chip.netlist();
    let mut nodes = Vec::new();
    let mut order = Vec::new();
    let mut index_of: HashMap<ObjectKey, usize> = HashMap::new();

    for (key, inst) in netlist.instances().iter() {
        if inst.status == PlacementStatus::Ignore {
            continue;
        }
        let weight = match inst.kind {
            InstanceKind::Cell => chip.library.get(inst.archetype).map(|c| c.size.0).unwrap_or(1).max(1),
            _ => 1,
        };
        index_of.insert(key, nodes.len());
        order.push(key);
        nodes.push(FmNode {
            weight,
            fixed: inst.status == PlacementStatus::PlacedAndFixed,
            position: inst.position,
            is_pin: inst.kind == InstanceKind::Pin,
            instance: key,
        });
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
            FmNet { weight: net.weight, is_clock_net: net.is_clock_net, nodes: members }
        })
        .collect();

    (FmContainer { region, nodes, nets }, order)
}

fn effective_weight(net: &FmNet, container: &FmContainer, config: &FmConfig) -> i64 {
    let mut w = net.weight;
    if net.is_clock_net {
        w += config.clock_net_bonus;
    }
    if net.nodes.iter().any(|&n| container.nodes[n].is_pin) {
        w += config.pin_net_weight_bonus;
    }
    w
}

fn initial_sides(container: &FmContainer, rng: &mut DeterministicRng) -> Vec<u8> {
    let region = container.region;
    let split_vertical_axis = region.width() >= region.height();
    let (lower_half, upper_half) = if split_vertical_axis {
        let mid_x = (region.ll.x + region.ur.x) / 2;
        (
            Rect::new(region.ll, Coord::new(mid_x, region.ur.y)),
            Rect::new(Coord::new(mid_x, region.ll.y), region.ur),
        )
    } else {
        let mid_y = (region.ll.y + region.ur.y) / 2;
        (
            Rect::new(region.ll, Coord::new(region.ur.x, mid_y)),
            Rect::new(Coord::new(region.ll.x, mid_y), region.ur),
        )
    };

    container
        .nodes
        .iter()
        .map(|node| {
            if node.fixed {
                let pos = node.position.unwrap_or(Coord::ORIGIN);
                let d0 = lower_half.distance_to_point(pos);
                let d1 = upper_half.distance_to_point(pos);
                if d0 <= d1 {
                    0
                } else {
                    1
                }
            } else if rng.gen_bool_half() {
                1
            } else {
                0
            }
        })
        .collect()
}

struct WorkNode {
    gain: i64,
    locked: bool,
    next: Option<usize>,
    prev: Option<usize>,
}

/// Intrusive, doubly-linked gain buckets: `BTreeMap<gain, head-index>` with
/// next/prev links carried on each node, giving O(1) move-to-front insertion
/// and removal and O(log n) access to the current maximum gain.
struct BucketList {
    heads: BTreeMap<i64, usize>,
}

impl BucketList {
    fn new() -> Self {
        Self { heads: BTreeMap::new() }
    }

    fn insert(&mut self, nodes: &mut [WorkNode], idx: usize, gain: i64) {
        let old_head = self.heads.insert(gain, idx);
        nodes[idx].prev = None;
        nodes[idx].next = old_head;
        if let Some(h) = old_head {
            nodes[h].prev = Some(idx);
        }
    }

    fn remove(&mut self, nodes: &mut [WorkNode], idx: usize, gain: i64) {
        let prev = nodes[idx].prev;
        let next = nodes[idx].next;
        match prev {
            Some(p) => nodes[p].next = next,
            None => {
                if let Some(n) = next {
                    self.heads.insert(gain, n);
                } else {
                    self.heads.remove(&gain);
                }
            }
        }
        if let Some(n) = next {
            nodes[n].prev = prev;
        }
        nodes[idx].next = None;
        nodes[idx].prev = None;
    }

    fn pop_highest(&mut self, nodes: &mut [WorkNode]) -> Option<usize> {
        let (&gain, &idx) = self.heads.iter().next_back()?;
        self.remove(nodes, idx, gain);
        Some(idx)
    }

    fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}

fn cut_cost(container: &FmContainer, config: &FmConfig, sides: &[u8]) -> i64 {
    container
        .nets
        .iter()
        .map(|net| {
            let w = effective_weight(net, container, config);
            let n0 = net.nodes.iter().filter(|&&n| sides[n] == 0).count() as i64;
            let n1 = net.nodes.len() as i64 - n0;
            w * n0.min(n1)
        })
        .sum()
}

fn initial_gain(container: &FmContainer, config: &FmConfig, sides: &[u8], counts: &[[i64; 2]]) -> Vec<i64> {
    let mut gain = vec![0i64; container.nodes.len()];
    for (ni, net) in container.nets.iter().enumerate() {
        let w = effective_weight(net, container, config);
        for &v in &net.nodes {
            let s = sides[v] as usize;
            let t = 1 - s;
            if counts[ni][s] == 1 {
                gain[v] += w;
            }
            if counts[ni][t] == 0 {
                gain[v] -= w;
            }
        }
    }
    gain
}

/// Runs two-way FM min-cut partitioning over `container`, starting from an
/// RNG-seeded random initial assignment (fixed nodes pinned to the half of
/// `container.region` closest to their position), per §4.C.
pub fn partition(container: &FmContainer, config: &FmConfig, rng: &mut DeterministicRng) -> FmResult {
    let n = container.nodes.len();
    if n == 0 {
        return FmResult { partition: Vec::new(), cut_cost: 0 };
    }

    let mut sides = initial_sides(container, rng);
    let mut counts: Vec<[i64; 2]> = container
        .nets
        .iter()
        .map(|net| {
            let n0 = net.nodes.iter().filter(|&&v| sides[v] == 0).count() as i64;
            [n0, net.nodes.len() as i64 - n0]
        })
        .collect();

    let mut best_cost = cut_cost(container, config, &sides);
    let mut best_sides = sides.clone();
    let mut stale_cycles = 0u32;

    // A node's incident-net list, precomputed once.
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (ni, net) in container.nets.iter().enumerate() {
        for &v in &net.nodes {
            incident[v].push(ni);
        }
    }

    while stale_cycles < config.max_no_improvement_cycles {
        let gains = initial_gain(container, config, &sides, &counts);
        let mut work: Vec<WorkNode> = (0..n)
            .map(|_| WorkNode { gain: 0, locked: false, next: None, prev: None })
            .collect();
        for v in 0..n {
            work[v].gain = gains[v];
            work[v].locked = container.nodes[v].fixed;
        }

        let mut buckets = [BucketList::new(), BucketList::new()];
        for v in 0..n {
            if !work[v].locked {
                let side = sides[v] as usize;
                buckets[side].insert(&mut work, v, work[v].gain);
            }
        }

        let mut partition_weight = [0i64, 0i64];
        for (v, &s) in sides.iter().enumerate() {
            partition_weight[s as usize] += container.nodes[v].weight;
        }

        let mut trace: Vec<(usize, i64)> = Vec::new();
        let mut cur_sides = sides.clone();
        let mut cur_counts = counts.clone();

        loop {
            let heavier = if partition_weight[0] >= partition_weight[1] { 0 } else { 1 };
            let pick = if !buckets[heavier].is_empty() {
                Some((heavier, buckets[heavier].pop_highest(&mut work).unwrap()))
            } else if !buckets[1 - heavier].is_empty() {
                Some((1 - heavier, buckets[1 - heavier].pop_highest(&mut work).unwrap()))
            } else {
                None
            };
            let Some((from_side, v)) = pick else { break };

            work[v].locked = true;
            let node_gain = work[v].gain;
            trace.push((v, node_gain));

            let to_side = 1 - from_side;
            for &ni in &incident[v] {
                let w = effective_weight(&container.nets[ni], container, config);
                let t_before = cur_counts[ni][to_side];
                if t_before == 0 {
                    for &u in &container.nets[ni].nodes {
                        if u != v && !work[u].locked {
                            let old_gain = work[u].gain;
                            let side = cur_sides[u] as usize;
                            buckets[side].remove(&mut work, u, old_gain);
                            work[u].gain += w;
                            buckets[side].insert(&mut work, u, work[u].gain);
                        }
                    }
                }
                cur_counts[ni][from_side as usize] -= 1;
                cur_counts[ni][to_side] += 1;
                if cur_counts[ni][from_side as usize] == 0 {
                    for &u in &container.nets[ni].nodes {
                        if u != v && !work[u].locked {
                            let old_gain = work[u].gain;
                            let side = cur_sides[u] as usize;
                            buckets[side].remove(&mut work, u, old_gain);
                            work[u].gain -= w;
                            buckets[side].insert(&mut work, u, work[u].gain);
                        }
                    }
                }
            }

            cur_sides[v] = to_side as u8;
            let w = container.nodes[v].weight;
            partition_weight[from_side as usize] -= w;
            partition_weight[to_side] += w;
        }

        // Rewind to the best prefix of the cumulative-gain trace.
        let mut cumulative = 0i64;
        let mut best_prefix_len = 0usize;
        let mut best_prefix_gain = 0i64;
        for (i, &(_, g)) in trace.iter().enumerate() {
            cumulative += g;
            if cumulative > best_prefix_gain {
                best_prefix_gain = cumulative;
                best_prefix_len = i + 1;
            }
        }

        let mut rewound = sides.clone();
        for &(v, _) in &trace[..best_prefix_len] {
            rewound[v] = 1 - rewound[v];
        }

        let new_cost = cut_cost(container, config, &rewound);
        sides = rewound;
        counts = container
            .nets
            .iter()
            .map(|net| {
                let n0 = net.nodes.iter().filter(|&&v| sides[v] == 0).count() as i64;
                [n0, net.nodes.len() as i64 - n0]
            })
            .collect();

        if new_cost < best_cost {
            best_cost = new_cost;
            best_sides = sides.clone();
            stale_cycles = 0;
        } else {
            stale_cycles += 1;
        }
    }

    FmResult { partition: best_sides, cut_cost: best_cost }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(weight: i64) -> FmNode {
        FmNode { weight, fixed: false, position: None, is_pin: false, instance: ObjectKey::NOT_FOUND }
    }

    fn fixed_node(weight: i64, pos: Coord) -> FmNode {
        FmNode { weight, fixed: true, position: Some(pos), is_pin: false, instance: ObjectKey::NOT_FOUND }
    }

    #[test]
    fn empty_container_is_trivially_partitioned() {
        let c = FmContainer {
            region: Rect::new(Coord::ORIGIN, Coord::new(100, 100)),
            nodes: Vec::new(),
            nets: Vec::new(),
        };
        let mut rng = DeterministicRng::new(1);
        let result = partition(&c, &FmConfig::default(), &mut rng);
        assert_eq!(result.partition.len(), 0);
        assert_eq!(result.cut_cost, 0);
    }

    #[test]
    fn fixed_nodes_never_change_partition() {
        let region = Rect::new(Coord::ORIGIN, Coord::new(200, 100));
        let left = fixed_node(10, Coord::new(0, 0));
        let right = fixed_node(10, Coord::new(200, 0));
        let c = FmContainer {
            region,
            nodes: vec![left, right],
            nets: vec![FmNet { weight: 1, is_clock_net: false, nodes: vec![0, 1] }],
        };
        let mut rng = DeterministicRng::new(7);
        let result = partition(&c, &FmConfig::default(), &mut rng);
        assert_eq!(result.partition[0], 0);
        assert_eq!(result.partition[1], 1);
    }

    #[test]
    fn fm_reduces_cut_below_worst_case() {
        // A simple two-cluster graph: FM should find the zero-cut partition.
        let region = Rect::new(Coord::ORIGIN, Coord::new(400, 100));
        let mut nodes = Vec::new();
        for _ in 0..4 {
            nodes.push(node(1));
        }
        let nets = vec![
            FmNet { weight: 5, is_clock_net: false, nodes: vec![0, 1] },
            FmNet { weight: 5, is_clock_net: false, nodes: vec![2, 3] },
        ];
        let c = FmContainer { region, nodes, nets };
        let mut rng = DeterministicRng::new(42);
        let result = partition(&c, &FmConfig::default(), &mut rng);
        assert_eq!(result.cut_cost, 0);
    }

    #[test]
    fn pin_net_gets_weight_bonus() {
        let region = Rect::new(Coord::ORIGIN, Coord::new(100, 100));
        let mut pin = node(1);
        pin.is_pin = true;
        let c = FmContainer {
            region,
            nodes: vec![pin, node(1)],
            nets: vec![FmNet { weight: 1, is_clock_net: false, nodes: vec![0, 1] }],
        };
        let w = effective_weight(&c.nets[0], &c, &FmConfig::default());
        assert_eq!(w, 1 + 4);
    }

    #[test]
    fn project_fm_container_weighs_nodes_by_cell_footprint() {
        use apr_db::Instance;

        let mut chip = Chip::new("top", (10_000, 10_000));
        let netlist = chip.netlist_mut();
        let a = Instance::new("u1", InstanceKind::Abstract, ObjectKey::NOT_FOUND, vec!["A".into()]);
        let b = Instance::new("u2", InstanceKind::Abstract, ObjectKey::NOT_FOUND, vec!["A".into()]);
        let k1 = netlist.add_instance(a).unwrap();
        let k2 = netlist.add_instance(b).unwrap();
        let n = netlist.add_net("n1", false, 3).unwrap();
        netlist.connect(k1, 0, n).unwrap();
        netlist.connect(k2, 0, n).unwrap();

        let region = Rect::new(Coord::ORIGIN, Coord::new(10_000, 10_000));
        let (container, order) = project_fm_container(&chip, region);

        assert_eq!(container.nodes.len(), 2);
        assert_eq!(order, vec![k1, k2]);
        // Abstract instances have no library archetype, so they fall back to weight 1.
        assert!(container.nodes.iter().all(|n| n.weight == 1));
        assert_eq!(container.nets.len(), 1);
        assert_eq!(container.nets[0].weight, 3);
    }

    #[test]
    fn deterministic_given_same_seed() {
        let region = Rect::new(Coord::ORIGIN, Coord::new(400, 100));
        let nodes = vec![node(1), node(1), node(1), node(1), node(1), node(1)];
        let nets = vec![
            FmNet { weight: 3, is_clock_net: false, nodes: vec![0, 1, 2] },
            FmNet { weight: 3, is_clock_net: false, nodes: vec![3, 4, 5] },
            FmNet { weight: 1, is_clock_net: false, nodes: vec![2, 3] },
        ];
        let c = FmContainer { region, nodes, nets };

        let mut rng_a = DeterministicRng::new(99);
        let result_a = partition(&c, &FmConfig::default(), &mut rng_a);
        let mut rng_b = DeterministicRng::new(99);
        let result_b = partition(&c, &FmConfig::default(), &mut rng_b);

        assert_eq!(result_a.partition, result_b.partition);
        assert_eq!(result_a.cut_cost, result_b.cut_cost);
    }
}

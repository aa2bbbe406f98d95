//! Clock-tree synthesis: mean-and-median topology with bottom-up
//! capacitance-driven buffer insertion (§4.E).

use apr_common::Coord;
use apr_db::{Chip, Instance, InstanceKind, ObjectKey, PinDirection, PlacementStatus};
use thiserror::Error;

/// Errors that abort a CTS run before or during tree construction (§7 kind 1).
#[derive(Debug, Error, PartialEq)]
pub enum CtsError {
    /// The named clock net does not exist.
    #[error("clock net {0:?} not found")]
    NetNotFound(String),
    /// The net has zero or more than one driver (output pin).
    #[error("clock net {0:?} has {1} drivers, expected exactly 1")]
    WrongDriverCount(String, usize),
    /// A sink instance is not placed, or a connected pin could not be resolved.
    #[error("sink instance is not placed or has an invalid pin")]
    SinkNotPlaced,
    /// A database mutation failed partway through buffer insertion; any
    /// buffers already committed are left in place (§4.E failure semantics).
    #[error("database mutation failed during buffer insertion: {0}")]
    MutationFailed(String),
}

/// Configuration for one CTS run, with the §6 default.
#[derive(Debug, Clone)]
pub struct CtsConfig {
    /// Buffer-insertion threshold, farads.
    pub max_capacitance: f64,
    /// Archetype used as the repeater cell.
    pub buffer_cell: ObjectKey,
    /// Name of the buffer cell's input pin.
    pub buffer_input_pin: String,
    /// Name of the buffer cell's output pin.
    pub buffer_output_pin: String,
    /// Input capacitance of the buffer's input pin, farads.
    pub buffer_input_capacitance: f64,
}

impl Default for CtsConfig {
    fn default() -> Self {
        Self {
            max_capacitance: 0.2e-12,
            buffer_cell: ObjectKey::NOT_FOUND,
            buffer_input_pin: "A".to_string(),
            buffer_output_pin: "Y".to_string(),
            buffer_input_capacitance: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct SinkTerminal {
    instance: ObjectKey,
    pin: usize,
    capacitance: f64,
    position: Coord,
}

/// One node of the mean-and-median topology.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Routed start point (the parent's end, or the driver for the root).
    pub start: Coord,
    /// Routed end point (this segment's centroid or terminal position).
    pub end: Coord,
    /// Index of the parent segment, `None` for the root.
    pub parent: Option<usize>,
    /// BFS/recursion depth, root is 0.
    pub level: u32,
    /// Indices of child segments.
    pub children: Vec<usize>,
    /// `Some((instance, pin))` if this segment terminates at a single sink.
    pub terminal: Option<(ObjectKey, usize)>,
}

fn mean(points: &[Coord]) -> Coord {
    let n = points.len().max(1) as i64;
    let sx: i64 = points.iter().map(|p| p.x).sum();
    let sy: i64 = points.iter().map(|p| p.y).sum();
    Coord::new(sx / n, sy / n)
}

/// Builds the segment tree by recursive x-median/y-median bisection,
/// alternating axis with depth. The root's children route from the centroid
/// of every sink, not from the driver position; the root segment's `end` is
/// then patched to that same centroid purely for bookkeeping continuity
/// (the original's `segments.at(0).m_end = segments.at(1).m_start`).
fn build_topology(terminals: &[SinkTerminal], driver_pos: Coord) -> Vec<Segment> {
    let mut segments = Vec::new();
    segments.push(Segment { start: driver_pos, end: driver_pos, parent: None, level: 0, children: Vec::new(), terminal: None });

    let all_points: Vec<Coord> = terminals.iter().map(|t| t.position).collect();
    let center = mean(&all_points);

    build_recursive(&mut segments, 0, center, (0..terminals.len()).collect(), terminals, true);
    segments[0].end = center;
    segments
}

fn build_recursive(
    segments: &mut Vec<Segment>,
    node: usize,
    origin: Coord,
    mut indices: Vec<usize>,
    terminals: &[SinkTerminal],
    axis_is_x: bool,
) {
    if indices.len() <= 1 {
        if let Some(&i) = indices.first() {
            segments[node].terminal = Some((terminals[i].instance, terminals[i].pin));
            segments[node].end = terminals[i].position;
        }
        return;
    }

    indices.sort_by_key(|&i| if axis_is_x { terminals[i].position.x } else { terminals[i].position.y });
    let mid = indices.len() / 2;
    let (lo, hi) = indices.split_at(mid);
    let lo = lo.to_vec();
    let hi = hi.to_vec();

    let lo_points: Vec<Coord> = lo.iter().map(|&i| terminals[i].position).collect();
    let hi_points: Vec<Coord> = hi.iter().map(|&i| terminals[i].position).collect();
    let lo_mean = mean(&lo_points);
    let hi_mean = mean(&hi_points);

    let level = segments[node].level + 1;

    let lo_idx = segments.len();
    segments.push(Segment { start: origin, end: lo_mean, parent: Some(node), level, children: Vec::new(), terminal: None });
    let hi_idx = segments.len();
    segments.push(Segment { start: origin, end: hi_mean, parent: Some(node), level, children: Vec::new(), terminal: None });
    segments[node].children.push(lo_idx);
    segments[node].children.push(hi_idx);

    build_recursive(segments, lo_idx, lo_mean, lo, terminals, !axis_is_x);
    build_recursive(segments, hi_idx, hi_mean, hi, terminals, !axis_is_x);
}

fn post_order(segments: &[Segment], node: usize, out: &mut Vec<usize>) {
    for &child in &segments[node].children {
        post_order(segments, child, out);
    }
    out.push(node);
}

/// `true` if `inst`'s pin at `pin_idx` drives (rather than receives) a
/// signal: a cell library output pin, or pin 0 of a module-boundary I/O
/// pseudo-instance (the top-level clock input reaching inward).
fn is_driver_pin(chip: &Chip, inst: &Instance, pin_idx: usize) -> bool {
    match inst.kind {
        InstanceKind::Pin => pin_idx == 0,
        InstanceKind::Cell => chip
            .library
            .get(inst.archetype)
            .and_then(|cell| cell.pins.get(pin_idx))
            .map(|p| p.direction == PinDirection::Output)
            .unwrap_or(false),
        _ => false,
    }
}

fn pin_input_capacitance(chip: &Chip, inst: &Instance, pin_idx: usize) -> f64 {
    if inst.kind != InstanceKind::Cell {
        return 0.0;
    }
    chip.library
        .get(inst.archetype)
        .and_then(|cell| cell.pins.get(pin_idx))
        .map(|p| p.input_capacitance)
        .unwrap_or(0.0)
}

fn classify_connections(
    chip: &Chip,
    net_key: ObjectKey,
    net_name: &str,
) -> Result<((ObjectKey, usize), Vec<(ObjectKey, usize, f64)>), CtsError> {
    let netlist = chip.netlist();
    let net = netlist.nets().get(net_key).expect("looked up by valid key");
    let mut drivers = Vec::new();
    let mut sinks = Vec::new();

    for &(inst_key, pin_idx) in net.connections() {
        let inst = netlist.instances().get(inst_key).ok_or(CtsError::SinkNotPlaced)?;
        if is_driver_pin(chip, inst, pin_idx) {
            drivers.push((inst_key, pin_idx));
        } else {
            if !matches!(inst.status, PlacementStatus::Placed | PlacementStatus::PlacedAndFixed) {
                return Err(CtsError::SinkNotPlaced);
            }
            sinks.push((inst_key, pin_idx, pin_input_capacitance(chip, inst, pin_idx)));
        }
    }

    if drivers.len() != 1 {
        return Err(CtsError::WrongDriverCount(net_name.to_string(), drivers.len()));
    }
    Ok((drivers[0], sinks))
}

/// Synthesizes a clock tree rooted at `clock_net_name`'s driver, inserting
/// repeater buffers wherever accumulated downstream capacitance reaches
/// `config.max_capacitance`. Returns the final segment tree.
///
/// Aborts with [`CtsError`] on a failed precondition or a database mutation
/// failure; any buffers already committed before a mutation failure are left
/// in place (§4.E).
pub fn synthesize(chip: &mut Chip, clock_net_name: &str, config: &CtsConfig) -> Result<Vec<Segment>, CtsError> {
    let net_key = chip.netlist().nets().key_by_name(clock_net_name);
    if !net_key.is_valid() {
        return Err(CtsError::NetNotFound(clock_net_name.to_string()));
    }

    let (driver, sinks) = classify_connections(chip, net_key, clock_net_name)?;
    let driver_pos = chip.netlist().instances().get(driver.0).and_then(|i| i.position).ok_or(CtsError::SinkNotPlaced)?;

    let terminals: Vec<SinkTerminal> = sinks
        .iter()
        .map(|&(inst, pin, cap)| {
            let position = chip.netlist().instances().get(inst).and_then(|i| i.position).ok_or(CtsError::SinkNotPlaced)?;
            Ok(SinkTerminal { instance: inst, pin, capacitance: cap, position })
        })
        .collect::<Result<_, CtsError>>()?;

    let mut segments = build_topology(&terminals, driver_pos);
    if terminals.is_empty() {
        return Ok(segments);
    }

    let mut order = Vec::new();
    post_order(&segments, 0, &mut order);

    let mut loads = vec![0.0f64; segments.len()];
    let mut sink_lists: Vec<Vec<(ObjectKey, usize)>> = vec![Vec::new(); segments.len()];
    let mut unique_id: u64 = 0;

    for &node in &order {
        if let Some((inst, pin)) = segments[node].terminal {
            let cap = terminals.iter().find(|t| t.instance == inst && t.pin == pin).map(|t| t.capacitance).unwrap_or(0.0);
            loads[node] = cap;
            sink_lists[node] = vec![(inst, pin)];
        } else {
            for &child in &segments[node].children {
                loads[node] += loads[child];
                let mut moved = std::mem::take(&mut sink_lists[child]);
                sink_lists[node].append(&mut moved);
            }
        }

        if loads[node] >= config.max_capacitance && !sink_lists[node].is_empty() {
            let buffer_name = format!("ctsbuffer_L{}_{}", segments[node].level, unique_id);
            let net_name = format!("ctsnet_{}", unique_id);
            unique_id += 1;

            let mut buffer = Instance::new(
                buffer_name,
                InstanceKind::Cell,
                config.buffer_cell,
                vec![config.buffer_input_pin.clone(), config.buffer_output_pin.clone()],
            );
            buffer.position = Some(segments[node].end);
            buffer.status = PlacementStatus::Placed;
            let netlist = chip.netlist_mut();
            let buffer_key = netlist.add_instance(buffer).map_err(|e| CtsError::MutationFailed(e.to_string()))?;
            let new_net = netlist.add_net(net_name, true, 1).map_err(|e| CtsError::MutationFailed(e.to_string()))?;

            for &(sink_inst, sink_pin) in &sink_lists[node] {
                netlist.disconnect(sink_inst, sink_pin).map_err(|e| CtsError::MutationFailed(e.to_string()))?;
                netlist.connect(sink_inst, sink_pin, new_net).map_err(|e| CtsError::MutationFailed(e.to_string()))?;
            }
            netlist.connect(buffer_key, 1, new_net).map_err(|e| CtsError::MutationFailed(e.to_string()))?;

            sink_lists[node] = vec![(buffer_key, 0)];
            loads[node] = config.buffer_input_capacitance;
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apr_db::InstanceKind;

    fn cell_sink(name: &str) -> Instance {
        let mut i = Instance::new(name, InstanceKind::Cell, ObjectKey::NOT_FOUND, vec!["CK".into()]);
        i.status = PlacementStatus::Placed;
        i
    }

    #[test]
    fn net_not_found_is_rejected() {
        let mut chip = Chip::new("top", (1_000_000, 1_000_000));
        let err = synthesize(&mut chip, "clk", &CtsConfig::default()).unwrap_err();
        assert_eq!(err, CtsError::NetNotFound("clk".into()));
    }

    #[test]
    fn wrong_driver_count_is_rejected() {
        let mut chip = Chip::new("top", (1_000_000, 1_000_000));
        let netlist = chip.netlist_mut();
        let n = netlist.add_net("clk", true, 1).unwrap();
        let s1 = netlist.add_instance(cell_sink("s1")).unwrap();
        netlist.connect(s1, 0, n).unwrap();
        let err = synthesize(&mut chip, "clk", &CtsConfig::default()).unwrap_err();
        assert_eq!(err, CtsError::WrongDriverCount("clk".into(), 0));
    }

    fn with_driver_and_sinks(positions: &[(i64, i64)]) -> Chip {
        let mut chip = Chip::new("top", (1_000_000, 1_000_000));
        let netlist = chip.netlist_mut();
        let n = netlist.add_net("clk", true, 1).unwrap();
        let mut driver = Instance::new_io_pin("clk_pin");
        driver.position = Some(Coord::new(0, 0));
        driver.status = PlacementStatus::PlacedAndFixed;
        let driver_key = netlist.add_instance(driver).unwrap();
        netlist.connect(driver_key, 0, n).unwrap();

        for (i, &(x, y)) in positions.iter().enumerate() {
            let mut s = cell_sink(&format!("s{i}"));
            s.position = Some(Coord::new(x, y));
            let k = netlist.add_instance(s).unwrap();
            netlist.connect(k, 0, n).unwrap();
        }
        chip
    }

    #[test]
    fn small_tree_inserts_no_buffer_below_threshold() {
        let mut chip = with_driver_and_sinks(&[(100, 0), (200, 0)]);
        let config = CtsConfig { max_capacitance: 1e9, ..CtsConfig::default() };
        let segments = synthesize(&mut chip, "clk", &config).unwrap();
        assert!(!segments.is_empty());
        assert_eq!(chip.netlist().instances().len(), 3);
        let net = chip.netlist().nets().get(chip.netlist().nets().key_by_name("clk")).unwrap();
        assert_eq!(net.connections().len(), 2);
    }

    #[test]
    fn buffer_insertion_keeps_all_sinks_reachable_and_names_buffers_uniquely() {
        let positions: Vec<(i64, i64)> = (0..8).map(|i| (i * 50, (i % 3) * 40)).collect();
        let mut chip = with_driver_and_sinks(&positions);

        let config = CtsConfig { max_capacitance: 0.0, buffer_input_capacitance: 0.0, ..CtsConfig::default() };
        let segments = synthesize(&mut chip, "clk", &config).unwrap();
        assert!(!segments.is_empty());

        let buffer_names: Vec<&str> = chip
            .netlist()
            .instances()
            .iter()
            .filter_map(|(_, inst)| inst.name.starts_with("ctsbuffer").then_some(inst.name.as_str()))
            .collect();
        assert!(!buffer_names.is_empty());
        let mut unique = buffer_names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), buffer_names.len());

        let original_net = chip.netlist().nets().get(chip.netlist().nets().key_by_name("clk")).unwrap();
        for &(inst, _) in original_net.connections() {
            let name = &chip.netlist().instances().get(inst).unwrap().name;
            assert!(name == "clk_pin" || name.starts_with("ctsbuffer"));
        }
    }
}

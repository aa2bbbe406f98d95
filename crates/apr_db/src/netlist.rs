//! Module-level netlist: instances, nets, and their mirrored connections.

use crate::ids::ObjectKey;
use crate::registry::Registry;
use apr_common::Coord;
use std::collections::HashMap;

/// What archetype kind an [`Instance`] refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstanceKind {
    /// Not yet bound to a concrete archetype.
    Abstract,
    /// A standard-cell instance; `archetype` indexes the cell library.
    Cell,
    /// A sub-module instance.
    Module,
    /// A pseudo-instance representing a module-boundary I/O pin. Has exactly
    /// one implicit pin. FM gives nets touching one of these a weight bonus
    /// (§9, confirmed by the original's `INS_PIN` handling).
    Pin,
}

/// Placement orientation, the eight values a rectangle can take under
/// reflection and 90-degree rotation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    /// No transform.
    R0,
    /// Rotated 90 degrees counter-clockwise.
    R90,
    /// Rotated 180 degrees.
    R180,
    /// Rotated 270 degrees counter-clockwise.
    R270,
    /// Mirrored across X.
    Mx,
    /// Mirrored across Y.
    My,
    /// Mirrored across X, then rotated 90.
    Mx90,
    /// Mirrored across Y, then rotated 90.
    My90,
}

/// Placement lifecycle state of an instance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlacementStatus {
    /// No position assigned yet.
    Unplaced,
    /// Positioned by a pass; may still be moved by a later pass.
    Placed,
    /// Positioned and excluded from further movement.
    PlacedAndFixed,
    /// Excluded from placement and routing entirely (e.g. a filler cell slot).
    Ignore,
}

/// A netlist instance: a cell, sub-module, or pseudo I/O pin.
pub struct Instance {
    /// Instance name, unique within the netlist.
    pub name: String,
    /// What archetype kind this instance is.
    pub kind: InstanceKind,
    /// Key of the archetype (cell or module) this instance realizes, or
    /// [`ObjectKey::NOT_FOUND`] for [`InstanceKind::Abstract`]/[`InstanceKind::Pin`].
    pub archetype: ObjectKey,
    /// Current position, if placed.
    pub position: Option<Coord>,
    /// Current orientation.
    pub orientation: Orientation,
    /// Placement lifecycle state.
    pub status: PlacementStatus,
    pin_names: Vec<String>,
    pin_index: HashMap<String, usize>,
    /// Per-pin bound net, indexed the same as `pin_names`. Holds
    /// `ObjectKey::NOT_FOUND` for an unbound pin.
    connections: Vec<ObjectKey>,
}

impl Instance {
    /// Creates a new instance with the given ordered pin names, all unbound.
    pub fn new(
        name: impl Into<String>,
        kind: InstanceKind,
        archetype: ObjectKey,
        pin_names: Vec<String>,
    ) -> Self {
        let pin_index = pin_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let connections = vec![ObjectKey::NOT_FOUND; pin_names.len()];
        Self {
            name: name.into(),
            kind,
            archetype,
            position: None,
            orientation: Orientation::R0,
            status: PlacementStatus::Unplaced,
            pin_names,
            pin_index,
            connections,
        }
    }

    /// Creates the single-pin pseudo-instance representing a module-boundary
    /// I/O pin.
    pub fn new_io_pin(name: impl Into<String>) -> Self {
        Self::new(name, InstanceKind::Pin, ObjectKey::NOT_FOUND, vec!["PIN".to_string()])
    }

    /// Number of pin slots on this instance.
    pub fn pin_count(&self) -> usize {
        self.pin_names.len()
    }

    /// Looks up a pin's stable index by name.
    pub fn pin_index_of(&self, name: &str) -> Option<usize> {
        self.pin_index.get(name).copied()
    }

    /// The pin name at `index`.
    pub fn pin_name(&self, index: usize) -> Option<&str> {
        self.pin_names.get(index).map(String::as_str)
    }

    /// The net bound to pin `index`, or `ObjectKey::NOT_FOUND` if unbound.
    pub fn net_of_pin(&self, index: usize) -> ObjectKey {
        self.connections.get(index).copied().unwrap_or(ObjectKey::NOT_FOUND)
    }

    /// All pin-index → net bindings.
    pub fn connections(&self) -> &[ObjectKey] {
        &self.connections
    }
}

/// A net: a named set of `(instance, pin-index)` connections.
pub struct Net {
    /// Net name, unique within the netlist.
    pub name: String,
    /// `true` if this net carries a clock signal.
    pub is_clock_net: bool,
    /// Net weight, used by FM's cut cost and QLA's spring assembly.
    pub weight: i64,
    connections: Vec<(ObjectKey, usize)>,
}

impl Net {
    fn new(name: impl Into<String>, is_clock_net: bool, weight: i64) -> Self {
        Self {
            name: name.into(),
            is_clock_net,
            weight,
            connections: Vec::new(),
        }
    }

    /// The `(instance, pin-index)` pairs attached to this net.
    pub fn connections(&self) -> &[(ObjectKey, usize)] {
        &self.connections
    }

    /// Number of connections (the net's "pin count" for B2B/FM purposes).
    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

/// Errors from netlist-level structural operations (§4.A, §7 kind 1).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// `add_instance`/`add_net` was given a name already in use.
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    /// An operation referenced an instance key that doesn't exist.
    #[error("unknown instance")]
    UnknownInstance,
    /// An operation referenced a net key that doesn't exist.
    #[error("unknown net")]
    UnknownNet,
    /// An operation referenced a pin index out of range for its instance.
    #[error("unknown pin index {0}")]
    UnknownPin(usize),
}

/// The flat instances/nets container for one module, with connection
/// mirroring maintained on every mutation per §4.A's consistency rules.
#[derive(Default)]
pub struct Netlist {
    instances: Registry<Instance>,
    nets: Registry<Net>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the instance container.
    pub fn instances(&self) -> &Registry<Instance> {
        &self.instances
    }

    /// Mutable access to the instance container.
    pub fn instances_mut(&mut self) -> &mut Registry<Instance> {
        &mut self.instances
    }

    /// Read-only access to the net container.
    pub fn nets(&self) -> &Registry<Net> {
        &self.nets
    }

    /// Inserts a new instance.
    pub fn add_instance(&mut self, instance: Instance) -> Result<ObjectKey, NetlistError> {
        let name = instance.name.clone();
        self.instances
            .add(name.clone(), instance)
            .map_err(|_| NetlistError::DuplicateName(name))
    }

    /// Inserts a new, empty net.
    pub fn add_net(
        &mut self,
        name: impl Into<String>,
        is_clock_net: bool,
        weight: i64,
    ) -> Result<ObjectKey, NetlistError> {
        let name = name.into();
        self.nets
            .add(name.clone(), Net::new(name.clone(), is_clock_net, weight))
            .map_err(|_| NetlistError::DuplicateName(name))
    }

    /// Binds `instance`'s pin at `pin_index` to `net`, mirroring the
    /// connection into both sides. If the pin was already bound to a
    /// different net, that binding is torn down first.
    pub fn connect(
        &mut self,
        instance: ObjectKey,
        pin_index: usize,
        net: ObjectKey,
    ) -> Result<(), NetlistError> {
        {
            let inst = self
                .instances
                .get(instance)
                .ok_or(NetlistError::UnknownInstance)?;
            if pin_index >= inst.pin_count() {
                return Err(NetlistError::UnknownPin(pin_index));
            }
        }
        if !self.nets.get(net).is_some() {
            return Err(NetlistError::UnknownNet);
        }

        let previous = self.instances.get(instance).unwrap().net_of_pin(pin_index);
        if previous.is_valid() {
            if previous == net {
                return Ok(());
            }
            self.disconnect(instance, pin_index)?;
        }

        self.instances.get_mut(instance).unwrap().connections[pin_index] = net;
        self.nets.get_mut(net).unwrap().connections.push((instance, pin_index));
        self.nets.touch(net);
        Ok(())
    }

    /// Unbinds `instance`'s pin at `pin_index` from whatever net it is
    /// attached to, tearing down both sides. No-op if already unbound.
    pub fn disconnect(&mut self, instance: ObjectKey, pin_index: usize) -> Result<(), NetlistError> {
        let inst = self
            .instances
            .get_mut(instance)
            .ok_or(NetlistError::UnknownInstance)?;
        if pin_index >= inst.pin_count() {
            return Err(NetlistError::UnknownPin(pin_index));
        }
        let net = inst.connections[pin_index];
        if !net.is_valid() {
            return Ok(());
        }
        inst.connections[pin_index] = ObjectKey::NOT_FOUND;

        if let Some(n) = self.nets.get_mut(net) {
            n.connections.retain(|&(i, p)| !(i == instance && p == pin_index));
            self.nets.touch(net);
        }
        Ok(())
    }

    /// Removes an instance, first tearing down every connection it holds so
    /// every net it touched stays internally consistent.
    pub fn remove_instance(&mut self, instance: ObjectKey) -> Result<(), NetlistError> {
        let pin_count = self
            .instances
            .get(instance)
            .ok_or(NetlistError::UnknownInstance)?
            .pin_count();
        for p in 0..pin_count {
            self.disconnect(instance, p)?;
        }
        self.instances.remove(instance);
        Ok(())
    }

    /// Removes a net, clearing every instance pin slot that referred to it.
    pub fn remove_net(&mut self, net: ObjectKey) -> Result<(), NetlistError> {
        let conns = self
            .nets
            .get(net)
            .ok_or(NetlistError::UnknownNet)?
            .connections
            .clone();
        for (inst, pin) in conns {
            if let Some(i) = self.instances.get_mut(inst) {
                i.connections[pin] = ObjectKey::NOT_FOUND;
            }
        }
        self.nets.remove(net);
        Ok(())
    }
}

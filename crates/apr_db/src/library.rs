//! Cell library: standard-cell archetypes and their pins.

use apr_common::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The electrical direction of a pin.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PinDirection {
    /// Signal input.
    Input,
    /// Signal output.
    Output,
    /// Bidirectional signal.
    Inout,
    /// Power rail connection.
    Power,
    /// Ground rail connection.
    Ground,
}

/// A named rectangle on a layer, used for obstruction and pin-access geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerRect {
    /// The layer this shape is drawn on.
    pub layer: String,
    /// The shape itself, in cell-local coordinates.
    pub rect: Rect,
}

/// A pin template on a [`Cell`] archetype.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PinInfo {
    /// Pin name, unique within its cell.
    pub name: String,
    /// Electrical direction.
    pub direction: PinDirection,
    /// `true` if this pin carries a clock signal.
    pub clock: bool,
    /// Input capacitance, farads (meaningful for `Input`/`Inout` pins).
    pub input_capacitance: f64,
    /// Maximum capacitance this pin may drive, farads (meaningful for `Output`).
    pub max_capacitance: f64,
    /// Maximum fanout this pin may drive.
    pub max_fanout: u32,
    /// The pin's boolean function, e.g. `"(A & B)"`, if known.
    pub function: Option<String>,
    /// Per-layer pin-access geometry.
    pub geometry: Vec<LayerRect>,
}

impl PinInfo {
    /// Creates a minimal input pin with only a name and capacitance set,
    /// convenient for tests and programmatic archetype construction.
    pub fn input(name: impl Into<String>, input_capacitance: f64) -> Self {
        Self {
            name: name.into(),
            direction: PinDirection::Input,
            clock: false,
            input_capacitance,
            max_capacitance: 0.0,
            max_fanout: 0,
            function: None,
            geometry: Vec::new(),
        }
    }

    /// Creates a minimal output pin.
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PinDirection::Output,
            clock: false,
            input_capacitance: 0.0,
            max_capacitance: f64::INFINITY,
            max_fanout: u32::MAX,
            function: None,
            geometry: Vec::new(),
        }
    }
}

/// The broad class of a cell archetype.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CellClass {
    /// An ordinary standard cell.
    Core,
    /// An I/O pad cell.
    Pad,
    /// A row end-cap cell.
    Endcap,
}

/// A finer-grained role within [`CellClass::Core`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CellSubclass {
    /// No special role.
    None,
    /// A whitespace filler cell.
    Spacer,
    /// A routing feedthrough cell.
    Feedthru,
    /// Ties a net permanently high.
    TieHigh,
    /// Ties a net permanently low.
    TieLow,
    /// A well-tap cell.
    WellTap,
    /// An antenna-effect protection cell.
    AntennaCell,
}

/// A standard-cell archetype: the template `Instance`s of type `Cell` refer to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    /// Cell name, unique in the library.
    pub name: String,
    /// Footprint size in nanometers, `(width, height)`.
    pub size: (i64, i64),
    /// Placement origin offset within the footprint, nanometers.
    pub origin: (i64, i64),
    /// Name of the [`SiteInfo`](crate::technology::SiteInfo) this cell sits on.
    pub site_name: String,
    /// Supported placement symmetries.
    pub symmetry: crate::technology::Symmetry,
    /// Broad class.
    pub class: CellClass,
    /// Finer-grained role.
    pub subclass: CellSubclass,
    /// Cell area, square microns.
    pub area: f64,
    /// Leakage power, watts.
    pub leakage_power: f64,
    /// Per-layer obstruction geometry.
    pub obstructions: Vec<LayerRect>,
    /// Ordered pins; index is stable for the cell's lifetime.
    pub pins: Vec<PinInfo>,
    #[serde(skip)]
    pin_index: HashMap<String, usize>,
}

impl Cell {
    /// Creates a cell archetype and builds its name→pin-index lookup.
    pub fn new(
        name: impl Into<String>,
        size: (i64, i64),
        site_name: impl Into<String>,
        pins: Vec<PinInfo>,
    ) -> Self {
        let mut cell = Self {
            name: name.into(),
            size,
            origin: (0, 0),
            site_name: site_name.into(),
            symmetry: crate::technology::Symmetry::default(),
            class: CellClass::Core,
            subclass: CellSubclass::None,
            area: 0.0,
            leakage_power: 0.0,
            obstructions: Vec::new(),
            pins,
            pin_index: HashMap::new(),
        };
        cell.rebuild_pin_index();
        cell
    }

    /// Rebuilds the name→index pin lookup. Call after deserializing or after
    /// mutating `pins` directly.
    pub fn rebuild_pin_index(&mut self) {
        self.pin_index = self
            .pins
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
    }

    /// Looks up a pin's stable index by name.
    pub fn pin_index_of(&self, name: &str) -> Option<usize> {
        self.pin_index.get(name).copied()
    }

    /// Looks up a pin by index.
    pub fn pin_at(&self, index: usize) -> Option<&PinInfo> {
        self.pins.get(index)
    }

    /// Number of pins on this archetype.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

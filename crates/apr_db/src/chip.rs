//! Top-level chip database: technology, library, one module's netlist, and
//! its floorplan, bundled behind a single handle.

use crate::floorplan::Floorplan;
use crate::library::Cell;
use crate::netlist::Netlist;
use crate::registry::Registry;
use crate::technology::{LayerInfo, SiteInfo};

/// A module-level I/O port declaration, owned by a [`Module`].
#[derive(Clone, Debug)]
pub struct ModulePort {
    /// Port name.
    pub name: String,
    /// Electrical direction.
    pub direction: crate::library::PinDirection,
}

/// A design module: its boundary ports and, if concrete, the flat netlist
/// that implements it.
pub struct Module {
    /// Module name.
    pub name: String,
    /// Boundary ports, in declaration order.
    pub ports: Vec<ModulePort>,
    /// The module's contents, absent for a black-box/abstract module.
    pub netlist: Option<Netlist>,
}

impl Module {
    /// Creates a concrete module with an empty netlist.
    pub fn new(name: impl Into<String>, ports: Vec<ModulePort>) -> Self {
        Self {
            name: name.into(),
            ports,
            netlist: Some(Netlist::new()),
        }
    }
}

/// The chip database: the single root object every pass operates on.
///
/// Bundles the technology description, cell library, the design's top
/// module (and its netlist), and the floorplan. Passes take `&mut Chip`
/// (or narrower borrows of its parts) and leave it in a consistent state
/// between invocations, per the single-threaded, no-suspension-mid-mutation
/// concurrency model.
pub struct Chip {
    /// Routing and masterslice layers.
    pub layers: Registry<LayerInfo>,
    /// Placement sites.
    pub sites: Registry<SiteInfo>,
    /// Standard-cell archetypes.
    pub library: Registry<Cell>,
    /// The design's top-level module.
    pub top: Module,
    /// Die outline, margins, regions and rows.
    pub floorplan: Floorplan,
}

impl Chip {
    /// Creates an empty chip database with the given die size.
    pub fn new(top_name: impl Into<String>, die_size: (i64, i64)) -> Self {
        Self {
            layers: Registry::new(),
            sites: Registry::new(),
            library: Registry::new(),
            top: Module::new(top_name, Vec::new()),
            floorplan: Floorplan::new(die_size, crate::floorplan::IoMargins::default()),
        }
    }

    /// The top module's netlist. Panics if the top module is abstract, which
    /// should never happen for a chip constructed via [`Chip::new`].
    pub fn netlist(&self) -> &Netlist {
        self.top.netlist.as_ref().expect("top module is always concrete")
    }

    /// Mutable access to the top module's netlist.
    pub fn netlist_mut(&mut self) -> &mut Netlist {
        self.top.netlist.as_mut().expect("top module is always concrete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{Instance, InstanceKind};
    use crate::ids::ObjectKey;

    #[test]
    fn new_chip_has_empty_concrete_top_netlist() {
        let chip = Chip::new("top", (100_000, 100_000));
        assert_eq!(chip.netlist().instances().len(), 0);
        assert_eq!(chip.floorplan.die_size(), (100_000, 100_000));
    }

    #[test]
    fn instances_can_be_added_through_the_chip_handle() {
        let mut chip = Chip::new("top", (50_000, 50_000));
        let inst = Instance::new("u1", InstanceKind::Cell, ObjectKey::NOT_FOUND, vec!["A".into()]);
        let key = chip.netlist_mut().add_instance(inst).unwrap();
        assert!(chip.netlist().instances().get(key).is_some());
    }
}

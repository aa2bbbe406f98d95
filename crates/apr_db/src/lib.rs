//! The chip database: technology, cell library, netlist, and floorplan.
//!
//! Every physical-design pass (partitioner, placer, CTS, router) borrows a
//! [`Chip`] and mutates it in place through the keyed containers defined
//! here. See [`registry::Registry`] for the entity-storage model shared by
//! every container in the database.

#![warn(missing_docs)]

pub mod chip;
pub mod floorplan;
pub mod ids;
pub mod library;
pub mod netlist;
pub mod registry;
pub mod technology;

pub use chip::{Chip, Module, ModulePort};
pub use floorplan::{Floorplan, IoMargins, Region, Row};
pub use ids::ObjectKey;
pub use library::{Cell, CellClass, CellSubclass, LayerRect, PinDirection, PinInfo};
pub use netlist::{Instance, InstanceKind, Net, Netlist, NetlistError, Orientation, PlacementStatus};
pub use registry::{DuplicateName, Event, EventKind, ListenerId, Registry};
pub use technology::{LayerInfo, LayerType, RoutingDirection, SiteClass, SiteInfo, Symmetry};

//! Global routing: GCell grid, Prim-MST net decomposition, and A* maze
//! routing with hard per-GCell capacity limits (§4.F).

pub mod grid;
pub mod maze;
pub mod mst;

pub use grid::{GCell, GCellFlags, GCellGrid};
pub use maze::{route_net, route_two_point, Direction, NoRoute, RouteSegment, RouterConfig};
pub use mst::prim_mst;

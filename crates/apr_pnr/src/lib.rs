//! Place-and-route passes over a [`apr_db::Chip`]: FM partitioning, QLA
//! placement, clock-tree synthesis, and global routing.
//!
//! # Pipeline
//!
//! 1. **Partition** — recursive min-cut bisection ([`partition::partition`])
//! 2. **Place** — quadratic B2B solve with look-ahead legalization ([`placement::place`])
//! 3. **Synthesize clock trees** — mean-and-median topology with buffer insertion ([`cts::synthesize`])
//! 4. **Route** — Prim-MST decomposition with A* maze routing ([`routing::route_net`])

#![warn(missing_docs)]

pub mod cts;
pub mod linalg;
pub mod partition;
pub mod placement;
pub mod routing;

pub use cts::{synthesize as synthesize_clock_tree, CtsConfig, CtsError, Segment};
pub use linalg::{conjugate_gradient, CgResult, Csr, SolveStatus, SparseMatrix};
pub use partition::{partition as partition_fm, project_fm_container, FmConfig, FmContainer, FmNet, FmNode, FmResult};
pub use placement::{place, PlacementOutcome, PlacerNet, PlacerNode, PlacerNodeKind, QlaConfig};
pub use routing::{route_net, route_two_point, Direction, GCellGrid, NoRoute, RouteSegment, RouterConfig};

use thiserror::Error;

/// A user-facing pass failure: a structural precondition violation or a
/// resource-exhaustion outcome (§7 kinds 1 and 3). Numerical trouble (kind 2)
/// is reported through a [`apr_diagnostics::DiagnosticSink`] instead, since
/// the affected pass continues rather than aborting; internal invariant
/// breaks (kind 4) surface as [`apr_common::InternalError`], never here.
#[derive(Debug, Error)]
pub enum PassError {
    /// Clock-tree synthesis refused to start or aborted mid-run.
    #[error(transparent)]
    Cts(#[from] CtsError),
    /// A net could not be routed under the current capacity state.
    #[error("routing failed: {0}")]
    Routing(#[from] NoRoute),
    /// A netlist-level structural operation failed (duplicate name, unknown
    /// key) while a pass was mutating the database.
    #[error(transparent)]
    Netlist(#[from] apr_db::NetlistError),
}

//! Recursive min-cut partitioning (§4.C).

pub mod fm;

pub use fm::{partition, project_fm_container, FmConfig, FmContainer, FmNet, FmNode, FmResult};

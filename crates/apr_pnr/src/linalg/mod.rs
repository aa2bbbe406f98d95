//! Sparse linear algebra for the QLA placer's X/Y spring systems.

pub mod cg;
pub mod csr;

pub use cg::{conjugate_gradient, CgResult, SolveStatus};
pub use csr::{Csr, SparseMatrix};

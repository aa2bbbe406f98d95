//! Sparse symmetric matrix assembly.
//!
//! Entries are accumulated by `+=` into a row-major map of maps, then
//! compacted into compressed sparse row (CSR) form for the solver.

use std::collections::BTreeMap;

/// A sparse matrix under construction. Rows and columns are 0-indexed.
///
/// Entries default to zero and are created on first reference by
/// [`SparseMatrix::coeff_ref`]; finalize with [`SparseMatrix::finalize`]
/// before handing the matrix to the conjugate-gradient solver.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    dim: usize,
    rows: Vec<BTreeMap<usize, f64>>,
}

impl SparseMatrix {
    /// Creates a `dim x dim` matrix with no entries set.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            rows: vec![BTreeMap::new(); dim],
        }
    }

    /// Dimension of the (square) matrix.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Adds `delta` to entry `(row, col)`, creating it if absent.
    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        *self.rows[row].entry(col).or_insert(0.0) += delta;
    }

    /// Returns the current value at `(row, col)`, or zero if unset.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row].get(&col).copied().unwrap_or(0.0)
    }

    /// Iterates over the non-zero `(col, value)` pairs of `row`.
    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows[row].iter().map(|(&c, &v)| (c, v))
    }

    /// Pins every all-zero row's diagonal to `1.0`, per §4.B's invariant that
    /// `A` must stay non-singular even when a coordinate receives no springs.
    pub fn pin_empty_rows(&mut self) {
        for row in 0..self.dim {
            if self.rows[row].is_empty() {
                self.rows[row].insert(row, 1.0);
            }
        }
    }

    /// Compacts the accumulated entries into CSR form.
    pub fn finalize(&self) -> Csr {
        let mut row_ptr = Vec::with_capacity(self.dim + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in &self.rows {
            for (&c, &v) in row {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Csr {
            dim: self.dim,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// A finalized compressed-sparse-row matrix, ready for the CG solver.
#[derive(Debug, Clone)]
pub struct Csr {
    dim: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl Csr {
    /// Dimension of the matrix.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Computes `y = A * x`.
    pub fn multiply(&self, x: &[f64], y: &mut [f64]) {
        for row in 0..self.dim {
            let mut sum = 0.0;
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[row] = sum;
        }
    }

    /// Returns the diagonal entry for `row`, or zero if absent.
    pub fn diagonal(&self, row: usize) -> f64 {
        for k in self.row_ptr[row]..self.row_ptr[row + 1] {
            if self.col_idx[k] == row {
                return self.values[k];
            }
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates() {
        let mut m = SparseMatrix::new(2);
        m.add(0, 0, 1.0);
        m.add(0, 0, 2.0);
        assert_eq!(m.get(0, 0), 3.0);
    }

    #[test]
    fn unset_entry_is_zero() {
        let m = SparseMatrix::new(3);
        assert_eq!(m.get(1, 2), 0.0);
    }

    #[test]
    fn pin_empty_rows_sets_identity_diagonal() {
        let mut m = SparseMatrix::new(2);
        m.add(0, 0, 5.0);
        m.pin_empty_rows();
        assert_eq!(m.get(0, 0), 5.0);
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn finalize_preserves_values() {
        let mut m = SparseMatrix::new(2);
        m.add(0, 0, 4.0);
        m.add(0, 1, -1.0);
        m.add(1, 0, -1.0);
        m.add(1, 1, 4.0);
        let csr = m.finalize();
        let mut y = vec![0.0; 2];
        csr.multiply(&[1.0, 1.0], &mut y);
        assert_eq!(y, vec![3.0, 3.0]);
        assert_eq!(csr.diagonal(0), 4.0);
    }

    #[test]
    fn row_iter_yields_sorted_columns() {
        let mut m = SparseMatrix::new(1);
        m.add(0, 5, 1.0);
        m.add(0, 2, 2.0);
        let cols: Vec<usize> = m.row_iter(0).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![2, 5]);
    }
}

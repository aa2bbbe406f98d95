//! Jacobi-preconditioned conjugate-gradient solver for `A x = b`.

use super::csr::Csr;

/// The outcome of a solve attempt, mirroring the four-way classification
/// §4.B asks for (and the original's translated `Eigen::ComputationInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Converged within tolerance before `max_iter` was reached.
    Success,
    /// Ran to `max_iter` without reaching the residual tolerance.
    NoConvergence,
    /// A numerical breakdown occurred (zero preconditioned descent direction).
    NumericalIssue,
    /// The inputs were invalid (dimension mismatch, empty system).
    InvalidInput,
}

/// The full result of a CG solve: the iterate, its classification, and the
/// bookkeeping the caller needs to log a useful diagnostic.
#[derive(Debug, Clone)]
pub struct CgResult {
    /// The solution vector (the best iterate seen, even on non-convergence).
    pub x: Vec<f64>,
    /// Solver outcome.
    pub status: SolveStatus,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final relative residual `‖r‖ / ‖b‖`.
    pub final_error: f64,
}

/// Solves `A x = b` with the conjugate-gradient method and a Jacobi
/// (diagonal) preconditioner.
///
/// `tol` is the relative-residual stopping tolerance; `max_iter` defaults to
/// the matrix dimension per §4.B when the caller passes `None`. The returned
/// `x` always has `A.dim()` entries, and is the best iterate seen even when
/// `status != Success` — per §7 kind 2, a non-convergent solve is a logged
/// warning, not an error the placer refuses to continue from.
pub fn conjugate_gradient(a: &Csr, b: &[f64], tol: f64, max_iter: Option<usize>) -> CgResult {
    let n = a.dim();
    if b.len() != n || n == 0 {
        return CgResult {
            x: vec![0.0; n],
            status: SolveStatus::InvalidInput,
            iterations: 0,
            final_error: f64::INFINITY,
        };
    }

    let max_iter = max_iter.unwrap_or(n);
    let b_norm = norm(b);
    if b_norm == 0.0 {
        return CgResult {
            x: vec![0.0; n],
            status: SolveStatus::Success,
            iterations: 0,
            final_error: 0.0,
        };
    }

    let precond: Vec<f64> = (0..n)
        .map(|i| {
            let d = a.diagonal(i);
            if d.abs() > 1e-30 { 1.0 / d } else { 1.0 }
        })
        .collect();

    let mut x = vec![0.0; n];
    let mut ax = vec![0.0; n];
    a.multiply(&x, &mut ax);
    let mut r: Vec<f64> = b.iter().zip(&ax).map(|(bi, axi)| bi - axi).collect();
    let mut z: Vec<f64> = r.iter().zip(&precond).map(|(ri, mi)| ri * mi).collect();
    let mut p = z.clone();
    let mut rz_old = dot(&r, &z);

    let mut iterations = 0;
    let mut relative_error = norm(&r) / b_norm;

    while relative_error >= tol && iterations < max_iter {
        let mut ap = vec![0.0; n];
        a.multiply(&p, &mut ap);
        let p_ap = dot(&p, &ap);
        if p_ap.abs() < 1e-300 {
            return CgResult {
                x,
                status: SolveStatus::NumericalIssue,
                iterations,
                final_error: relative_error,
            };
        }
        let alpha = rz_old / p_ap;

        for i in 0..n {
            x[i] += alpha * p[i];
            r[i] -= alpha * ap[i];
        }

        relative_error = norm(&r) / b_norm;
        iterations += 1;
        if relative_error < tol {
            break;
        }

        for i in 0..n {
            z[i] = r[i] * precond[i];
        }
        let rz_new = dot(&r, &z);
        if rz_old.abs() < 1e-300 {
            return CgResult {
                x,
                status: SolveStatus::NumericalIssue,
                iterations,
                final_error: relative_error,
            };
        }
        let beta = rz_new / rz_old;
        for i in 0..n {
            p[i] = z[i] + beta * p[i];
        }
        rz_old = rz_new;
    }

    let status = if relative_error < tol {
        SolveStatus::Success
    } else {
        SolveStatus::NoConvergence
    };

    CgResult { x, status, iterations, final_error: relative_error }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::csr::SparseMatrix;

    fn spd_2x2() -> Csr {
        let mut m = SparseMatrix::new(2);
        m.add(0, 0, 4.0);
        m.add(0, 1, 1.0);
        m.add(1, 0, 1.0);
        m.add(1, 1, 3.0);
        m.finalize()
    }

    #[test]
    fn solves_small_spd_system() {
        let a = spd_2x2();
        let result = conjugate_gradient(&a, &[1.0, 2.0], 1e-9, None);
        assert_eq!(result.status, SolveStatus::Success);
        assert!((result.x[0] - 0.0909).abs() < 1e-3);
        assert!((result.x[1] - 0.6364).abs() < 1e-3);
    }

    #[test]
    fn zero_rhs_is_trivially_solved() {
        let a = spd_2x2();
        let result = conjugate_gradient(&a, &[0.0, 0.0], 1e-9, None);
        assert_eq!(result.status, SolveStatus::Success);
        assert_eq!(result.x, vec![0.0, 0.0]);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn dimension_mismatch_is_invalid_input() {
        let a = spd_2x2();
        let result = conjugate_gradient(&a, &[1.0], 1e-9, None);
        assert_eq!(result.status, SolveStatus::InvalidInput);
    }

    #[test]
    fn tight_max_iter_reports_no_convergence() {
        let a = spd_2x2();
        let result = conjugate_gradient(&a, &[1.0, 2.0], 1e-12, Some(0));
        assert_eq!(result.status, SolveStatus::NoConvergence);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn identity_system_converges_in_one_step() {
        let mut m = SparseMatrix::new(3);
        for i in 0..3 {
            m.add(i, i, 1.0);
        }
        let a = m.finalize();
        let b = vec![1.0, 2.0, 3.0];
        let result = conjugate_gradient(&a, &b, 1e-9, None);
        assert_eq!(result.status, SolveStatus::Success);
        for i in 0..3 {
            assert!((result.x[i] - b[i]).abs() < 1e-9);
        }
    }
}

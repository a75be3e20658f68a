//! Weighted least squares solver.
//!
//! Each IRLS step of the logistic fit solves a small linear regression of the
//! working response on the design matrix:
//!
//! ```text
//! minimize Σ w_i (z_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - Callers scale rows by `sqrt(w_i)` and we solve an ordinary least squares
//!   problem.
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (many daily buckets, two columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic
//!   for non-square matrices.)
//! - The parameter dimension is tiny (intercept + time slope), so SVD cost is
//!   negligible next to the per-term batch loop.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly —
/// for the logistic fit this is the "no usable time variation" case.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails. Count
    // series with a nearly constant time covariate produce near-singular
    // normal equations, and we prefer a deliberate failure over a wild
    // coefficient estimate.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

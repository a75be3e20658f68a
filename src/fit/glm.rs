//! Single-term logistic growth fitting.
//!
//! For one term's daily `(successes, failures, cum_time_elapsed)` series we
//! fit a binomial GLM with the canonical logit link:
//!
//! ```text
//! logit(p_t) = coef_intercept + coef_time * t
//! ```
//!
//! via iteratively reweighted least squares. Each IRLS step solves a weighted
//! least-squares problem on the working response, reusing the shared SVD
//! solver. Standard errors come from the inverse Fisher information at the
//! converged fit; the time coefficient's significance is a two-sided Wald
//! test against the standard normal.
//!
//! Numerical failure is an expected, recoverable outcome here: it is
//! signalled as a typed [`FitFailure`] value so the batch loop can null-mark
//! the term and continue, never as an error that could abort sibling fits.

use std::f64::consts::SQRT_2;

use nalgebra::{DMatrix, DVector};
use statrs::function::erf::erfc;
use thiserror::Error;

use crate::domain::{LogitInputRow, TrendFit};
use crate::math::solve_least_squares;

const MAX_ITERATIONS: usize = 25;
const CONVERGENCE_TOL: f64 = 1e-10;
/// Fitted probabilities are clamped away from {0, 1} so IRLS weights and the
/// working response stay finite.
const MU_FLOOR: f64 = 1e-10;

/// Why a term could not be fitted.
///
/// Consumed by ordinary conditional logic in the batch loop; a failed term is
/// recorded as known-missing, not silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitFailure {
    #[error("no rows with a positive trial count")]
    NoTrials,
    #[error("no variation in the time covariate")]
    NoTimeVariation,
    #[error("degenerate series: every trial in the window {0}")]
    Degenerate(&'static str),
    #[error("iteratively reweighted least squares did not converge")]
    NotConverged,
    #[error("singular or non-finite weighted least squares system")]
    Singular,
    #[error("time coefficient is exactly zero; relative standard error is undefined")]
    ZeroTimeCoefficient,
}

/// Fit the growth model to a single term's rows.
///
/// Pure function of its input; the caller has already partitioned rows by
/// exact term match and validated the input contract.
pub fn fit_term(rows: &[LogitInputRow]) -> Result<TrendFit, FitFailure> {
    // Buckets without a single trial carry no information about p_t.
    let mut times = Vec::with_capacity(rows.len());
    let mut successes = Vec::with_capacity(rows.len());
    let mut trials = Vec::with_capacity(rows.len());
    for row in rows {
        let m = row.successes + row.failures;
        if m > 0 {
            times.push(row.cum_time_elapsed as f64);
            successes.push(row.successes as f64);
            trials.push(m as f64);
        }
    }

    if times.is_empty() {
        return Err(FitFailure::NoTrials);
    }
    if times.iter().all(|&t| t == times[0]) {
        return Err(FitFailure::NoTimeVariation);
    }

    // All-success and all-failure series put the MLE at infinity (perfect
    // separation); fail them deliberately instead of iterating to overflow.
    let total_successes: f64 = successes.iter().sum();
    let total_trials: f64 = trials.iter().sum();
    if total_successes == 0.0 {
        return Err(FitFailure::Degenerate("failed"));
    }
    if total_successes == total_trials {
        return Err(FitFailure::Degenerate("succeeded"));
    }

    let (beta, covariance) = irls(&times, &successes, &trials)?;

    let coef_intercept = beta[0];
    let coef_time = beta[1];
    if coef_time == 0.0 {
        return Err(FitFailure::ZeroTimeCoefficient);
    }

    let var_time = covariance[(1, 1)];
    if !(var_time.is_finite() && var_time > 0.0) {
        return Err(FitFailure::Singular);
    }
    let se_time = var_time.sqrt();

    let rse_time = se_time / coef_time.abs();
    let z = coef_time / se_time;
    let p_value_time = erfc(z.abs() / SQRT_2);

    if !(coef_intercept.is_finite() && rse_time.is_finite() && p_value_time.is_finite()) {
        return Err(FitFailure::Singular);
    }

    Ok(TrendFit {
        coef_intercept,
        coef_time,
        rse_time,
        p_value_time,
    })
}

/// Iteratively reweighted least squares for the two-parameter logistic model.
///
/// Returns the coefficient vector and the inverse Fisher information
/// `(X^T W X)^{-1}` evaluated at the converged fit.
fn irls(
    times: &[f64],
    successes: &[f64],
    trials: &[f64],
) -> Result<(DVector<f64>, DMatrix<f64>), FitFailure> {
    let n = times.len();

    // Start at the constant model: pooled log-odds, zero slope.
    let pooled = (successes.iter().sum::<f64>() / trials.iter().sum::<f64>())
        .clamp(MU_FLOOR, 1.0 - MU_FLOOR);
    let mut beta = DVector::from_row_slice(&[(pooled / (1.0 - pooled)).ln(), 0.0]);

    for _ in 0..MAX_ITERATIONS {
        let mut xw = DMatrix::<f64>::zeros(n, 2);
        let mut zw = DVector::<f64>::zeros(n);

        for i in 0..n {
            let t = times[i];
            let eta = beta[0] + beta[1] * t;
            let mu = sigmoid(eta).clamp(MU_FLOOR, 1.0 - MU_FLOOR);
            let w = trials[i] * mu * (1.0 - mu);
            let z = eta + (successes[i] / trials[i] - mu) / (mu * (1.0 - mu));
            let sw = w.sqrt();
            if !(sw.is_finite() && z.is_finite()) {
                return Err(FitFailure::Singular);
            }
            xw[(i, 0)] = sw;
            xw[(i, 1)] = t * sw;
            zw[i] = z * sw;
        }

        let next = solve_least_squares(&xw, &zw).ok_or(FitFailure::Singular)?;
        let step = (next[0] - beta[0]).abs().max((next[1] - beta[1]).abs());
        beta = next;

        if step < CONVERGENCE_TOL {
            let covariance = fisher_inverse(&beta, times, trials)?;
            return Ok((beta, covariance));
        }
    }

    Err(FitFailure::NotConverged)
}

/// Invert the 2x2 Fisher information at `beta`.
fn fisher_inverse(
    beta: &DVector<f64>,
    times: &[f64],
    trials: &[f64],
) -> Result<DMatrix<f64>, FitFailure> {
    let mut s00 = 0.0;
    let mut s01 = 0.0;
    let mut s11 = 0.0;
    for (&t, &m) in times.iter().zip(trials.iter()) {
        let mu = sigmoid(beta[0] + beta[1] * t).clamp(MU_FLOOR, 1.0 - MU_FLOOR);
        let w = m * mu * (1.0 - mu);
        s00 += w;
        s01 += w * t;
        s11 += w * t * t;
    }

    let det = s00 * s11 - s01 * s01;
    if !(det.is_finite() && det > 0.0) {
        return Err(FitFailure::Singular);
    }

    Ok(DMatrix::from_row_slice(
        2,
        2,
        &[s11 / det, -s01 / det, -s01 / det, s00 / det],
    ))
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

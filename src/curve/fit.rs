use nalgebra::{Matrix2, Vector2};

use crate::curve::error::CurveFitError;
use crate::curve::types::{CurvePoint, LogisticFit, expit, logit};
use crate::error::CtbayesErr;

const MAX_ITERATIONS: usize = 50;
const TOLERANCE: f64 = 1e-10;
// Keeps IRLS working weights away from zero at saturated fitted rates
const MU_FLOOR: f64 = 1e-10;

/// Weighted logistic regression of rate on sample size by iteratively
/// reweighted least squares, with a quasi-binomial (Pearson) dispersion.
pub fn fit_logistic(points: &[CurvePoint]) -> Result<LogisticFit, CtbayesErr> {
    //----------------------------------------
    // Check arguments
    let distinct = {
        let mut sizes: Vec<f64> = points.iter().map(|p| p.sample_size).collect();
        sizes.sort_by(f64::total_cmp);
        sizes.dedup();
        sizes.len()
    };
    if points.len() < 2 || distinct < 2 {
        return Err(CurveFitError::TooFewPoints {
            usable: points.len(),
        }
        .into());
    }

    //----------------------------------------
    // IRLS
    // Start from the empirical logits, shrunk away from 0/1
    let mut eta: Vec<f64> = points
        .iter()
        .map(|p| logit((p.weight * p.rate + 0.5) / (p.weight + 1.0)))
        .collect();
    let mut beta = Vector2::new(f64::NAN, f64::NAN);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let mut xtwx = Matrix2::<f64>::zeros();
        let mut xtwz = Vector2::<f64>::zeros();
        for (p, &eta_i) in points.iter().zip(eta.iter()) {
            let mu = expit(eta_i).clamp(MU_FLOOR, 1.0 - MU_FLOOR);
            let variance = mu * (1.0 - mu);
            let z = eta_i + (p.rate - mu) / variance;
            let w = p.weight * variance;
            let x = Vector2::new(1.0, p.sample_size);
            xtwx += w * x * x.transpose();
            xtwz += w * z * x;
        }
        let next = xtwx
            .try_inverse()
            .map(|inv| inv * xtwz)
            .ok_or(CurveFitError::Singular)?;
        let step = (next - beta).norm();
        let done =
            beta.iter().all(|b| b.is_finite()) && step <= TOLERANCE * (next.norm() + TOLERANCE);
        beta = next;
        tracing::debug!(iterations, intercept = beta[0], slope = beta[1], "IRLS step");
        for (eta_i, p) in eta.iter_mut().zip(points.iter()) {
            *eta_i = beta[0] + beta[1] * p.sample_size;
        }
        if done {
            converged = true;
            break;
        }
    }
    if !converged || !beta.iter().all(|b| b.is_finite()) {
        return Err(CurveFitError::NonConvergence { iterations }.into());
    }

    //----------------------------------------
    // Covariance at the solution
    let mut xtwx = Matrix2::<f64>::zeros();
    let mut pearson = 0.0;
    for p in points {
        let mu = expit(beta[0] + beta[1] * p.sample_size).clamp(MU_FLOOR, 1.0 - MU_FLOOR);
        let variance = mu * (1.0 - mu);
        let x = Vector2::new(1.0, p.sample_size);
        xtwx += p.weight * variance * x * x.transpose();
        pearson += p.weight * (p.rate - mu).powi(2) / variance;
    }
    let df = points.len() - 2;
    // Two points leave no residual degrees of freedom; fall back to binomial
    let dispersion = if df == 0 { 1.0 } else { pearson / df as f64 };
    let unscaled = xtwx.try_inverse().ok_or(CurveFitError::Singular)?;
    let cov = unscaled * dispersion;

    Ok(LogisticFit {
        intercept: beta[0],
        slope: beta[1],
        covariance: [[cov[(0, 0)], cov[(0, 1)]], [cov[(1, 0)], cov[(1, 1)]]],
        dispersion,
        iterations,
    })
}

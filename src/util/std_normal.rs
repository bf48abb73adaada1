use crate::error::CtbayesErr;
use crate::util::error::NormalDistErr;
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

pub fn std_normal_quantile(p: f64) -> Result<f64, CtbayesErr> {
    if !(p > 0.0 && p < 1.0) {
        return Err(NormalDistErr::QuantileOutOfBounds(p).into());
    }
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}

/// Two-sided critical value for a confidence level, e.g. 1.96 for 0.95
pub fn two_sided_z(confidence: f64) -> Result<f64, CtbayesErr> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(NormalDistErr::BadConfidenceLevel(confidence).into());
    }
    std_normal_quantile(1.0 - (1.0 - confidence) / 2.0)
}

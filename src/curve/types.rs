//----------------------------------------
// curve mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::aggregation::AggregateResult;

/// One observed rate, weighted by its number of valid replicates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub sample_size: f64,
    pub rate: f64,
    pub weight: f64,
}

/// `logit(rate) = intercept + slope * sample_size`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticFit {
    pub intercept: f64,
    pub slope: f64,
    /// Row-major 2x2 covariance of (intercept, slope), dispersion included
    pub covariance: [[f64; 2]; 2],
    /// Quasi-binomial dispersion
    pub dispersion: f64,
    pub iterations: usize,
}

impl LogisticFit {
    pub fn predict(&self, sample_size: f64) -> f64 {
        expit(self.intercept + self.slope * sample_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredSampleSize {
    pub target: f64,
    pub estimate: f64,
    pub std_err: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
    pub fit: LogisticFit,
    pub points_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveEstimate {
    pub points: Vec<AggregateResult>,
    pub required: RequiredSampleSize,
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn expit(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

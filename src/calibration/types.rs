//----------------------------------------
// calibration mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::calibration::error::CalibrationError;
use crate::error::CtbayesErr;
use crate::evaluation::DecisionRule;
use crate::util::std_normal::two_sided_z;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub sample_size: usize,
    pub target_alpha: f64,
    /// Replicates per iteration
    pub replicates: usize,
    pub search_bounds: (f64, f64),
    pub tolerance: f64,
    pub max_iterations: usize,
    pub rule: DecisionRule,
    pub confidence: f64,
    pub seed: u64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        CalibrationSettings {
            sample_size: 120,
            target_alpha: 0.05,
            replicates: 2_000,
            search_bounds: (0.90, 0.99),
            tolerance: 0.005,
            max_iterations: 12,
            rule: DecisionRule::Average,
            confidence: 0.95,
            seed: 24601,
        }
    }
}

impl CalibrationSettings {
    pub fn validate(&self) -> Result<(), CtbayesErr> {
        let (lower, upper) = self.search_bounds;
        if !(0.0 <= lower && lower < upper && upper <= 1.0) {
            return Err(CalibrationError::BadBounds(lower, upper).into());
        }
        if !(self.target_alpha > 0.0 && self.target_alpha < 1.0) {
            return Err(CalibrationError::BadTarget(self.target_alpha).into());
        }
        if !(self.tolerance > 0.0) {
            return Err(CalibrationError::BadTolerance(self.tolerance).into());
        }
        if self.max_iterations == 0 {
            return Err(CalibrationError::NoIterations.into());
        }
        two_sided_z(self.confidence)?;
        Ok(())
    }
}

/// One bisection step. `bracket` is the search interval the midpoint
/// `threshold` was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStep {
    pub iteration: usize,
    pub bracket: (f64, f64),
    pub threshold: f64,
    pub rate: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub valid: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub threshold: f64,
    pub achieved_alpha: f64,
    /// Whether `achieved_alpha` is within tolerance of the target. When
    /// false, `threshold` is the best step found.
    pub converged: bool,
    pub history: Vec<CalibrationStep>,
}

//----------------------------------------
// generation mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::config::N_ENDPOINTS;

/// One synthetic trial. Built once by `generate`, read by the inference engine,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDataset {
    pub n: usize,
    /// 1 for treatment, 0 for control
    pub treatment: Vec<u8>,
    pub baseline: [Vec<f64>; N_ENDPOINTS],
    pub followup: [Vec<f64>; N_ENDPOINTS],
}

impl TrialDataset {
    pub fn n_treated(&self) -> usize {
        self.treatment.iter().filter(|&&a| a == 1).count()
    }

    pub fn n_control(&self) -> usize {
        self.n - self.n_treated()
    }

    pub fn allocation_proportion(&self) -> f64 {
        self.n_treated() as f64 / self.n as f64
    }
}

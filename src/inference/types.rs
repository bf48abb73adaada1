//----------------------------------------
// inference mod types
//----------------------------------------
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Direction, N_ENDPOINTS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Posterior draws returned per endpoint
    pub draws: usize,
    /// Smallest residual degrees of freedom the engine accepts
    pub min_residual_df: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            draws: 2_000,
            min_residual_df: 1,
        }
    }
}

/// Why the engine could not produce a posterior for one replicate. Never
/// fatal to a batch; the replicate is recorded as invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineFailure {
    #[error("too few subjects ({n}) for the model")]
    InsufficientData { n: usize },
    #[error("one arm has no subjects")]
    EmptyArm,
    #[error("design matrix for endpoint {endpoint} is singular")]
    SingularDesign { endpoint: usize },
    #[error("residual variance for endpoint {endpoint} is zero")]
    ZeroVariance { endpoint: usize },
    #[error("sampler did not converge: {0}")]
    NonConvergence(String),
    #[error("bad model configuration: {0}")]
    Configuration(String),
    #[error("engine panicked: {0}")]
    Panicked(String),
}

/// What the engine reports for one fitted dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSummary {
    /// P(effect < 0 | data) per endpoint
    pub prob_below_zero: [f64; N_ENDPOINTS],
    /// P(both effects < 0 | data)
    pub joint_below_zero: f64,
    /// Draws of each endpoint's treatment effect, paired by index
    pub draws: [Vec<f64>; N_ENDPOINTS],
}

/// Posterior probabilities that treatment is beneficial, after accounting
/// for each endpoint's improvement direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenefitProbabilities {
    pub per_endpoint: [f64; N_ENDPOINTS],
    pub joint: f64,
}

impl PosteriorSummary {
    pub fn benefit(&self, directions: &[Direction; N_ENDPOINTS]) -> BenefitProbabilities {
        let per_endpoint = [0_usize, 1].map(|k| match directions[k] {
            Direction::LowerIsBetter => self.prob_below_zero[k],
            Direction::HigherIsBetter => 1.0 - self.prob_below_zero[k],
        });
        let all_lower = directions.iter().all(|d| *d == Direction::LowerIsBetter);
        let paired = !self.draws[0].is_empty() && self.draws[0].len() == self.draws[1].len();
        let joint = if all_lower {
            self.joint_below_zero
        } else if paired {
            let favors = |k: usize, x: f64| match directions[k] {
                Direction::LowerIsBetter => x < 0.0,
                Direction::HigherIsBetter => x > 0.0,
            };
            let hits = self.draws[0]
                .iter()
                .zip(self.draws[1].iter())
                .filter(|&(&d_0, &d_1)| favors(0, d_0) && favors(1, d_1))
                .count();
            hits as f64 / self.draws[0].len() as f64
        } else {
            // Without paired draws only the Frechet upper bound is known
            per_endpoint[0].min(per_endpoint[1])
        };
        BenefitProbabilities {
            per_endpoint,
            joint,
        }
    }
}

//----------------------------------------
// evaluation mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::inference::BenefitProbabilities;

/// How the two per-endpoint probabilities are combined before comparison
/// with the decision threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Arithmetic mean of the per-endpoint probabilities of benefit
    #[default]
    Average,
    /// Probability that both effects favour treatment simultaneously
    Joint,
}

impl DecisionRule {
    pub fn combined_probability(&self, benefit: &BenefitProbabilities) -> f64 {
        match self {
            DecisionRule::Average => (benefit.per_endpoint[0] + benefit.per_endpoint[1]) / 2.0,
            DecisionRule::Joint => benefit.joint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicateOutcome {
    Success,
    Failure,
    /// The inference engine produced no posterior
    Invalid,
}

/// Everything the evaluator computed for one replicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicateEvaluation {
    pub benefit: BenefitProbabilities,
    /// Averaged probability, regardless of the rule in force
    pub average_probability: f64,
    pub joint_probability: f64,
    pub outcome: ReplicateOutcome,
}

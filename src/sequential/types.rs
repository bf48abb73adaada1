//----------------------------------------
// sequential mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::config::N_ENDPOINTS;
use crate::error::CtbayesErr;
use crate::evaluation::DecisionRule;
use crate::sequential::error::SequentialError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequentialSettings {
    /// Cumulative sample sizes at which the data are analysed; the last
    /// entry is the maximum sample size
    pub schedule: Vec<usize>,
    /// Stop early for efficacy when every endpoint exceeds this
    pub efficacy_threshold: f64,
    /// Stop early for futility when any endpoint falls below this
    pub futility_threshold: f64,
    /// Combined-probability threshold applied at the final look
    pub final_threshold: f64,
    pub rule: DecisionRule,
    pub runs: usize,
    pub seed: u64,
}

impl Default for SequentialSettings {
    fn default() -> Self {
        SequentialSettings {
            schedule: vec![60, 90, 120],
            efficacy_threshold: 0.99,
            futility_threshold: 0.10,
            final_threshold: 0.95,
            rule: DecisionRule::Average,
            runs: 500,
            seed: 24601,
        }
    }
}

impl SequentialSettings {
    pub fn validate(&self) -> Result<(), CtbayesErr> {
        if self.schedule.is_empty() {
            return Err(SequentialError::EmptySchedule.into());
        }
        if self.schedule[0] == 0 || self.schedule.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SequentialError::UnsortedSchedule(self.schedule.clone()).into());
        }
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !(in_unit(self.futility_threshold)
            && in_unit(self.efficacy_threshold)
            && in_unit(self.final_threshold)
            && self.futility_threshold < self.efficacy_threshold)
        {
            return Err(SequentialError::BadThresholds {
                futility: self.futility_threshold,
                efficacy: self.efficacy_threshold,
                final_threshold: self.final_threshold,
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookDecision {
    Continue,
    EfficacyStop,
    FutilityStop,
    /// The engine failed at this look; the run moves on to the next one
    ModelFailed,
    /// Final look only
    Success,
    /// Final look only
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Efficacy,
    Futility,
    Success,
    Failure,
    ModelFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookRecord {
    pub sample_size: usize,
    /// Per-endpoint probability of benefit; `None` when the engine failed
    pub probabilities: Option<[f64; N_ENDPOINTS]>,
    pub decision: LookDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialRun {
    pub looks: Vec<LookRecord>,
    pub stopping_sample_size: usize,
    pub reason: StopReason,
}

impl SequentialRun {
    pub fn model_failures(&self) -> usize {
        self.looks
            .iter()
            .filter(|l| l.decision == LookDecision::ModelFailed)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasonProbabilities {
    pub efficacy: f64,
    pub futility: f64,
    pub success: f64,
    pub failure: f64,
    pub model_failed: f64,
}

/// Stopping proportions at one scheduled look
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageRow {
    pub sample_size: usize,
    pub stopped: usize,
    pub proportion: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialSummary {
    pub runs: usize,
    pub reasons: ReasonProbabilities,
    /// Mean stopping sample size, i.e. the expected sample size
    pub mean_sample_size: f64,
    pub median_sample_size: f64,
    pub sd_sample_size: f64,
    pub stages: Vec<StageRow>,
    /// Looks, over all runs, at which the engine failed
    pub model_failed_looks: usize,
}

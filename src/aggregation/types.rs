//----------------------------------------
// aggregation mod types
//----------------------------------------
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::config::EffectConfig;
use crate::design_prior::EffectPrior;
use crate::evaluation::{DecisionRule, ReplicateOutcome};

/// Tally of replicate outcomes. Addition is associative and commutative, so
/// tallies from any partition of the replicates combine to the same total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub successes: usize,
    pub failures: usize,
    pub invalid: usize,
}

impl OutcomeCounts {
    pub fn record(mut self, outcome: ReplicateOutcome) -> Self {
        match outcome {
            ReplicateOutcome::Success => self.successes += 1,
            ReplicateOutcome::Failure => self.failures += 1,
            ReplicateOutcome::Invalid => self.invalid += 1,
        }
        self
    }

    pub fn valid(&self) -> usize {
        self.successes + self.failures
    }

    pub fn total(&self) -> usize {
        self.valid() + self.invalid
    }
}

impl Add for OutcomeCounts {
    type Output = OutcomeCounts;

    fn add(self, other: OutcomeCounts) -> OutcomeCounts {
        OutcomeCounts {
            successes: self.successes + other.successes,
            failures: self.failures + other.failures,
            invalid: self.invalid + other.invalid,
        }
    }
}

impl FromIterator<ReplicateOutcome> for OutcomeCounts {
    fn from_iter<I: IntoIterator<Item = ReplicateOutcome>>(iter: I) -> Self {
        iter.into_iter()
            .fold(OutcomeCounts::default(), OutcomeCounts::record)
    }
}

/// Rate estimate for one batch. `estimate`, `lower` and `upper` are `None`
/// when no replicate produced a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub sample_size: usize,
    pub estimate: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub confidence: f64,
    pub successes: usize,
    pub valid: usize,
    /// Replicates for which the engine failed
    pub failures: usize,
}

impl AggregateResult {
    pub fn is_defined(&self) -> bool {
        self.estimate.is_some()
    }

    pub fn replicates(&self) -> usize {
        self.valid + self.failures
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.estimate, self.lower, self.upper) {
            (Some(est), Some(lower), Some(upper)) => write!(
                f,
                "N={}: {:.4} [{:.4}, {:.4}] ({}/{} valid, {} failed)",
                self.sample_size,
                est,
                lower,
                upper,
                self.valid,
                self.replicates(),
                self.failures
            ),
            _ => write!(
                f,
                "N={}: undefined ({}/{} valid, {} failed)",
                self.sample_size,
                self.valid,
                self.replicates(),
                self.failures
            ),
        }
    }
}

/// Per-batch knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub sample_size: usize,
    pub replicates: usize,
    pub threshold: f64,
    pub rule: DecisionRule,
    pub confidence: f64,
    pub seed: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            sample_size: 120,
            replicates: 1_000,
            threshold: 0.95,
            rule: DecisionRule::Average,
            confidence: 0.95,
            seed: 24601,
        }
    }
}

/// Where each replicate's true effect comes from. Power, Type I error and
/// assurance batches differ only in this argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSource {
    /// Conditional power at a fixed effect
    Fixed(EffectConfig),
    /// The given residual structure with zero treatment effect
    Null(EffectConfig),
    /// Assurance: one effect drawn per replicate from the design prior
    Prior {
        base: EffectConfig,
        prior: EffectPrior,
    },
}

impl EffectSource {
    pub fn base(&self) -> &EffectConfig {
        match self {
            EffectSource::Fixed(e) | EffectSource::Null(e) => e,
            EffectSource::Prior { base, .. } => base,
        }
    }
}

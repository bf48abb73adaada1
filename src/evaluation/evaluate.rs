use crate::config::{Direction, N_ENDPOINTS};
use crate::evaluation::types::{DecisionRule, ReplicateEvaluation, ReplicateOutcome};
use crate::generation::TrialDataset;
use crate::inference::{
    BenefitProbabilities, EngineFailure, InferenceEngine, ModelConfig, fit_guarded,
};

/// Success when the rule's combined probability reaches the threshold
pub fn classify(
    benefit: &BenefitProbabilities,
    threshold: f64,
    rule: DecisionRule,
) -> ReplicateEvaluation {
    let average_probability = DecisionRule::Average.combined_probability(benefit);
    let combined = rule.combined_probability(benefit);
    let outcome = if combined >= threshold {
        ReplicateOutcome::Success
    } else {
        ReplicateOutcome::Failure
    };
    ReplicateEvaluation {
        benefit: *benefit,
        average_probability,
        joint_probability: benefit.joint,
        outcome,
    }
}

/// Binds an engine to the model and decision settings of one study so that
/// replicates only supply their dataset, threshold and seed
pub struct Evaluator<'a, E: InferenceEngine + ?Sized> {
    pub engine: &'a E,
    pub model: &'a ModelConfig,
    pub directions: [Direction; N_ENDPOINTS],
    pub rule: DecisionRule,
}

impl<'a, E: InferenceEngine + ?Sized> Evaluator<'a, E> {
    pub fn new(
        engine: &'a E,
        model: &'a ModelConfig,
        directions: [Direction; N_ENDPOINTS],
        rule: DecisionRule,
    ) -> Self {
        Evaluator {
            engine,
            model,
            directions,
            rule,
        }
    }

    /// Per-endpoint benefit probabilities, or the engine's failure
    pub fn benefit(
        &self,
        dataset: &TrialDataset,
        seed: u64,
    ) -> Result<BenefitProbabilities, EngineFailure> {
        fit_guarded(self.engine, dataset, self.model, seed)
            .map(|summary| summary.benefit(&self.directions))
    }

    pub fn evaluate_detailed(
        &self,
        dataset: &TrialDataset,
        threshold: f64,
        seed: u64,
    ) -> Result<ReplicateEvaluation, EngineFailure> {
        let benefit = self.benefit(dataset, seed)?;
        Ok(classify(&benefit, threshold, self.rule))
    }

    pub fn evaluate(&self, dataset: &TrialDataset, threshold: f64, seed: u64) -> ReplicateOutcome {
        match self.evaluate_detailed(dataset, threshold, seed) {
            Ok(evaluation) => evaluation.outcome,
            Err(failure) => {
                tracing::trace!(%failure, "replicate invalid");
                ReplicateOutcome::Invalid
            }
        }
    }
}

//----------------------------------------
// Study context
//----------------------------------------
use serde::Serialize;

use crate::config::{GeneratorSettings, OutcomeSpec};
use crate::error::CtbayesErr;
use crate::evaluation::{DecisionRule, Evaluator};
use crate::inference::{InferenceEngine, ModelConfig};

/// The fixed parts of a simulation study: what is measured, how data are
/// generated and which engine analyses them. Everything that varies between
/// runs (true effects, thresholds, sample sizes, seeds) is passed per call.
pub struct Study<'a, E: InferenceEngine + ?Sized> {
    pub engine: &'a E,
    pub model: ModelConfig,
    pub outcomes: &'a OutcomeSpec,
    pub generator: GeneratorSettings,
}

impl<'a, E: InferenceEngine + ?Sized> Study<'a, E> {
    pub fn new(
        engine: &'a E,
        model: ModelConfig,
        outcomes: &'a OutcomeSpec,
        generator: GeneratorSettings,
    ) -> Result<Self, CtbayesErr> {
        outcomes.validate()?;
        generator.validate()?;
        Ok(Study {
            engine,
            model,
            outcomes,
            generator,
        })
    }

    pub fn evaluator(&self, rule: DecisionRule) -> Evaluator<'_, E> {
        Evaluator::new(self.engine, &self.model, self.outcomes.directions(), rule)
    }

    /// Serializable identity of the study, used in cache keys
    pub(crate) fn identity(&self) -> StudyIdentity<'_> {
        StudyIdentity {
            engine: self.engine.name(),
            model: &self.model,
            outcomes: self.outcomes,
            generator: &self.generator,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct StudyIdentity<'a> {
    engine: &'a str,
    model: &'a ModelConfig,
    outcomes: &'a OutcomeSpec,
    generator: &'a GeneratorSettings,
}

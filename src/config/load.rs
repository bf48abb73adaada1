//----------------------------------------
// Simulation configuration file
//----------------------------------------
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aggregation::BatchSettings;
use crate::aggregation::batch::check_settings;
use crate::calibration::CalibrationSettings;
use crate::config::error::ConfigError;
use crate::config::types::{EffectConfig, GeneratorSettings, OutcomeSpec};
use crate::design_prior::EffectPrior;
use crate::error::CtbayesErr;
use crate::generation::generate::validate_effect;
use crate::inference::ModelConfig;
use crate::sequential::SequentialSettings;

/// Sample sizes and target rate for the sample size curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    pub sample_sizes: Vec<usize>,
    pub target: f64,
}

impl Default for CurveSettings {
    fn default() -> Self {
        CurveSettings {
            sample_sizes: vec![40, 60, 80, 100, 120, 150],
            target: 0.8,
        }
    }
}

/// Every knob of a simulation study. Missing sections fall back to their
/// defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub outcomes: OutcomeSpec,
    pub effect: EffectConfig,
    pub generator: GeneratorSettings,
    pub model: ModelConfig,
    pub batch: BatchSettings,
    pub curve: CurveSettings,
    pub calibration: CalibrationSettings,
    pub sequential: SequentialSettings,
    /// Design prior on the true effects, for assurance
    pub design_prior: Option<EffectPrior>,
    /// Worker threads; `None` uses rayon's default
    pub threads: Option<usize>,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, CtbayesErr> {
        let config: SimulationConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CtbayesErr> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), CtbayesErr> {
        self.outcomes.validate()?;
        self.generator.validate()?;
        validate_effect(&self.effect)?;
        check_settings(&self.batch)?;
        if !(self.curve.target > 0.0 && self.curve.target < 1.0) {
            return Err(ConfigError::BadTarget(self.curve.target).into());
        }
        self.calibration.validate()?;
        self.sequential.validate()?;
        if let Some(prior) = &self.design_prior {
            prior.validate()?;
        }
        if self.threads == Some(0) {
            return Err(ConfigError::NoThreads.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design_prior::DesignPrior;
    use std::io::Write;

    #[test]
    fn empty_object_is_default() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn partial_sections() {
        let json = r#"{
            "batch": { "sample_size": 80, "replicates": 200 },
            "sequential": { "schedule": [40, 80], "efficacy_threshold": 0.98 },
            "design_prior": {
                "per_endpoint": [
                    { "family": "normal", "mean": -8.0, "sd": 3.0 },
                    { "family": "uniform", "lower": -6.0, "upper": -2.0 }
                ]
            },
            "threads": 2
        }"#;
        let config = SimulationConfig::from_json(json).unwrap();
        assert_eq!(config.batch.sample_size, 80);
        assert_eq!(config.batch.threshold, 0.95);
        assert_eq!(config.sequential.schedule, vec![40, 80]);
        assert_eq!(config.sequential.futility_threshold, 0.10);
        assert_eq!(
            config.design_prior,
            Some(EffectPrior::PerEndpoint([
                DesignPrior::Normal {
                    mean: -8.0,
                    sd: 3.0
                },
                DesignPrior::Uniform {
                    lower: -6.0,
                    upper: -2.0
                },
            ]))
        );
        assert_eq!(config.threads, Some(2));
    }

    #[test]
    fn rejects_bad_sections() {
        assert!(SimulationConfig::from_json(r#"{ "threads": 0 }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "batch": { "replicates": 0 } }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "generator": { "allocation": 1.5 } }"#).is_err());
        let err = SimulationConfig::from_json(r#"{ "sequential": { "schedule": [] } }"#)
            .unwrap_err();
        assert!(err.to_string().starts_with("while simulating sequential trial"));
        let err = SimulationConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("while reading configuration"));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "curve": {{ "target": 0.9 }} }}"#).unwrap();
        let config = SimulationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.curve.target, 0.9);
        assert!(SimulationConfig::from_path("/nonexistent/ctbayes.json").is_err());
    }
}

use crate::aggregation::{
    AggregateResult, BatchSettings, EffectSource, SimulationCache, run_batch, run_batch_cached,
};
use crate::curve::required_n::fit_required_n;
use crate::curve::types::CurveEstimate;
use crate::error::CtbayesErr;
use crate::inference::InferenceEngine;
use crate::study::Study;
use crate::util::seeds::replicate_seed;

/// Runs one batch per entry of `sample_sizes` and fits the required sample
/// size for `target`. Batches run one after another; replicates within each
/// batch run in parallel.
pub fn estimate_curve<E: InferenceEngine + ?Sized>(
    study: &Study<'_, E>,
    effects: &EffectSource,
    base_settings: &BatchSettings,
    sample_sizes: &[usize],
    target: f64,
    cache: Option<&dyn SimulationCache>,
) -> Result<CurveEstimate, CtbayesErr> {
    let points = sample_sizes
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let settings = BatchSettings {
                sample_size: n,
                seed: replicate_seed(base_settings.seed, i as u64),
                ..*base_settings
            };
            match cache {
                Some(cache) => run_batch_cached(cache, study, effects, &settings),
                None => run_batch(study, effects, &settings),
            }
        })
        .collect::<Result<Vec<AggregateResult>, CtbayesErr>>()?;

    let required = fit_required_n(&points, target, base_settings.confidence)?;
    tracing::info!(
        target,
        estimate = required.estimate,
        std_err = required.std_err,
        "required sample size"
    );
    Ok(CurveEstimate { points, required })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectConfig, GeneratorSettings, OutcomeSpec};
    use crate::evaluation::DecisionRule;
    use crate::inference::{AncovaEngine, ModelConfig};

    #[test]
    fn power_curve_brackets_required_n() {
        let outcomes = OutcomeSpec::default();
        let engine = AncovaEngine;
        let study = Study::new(
            &engine,
            ModelConfig {
                draws: 200,
                ..ModelConfig::default()
            },
            &outcomes,
            GeneratorSettings::default(),
        )
        .unwrap();
        let settings = BatchSettings {
            replicates: 300,
            threshold: 0.95,
            rule: DecisionRule::Average,
            ..BatchSettings::default()
        };
        let estimate = estimate_curve(
            &study,
            &EffectSource::Fixed(EffectConfig::default()),
            &settings,
            &[20, 40, 60, 90, 120],
            0.8,
            None,
        )
        .unwrap();
        assert_eq!(estimate.points.len(), 5);
        let first = estimate.points[0].estimate.unwrap();
        let last = estimate.points[4].estimate.unwrap();
        assert!(last > first);
        assert!(estimate.required.estimate > 20.0);
        assert!(estimate.required.estimate < 400.0);
    }
}

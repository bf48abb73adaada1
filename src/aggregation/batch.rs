use rayon::prelude::*;

use crate::aggregation::aggregate::from_counts;
use crate::aggregation::cache::{BatchKey, SimulationCache};
use crate::aggregation::error::AggregationError;
use crate::aggregation::types::{AggregateResult, BatchSettings, EffectSource, OutcomeCounts};
use crate::config::EffectConfig;
use crate::error::CtbayesErr;
use crate::generation::{generate, generate::validate_effect};
use crate::inference::InferenceEngine;
use crate::study::Study;
use crate::util::seeds::replicate_seed;
use crate::util::std_normal::two_sided_z;

// Sub-seed counters within one replicate
pub(crate) const DATA_STREAM: u64 = 0;
pub(crate) const ENGINE_STREAM: u64 = 1;
// Counter reserved for design-prior draws; replicate indices never reach it
const PRIOR_STREAM: u64 = u64::MAX;

pub(crate) fn check_settings(settings: &BatchSettings) -> Result<(), CtbayesErr> {
    if settings.replicates == 0 {
        return Err(AggregationError::NoReplicates.into());
    }
    if !(0.0..=1.0).contains(&settings.threshold) {
        return Err(AggregationError::BadThreshold(settings.threshold).into());
    }
    two_sided_z(settings.confidence)?;
    Ok(())
}

/// Resolves every replicate's true effect up front. Prior draws are made
/// once here; `Fixed` and `Null` need no per-replicate storage.
pub(crate) enum ReplicateEffects {
    Constant(EffectConfig),
    Drawn(Vec<EffectConfig>),
}

impl ReplicateEffects {
    pub(crate) fn resolve(
        source: &EffectSource,
        replicates: usize,
        seed: u64,
    ) -> Result<Self, CtbayesErr> {
        validate_effect(source.base())?;
        match source {
            EffectSource::Fixed(e) => Ok(ReplicateEffects::Constant(*e)),
            EffectSource::Null(e) => Ok(ReplicateEffects::Constant(e.null())),
            EffectSource::Prior { base, prior } => Ok(ReplicateEffects::Drawn(
                prior.draw_effects(base, replicates, replicate_seed(seed, PRIOR_STREAM))?,
            )),
        }
    }

    pub(crate) fn get(&self, i: usize) -> EffectConfig {
        match self {
            ReplicateEffects::Constant(e) => *e,
            ReplicateEffects::Drawn(v) => v[i],
        }
    }
}

/// Runs `settings.replicates` independent trials in parallel and reduces
/// them to a rate estimate. Engine failures become invalid replicates;
/// configuration errors abort the batch.
pub fn run_batch<E: InferenceEngine + ?Sized>(
    study: &Study<'_, E>,
    effects: &EffectSource,
    settings: &BatchSettings,
) -> Result<AggregateResult, CtbayesErr> {
    check_settings(settings)?;
    let replicate_effects = ReplicateEffects::resolve(effects, settings.replicates, settings.seed)?;
    let evaluator = study.evaluator(settings.rule);

    let counts = (0..settings.replicates)
        .into_par_iter()
        .map(|i| -> Result<_, CtbayesErr> {
            let seed = replicate_seed(settings.seed, i as u64);
            let effect = replicate_effects.get(i);
            let data = generate(
                settings.sample_size,
                study.outcomes,
                &effect,
                &study.generator,
                replicate_seed(seed, DATA_STREAM),
            )?;
            Ok(evaluator.evaluate(
                &data,
                settings.threshold,
                replicate_seed(seed, ENGINE_STREAM),
            ))
        })
        .try_fold(OutcomeCounts::default, |counts, outcome| {
            outcome.map(|o| counts.record(o))
        })
        .try_reduce(OutcomeCounts::default, |a, b| Ok::<_, CtbayesErr>(a + b))?;

    let result = from_counts(settings.sample_size, counts, settings.confidence)?;
    tracing::info!(
        sample_size = settings.sample_size,
        threshold = settings.threshold,
        valid = result.valid,
        replicates = settings.replicates,
        failures = result.failures,
        estimate = ?result.estimate,
        "batch finished"
    );
    Ok(result)
}

/// `run_batch`, short-circuited through `cache` when an identical batch has
/// already been run
pub fn run_batch_cached<E: InferenceEngine + ?Sized>(
    cache: &dyn SimulationCache,
    study: &Study<'_, E>,
    effects: &EffectSource,
    settings: &BatchSettings,
) -> Result<AggregateResult, CtbayesErr> {
    let key = BatchKey::new(study, effects, settings)?;
    if let Some(hit) = cache.get(&key) {
        tracing::debug!(sample_size = settings.sample_size, "batch served from cache");
        return Ok(hit);
    }
    let result = run_batch(study, effects, settings)?;
    cache.put(&key, &result);
    Ok(result)
}

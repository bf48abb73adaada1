use rayon::prelude::*;

use crate::aggregation::EffectSource;
use crate::aggregation::batch::{DATA_STREAM, ENGINE_STREAM, ReplicateEffects};
use crate::config::EffectConfig;
use crate::error::CtbayesErr;
use crate::evaluation::{ReplicateOutcome, classify};
use crate::generation::{generate, generate::validate_effect};
use crate::inference::InferenceEngine;
use crate::sequential::error::SequentialError;
use crate::sequential::summary::summarize;
use crate::sequential::types::{
    LookDecision, LookRecord, SequentialRun, SequentialSettings, SequentialSummary, StopReason,
};
use crate::study::Study;
use crate::util::seeds::replicate_seed;

/// Simulates one trial analysed at every size in `settings.schedule`.
///
/// The cumulative dataset is regenerated at each look from the same data
/// seed, so earlier subjects are shared between looks. Interim looks stop
/// for efficacy when every endpoint's probability of benefit exceeds the
/// efficacy threshold and for futility when any falls below the futility
/// threshold. An engine failure at an interim look is recorded and the run
/// moves on. The final look classifies the trial against the final
/// threshold under `settings.rule`.
pub fn simulate_sequential<E: InferenceEngine + ?Sized>(
    study: &Study<'_, E>,
    effect: &EffectConfig,
    settings: &SequentialSettings,
    seed: u64,
) -> Result<SequentialRun, CtbayesErr> {
    settings.validate()?;
    validate_effect(effect)?;
    let evaluator = study.evaluator(settings.rule);
    let data_seed = replicate_seed(seed, DATA_STREAM);
    let engine_seed = replicate_seed(seed, ENGINE_STREAM);
    let final_look = settings.schedule.len() - 1;
    let mut looks: Vec<LookRecord> = Vec::with_capacity(settings.schedule.len());

    for (k, &sample_size) in settings.schedule.iter().enumerate() {
        let data = generate(
            sample_size,
            study.outcomes,
            effect,
            &study.generator,
            data_seed,
        )?;
        let benefit = evaluator.benefit(&data, replicate_seed(engine_seed, k as u64));

        let (decision, probabilities) = match benefit {
            Err(failure) => {
                tracing::trace!(look = k, sample_size, %failure, "engine failed at look");
                (LookDecision::ModelFailed, None)
            }
            Ok(benefit) => {
                let p = benefit.per_endpoint;
                let decision = if k == final_look {
                    match classify(&benefit, settings.final_threshold, settings.rule).outcome {
                        ReplicateOutcome::Success => LookDecision::Success,
                        _ => LookDecision::Failure,
                    }
                } else if p.iter().all(|&x| x > settings.efficacy_threshold) {
                    LookDecision::EfficacyStop
                } else if p.iter().any(|&x| x < settings.futility_threshold) {
                    LookDecision::FutilityStop
                } else {
                    LookDecision::Continue
                };
                (decision, Some(p))
            }
        };
        tracing::trace!(look = k, sample_size, ?probabilities, ?decision, "look");
        looks.push(LookRecord {
            sample_size,
            probabilities,
            decision,
        });

        let reason = match decision {
            LookDecision::EfficacyStop => Some(StopReason::Efficacy),
            LookDecision::FutilityStop => Some(StopReason::Futility),
            LookDecision::Success => Some(StopReason::Success),
            LookDecision::Failure => Some(StopReason::Failure),
            // No later look to fall back to
            LookDecision::ModelFailed if k == final_look => Some(StopReason::ModelFailed),
            LookDecision::ModelFailed | LookDecision::Continue => None,
        };
        if let Some(reason) = reason {
            return Ok(SequentialRun {
                looks,
                stopping_sample_size: sample_size,
                reason,
            });
        }
    }
    // validate() guarantees a final look, which always terminates the run
    Err(SequentialError::EmptySchedule.into())
}

/// Runs `settings.runs` independent sequential trials in parallel and
/// summarizes their stopping behaviour
pub fn run_sequential_batch<E: InferenceEngine + ?Sized>(
    study: &Study<'_, E>,
    effects: &EffectSource,
    settings: &SequentialSettings,
) -> Result<SequentialSummary, CtbayesErr> {
    settings.validate()?;
    if settings.runs == 0 {
        return Err(SequentialError::NoRuns.into());
    }
    let run_effects = ReplicateEffects::resolve(effects, settings.runs, settings.seed)?;

    let runs = (0..settings.runs)
        .into_par_iter()
        .map(|i| {
            simulate_sequential(
                study,
                &run_effects.get(i),
                settings,
                replicate_seed(settings.seed, i as u64),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = summarize(&settings.schedule, &runs)?;
    tracing::info!(
        runs = summary.runs,
        efficacy = summary.reasons.efficacy,
        futility = summary.reasons.futility,
        expected_sample_size = summary.mean_sample_size,
        model_failed_looks = summary.model_failed_looks,
        "sequential batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorSettings, OutcomeSpec};
    use crate::generation::TrialDataset;
    use crate::inference::{EngineFailure, ModelConfig, PosteriorSummary};

    /// Returns fixed probabilities, failing at the listed sample sizes
    struct ScriptedEngine {
        probabilities: [f64; 2],
        fail_at: Vec<usize>,
    }

    impl InferenceEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fit(
            &self,
            dataset: &TrialDataset,
            _model: &ModelConfig,
            _seed: u64,
        ) -> Result<PosteriorSummary, EngineFailure> {
            if self.fail_at.contains(&dataset.n) {
                return Err(EngineFailure::NonConvergence(String::from("scripted")));
            }
            let [p_0, p_1] = self.probabilities;
            Ok(PosteriorSummary {
                prob_below_zero: [p_0, p_1],
                joint_below_zero: p_0.min(p_1),
                draws: [vec![], vec![]],
            })
        }
    }

    fn run(engine: &ScriptedEngine, settings: &SequentialSettings) -> SequentialRun {
        let outcomes = OutcomeSpec::default();
        let study = Study::new(
            engine,
            ModelConfig::default(),
            &outcomes,
            GeneratorSettings::default(),
        )
        .unwrap();
        simulate_sequential(&study, &EffectConfig::default(), settings, 7).unwrap()
    }

    fn settings() -> SequentialSettings {
        SequentialSettings {
            schedule: vec![60, 90, 120],
            efficacy_threshold: 0.95,
            futility_threshold: 0.10,
            final_threshold: 0.95,
            ..SequentialSettings::default()
        }
    }

    #[test]
    fn efficacy_stop_at_first_interim() {
        let engine = ScriptedEngine {
            probabilities: [0.96, 0.97],
            fail_at: vec![],
        };
        let res = run(&engine, &settings());
        assert_eq!(res.reason, StopReason::Efficacy);
        assert_eq!(res.stopping_sample_size, 60);
        assert_eq!(res.looks.len(), 1);
        assert_eq!(res.looks[0].probabilities, Some([0.96, 0.97]));
    }

    #[test]
    fn futility_when_either_endpoint_is_low() {
        let engine = ScriptedEngine {
            probabilities: [0.99, 0.05],
            fail_at: vec![],
        };
        let res = run(&engine, &settings());
        assert_eq!(res.reason, StopReason::Futility);
        assert_eq!(res.stopping_sample_size, 60);
    }

    #[test]
    fn model_failure_continues_to_next_look() {
        let engine = ScriptedEngine {
            probabilities: [0.5, 0.6],
            fail_at: vec![60],
        };
        let res = run(&engine, &settings());
        let decisions: Vec<LookDecision> = res.looks.iter().map(|l| l.decision).collect();
        assert_eq!(
            decisions,
            vec![
                LookDecision::ModelFailed,
                LookDecision::Continue,
                LookDecision::Failure
            ]
        );
        assert_eq!(res.reason, StopReason::Failure);
        assert_eq!(res.stopping_sample_size, 120);
        assert_eq!(res.model_failures(), 1);
    }

    #[test]
    fn model_failure_at_final_look() {
        let engine = ScriptedEngine {
            probabilities: [0.5, 0.6],
            fail_at: vec![120],
        };
        let res = run(&engine, &settings());
        assert_eq!(res.reason, StopReason::ModelFailed);
        assert_eq!(res.stopping_sample_size, 120);
        assert_eq!(res.looks.len(), 3);
    }

    #[test]
    fn final_look_uses_final_threshold() {
        let engine = ScriptedEngine {
            probabilities: [0.96, 0.97],
            fail_at: vec![],
        };
        let single = SequentialSettings {
            schedule: vec![120],
            ..settings()
        };
        assert_eq!(run(&engine, &single).reason, StopReason::Success);
        let strict = SequentialSettings {
            final_threshold: 0.99,
            ..single
        };
        assert_eq!(run(&engine, &strict).reason, StopReason::Failure);
    }

    #[test]
    fn rejects_unsorted_schedule() {
        let engine = ScriptedEngine {
            probabilities: [0.5, 0.5],
            fail_at: vec![],
        };
        let outcomes = OutcomeSpec::default();
        let study = Study::new(
            &engine,
            ModelConfig::default(),
            &outcomes,
            GeneratorSettings::default(),
        )
        .unwrap();
        let bad = SequentialSettings {
            schedule: vec![90, 60],
            ..settings()
        };
        let err = simulate_sequential(&study, &EffectConfig::default(), &bad, 1).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn batch_summary() {
        let engine = ScriptedEngine {
            probabilities: [0.5, 0.6],
            fail_at: vec![],
        };
        let outcomes = OutcomeSpec::default();
        let study = Study::new(
            &engine,
            ModelConfig::default(),
            &outcomes,
            GeneratorSettings::default(),
        )
        .unwrap();
        let s = SequentialSettings {
            runs: 25,
            ..settings()
        };
        let summary =
            run_sequential_batch(&study, &EffectSource::Fixed(EffectConfig::default()), &s)
                .unwrap();
        assert_eq!(summary.runs, 25);
        assert_eq!(summary.reasons.failure, 1.0);
        assert_eq!(summary.mean_sample_size, 120.0);
        assert_eq!(summary.stages.last().map(|r| r.cumulative), Some(1.0));
    }
}

use crate::aggregation::{BatchSettings, EffectSource, run_batch};
use crate::calibration::error::CalibrationError;
use crate::calibration::types::{CalibrationResult, CalibrationSettings, CalibrationStep};
use crate::config::EffectConfig;
use crate::error::CtbayesErr;
use crate::inference::InferenceEngine;
use crate::study::Study;
use crate::util::seeds::replicate_seed;

/// Bisection on the decision threshold for a target Type I error rate.
///
/// Each iteration runs a fresh null batch (all true effects zero, residual
/// structure from `effect`) at the bracket midpoint. A higher threshold
/// gives a lower rate, so a rate above target moves the bracket up. Stops
/// once the estimate is within `tolerance` of the target, or after
/// `max_iterations`, returning the closest step seen.
pub fn calibrate<E: InferenceEngine + ?Sized>(
    study: &Study<'_, E>,
    effect: &EffectConfig,
    settings: &CalibrationSettings,
) -> Result<CalibrationResult, CtbayesErr> {
    settings.validate()?;
    let null = EffectSource::Null(*effect);
    let target = settings.target_alpha;
    let (mut lower, mut upper) = settings.search_bounds;
    let mut history: Vec<CalibrationStep> = Vec::with_capacity(settings.max_iterations);
    let mut converged = false;

    for iteration in 1..=settings.max_iterations {
        let threshold = (lower + upper) / 2.0;
        let batch = BatchSettings {
            sample_size: settings.sample_size,
            replicates: settings.replicates,
            threshold,
            rule: settings.rule,
            confidence: settings.confidence,
            seed: replicate_seed(settings.seed, iteration as u64),
        };
        let result = run_batch(study, &null, &batch)?;
        history.push(CalibrationStep {
            iteration,
            bracket: (lower, upper),
            threshold,
            rate: result.estimate,
            lower: result.lower,
            upper: result.upper,
            valid: result.valid,
            failures: result.failures,
        });
        tracing::debug!(
            iteration,
            threshold,
            rate = ?result.estimate,
            bracket_lower = lower,
            bracket_upper = upper,
            "calibration step"
        );

        let Some(rate) = result.estimate else {
            tracing::warn!(iteration, threshold, "calibration batch had no valid replicates");
            continue;
        };
        if (rate - target).abs() <= settings.tolerance {
            converged = true;
            break;
        }
        if rate > target {
            lower = threshold;
        } else {
            upper = threshold;
        }
    }

    // On convergence the closest step is within tolerance as well
    let (threshold, achieved_alpha) = history
        .iter()
        .filter_map(|step| step.rate.map(|rate| (step.threshold, rate)))
        .min_by(|(_, a), (_, b)| (a - target).abs().total_cmp(&(b - target).abs()))
        .ok_or(CalibrationError::NoValidEstimates {
            iterations: history.len(),
        })?;

    if !converged {
        tracing::warn!(
            iterations = history.len(),
            threshold,
            achieved_alpha,
            target,
            "threshold calibration did not reach tolerance"
        );
    }
    Ok(CalibrationResult {
        threshold,
        achieved_alpha,
        converged,
        history,
    })
}

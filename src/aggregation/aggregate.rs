use crate::aggregation::types::{AggregateResult, OutcomeCounts};
use crate::aggregation::wilson::wilson_interval;
use crate::error::CtbayesErr;
use crate::evaluation::ReplicateOutcome;
use crate::util::std_normal::two_sided_z;

/// Reduces replicate outcomes to a rate with a Wilson interval. Invalid
/// replicates are counted but excluded from the denominator.
pub fn aggregate(
    sample_size: usize,
    outcomes: &[ReplicateOutcome],
    confidence: f64,
) -> Result<AggregateResult, CtbayesErr> {
    let counts: OutcomeCounts = outcomes.iter().copied().collect();
    from_counts(sample_size, counts, confidence)
}

pub fn from_counts(
    sample_size: usize,
    counts: OutcomeCounts,
    confidence: f64,
) -> Result<AggregateResult, CtbayesErr> {
    let valid = counts.valid();
    if valid == 0 {
        tracing::warn!(
            sample_size,
            failures = counts.invalid,
            "no valid replicates; rate is undefined"
        );
        // Still reject a nonsensical confidence level
        two_sided_z(confidence)?;
        return Ok(AggregateResult {
            sample_size,
            estimate: None,
            lower: None,
            upper: None,
            confidence,
            successes: 0,
            valid: 0,
            failures: counts.invalid,
        });
    }
    let (lower, upper) = wilson_interval(counts.successes, valid, confidence)?;
    Ok(AggregateResult {
        sample_size,
        estimate: Some(counts.successes as f64 / valid as f64),
        lower: Some(lower),
        upper: Some(upper),
        confidence,
        successes: counts.successes,
        valid,
        failures: counts.invalid,
    })
}

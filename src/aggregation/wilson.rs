use crate::aggregation::error::AggregationError;
use crate::error::CtbayesErr;
use crate::util::std_normal::two_sided_z;

/// Wilson score interval for `successes` out of `trials` at the given
/// two-sided confidence level. Always satisfies
/// `0 <= lower <= successes / trials <= upper <= 1`.
pub fn wilson_interval(
    successes: usize,
    trials: usize,
    confidence: f64,
) -> Result<(f64, f64), CtbayesErr> {
    if trials == 0 {
        return Err(AggregationError::EmptyInterval.into());
    }
    if successes > trials {
        return Err(AggregationError::TooManySuccesses { successes, trials }.into());
    }
    let z = two_sided_z(confidence)?;
    let n = trials as f64;
    let p_hat = successes as f64 / n;
    let z_sq = z * z;

    let denom = 1.0 + z_sq / n;
    let center = (p_hat + z_sq / (2.0 * n)) / denom;
    let half_width = z * (p_hat * (1.0 - p_hat) / n + z_sq / (4.0 * n * n)).sqrt() / denom;

    // Analytically lower = 0 at p_hat = 0 and upper = 1 at p_hat = 1; pin
    // them there so rounding cannot leave the point estimate outside
    let lower = if successes == 0 {
        0.0
    } else {
        (center - half_width).clamp(0.0, p_hat)
    };
    let upper = if successes == trials {
        1.0
    } else {
        (center + half_width).clamp(p_hat, 1.0)
    };
    Ok((lower, upper))
}

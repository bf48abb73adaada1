use crate::aggregation::AggregateResult;
use crate::curve::error::CurveFitError;
use crate::curve::fit::fit_logistic;
use crate::curve::types::{CurvePoint, RequiredSampleSize, logit};
use crate::error::CtbayesErr;
use crate::util::std_normal::two_sided_z;

// Smallest logit change across the observed sample sizes that counts as an
// increasing curve; flat rates leave IRLS with a rounding-level slope
const MIN_LOGIT_CHANGE: f64 = 1e-8;

/// Sample size at which the fitted curve reaches `target`, with a
/// delta-method standard error and a symmetric normal interval.
///
/// Batches with an undefined rate are skipped; each remaining point is
/// weighted by its valid replicate count.
pub fn fit_required_n(
    results: &[AggregateResult],
    target: f64,
    confidence: f64,
) -> Result<RequiredSampleSize, CtbayesErr> {
    if !(target > 0.0 && target < 1.0) {
        return Err(CurveFitError::BadTarget(target).into());
    }
    let z = two_sided_z(confidence)?;

    let points: Vec<CurvePoint> = results
        .iter()
        .filter_map(|r| match r.estimate {
            Some(rate) => Some(CurvePoint {
                sample_size: r.sample_size as f64,
                rate,
                weight: r.valid as f64,
            }),
            None => {
                tracing::warn!(sample_size = r.sample_size, "skipping undefined point");
                None
            }
        })
        .collect();

    let fit = fit_logistic(&points)?;
    let (b_0, b_1) = (fit.intercept, fit.slope);
    let span = points
        .iter()
        .map(|p| p.sample_size)
        .fold(f64::NEG_INFINITY, f64::max)
        - points
            .iter()
            .map(|p| p.sample_size)
            .fold(f64::INFINITY, f64::min);
    if !(b_1 > 0.0 && b_1 * span >= MIN_LOGIT_CHANGE) {
        return Err(CurveFitError::NonIncreasingSlope {
            intercept: b_0,
            slope: b_1,
        }
        .into());
    }

    //----------------------------------------
    // Invert: n = (logit(target) - b_0) / b_1
    let target_logit = logit(target);
    let estimate = (target_logit - b_0) / b_1;
    if !(estimate > 0.0) {
        return Err(CurveFitError::NonPositiveSolution {
            estimate,
            intercept: b_0,
            slope: b_1,
        }
        .into());
    }

    // Gradient of n with respect to (b_0, b_1)
    let grad = [-1.0 / b_1, -(target_logit - b_0) / (b_1 * b_1)];
    let cov = fit.covariance;
    let variance = grad[0] * grad[0] * cov[0][0]
        + 2.0 * grad[0] * grad[1] * cov[0][1]
        + grad[1] * grad[1] * cov[1][1];
    let std_err = variance.max(0.0).sqrt();

    Ok(RequiredSampleSize {
        target,
        estimate,
        std_err,
        lower: estimate - z * std_err,
        upper: estimate + z * std_err,
        confidence,
        fit,
        points_used: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::types::expit;

    fn point(n: usize, rate: Option<f64>, valid: usize) -> AggregateResult {
        AggregateResult {
            sample_size: n,
            estimate: rate,
            lower: rate,
            upper: rate,
            confidence: 0.95,
            successes: rate.map(|r| (r * valid as f64).round() as usize).unwrap_or(0),
            valid,
            failures: 0,
        }
    }

    fn exact_curve(intercept: f64, slope: f64) -> Vec<AggregateResult> {
        [50, 100, 150, 200, 250]
            .iter()
            .map(|&n| point(n, Some(expit(intercept + slope * n as f64)), 1_000))
            .collect()
    }

    #[test]
    fn recovers_known_required_n() {
        let res = fit_required_n(&exact_curve(-3.0, 0.03), 0.8, 0.95).unwrap();
        let truth = (logit(0.8) + 3.0) / 0.03;
        assert!((res.estimate - truth).abs() < 1e-6);
        assert!(res.std_err < 1e-6);
        assert!(res.lower <= res.estimate && res.estimate <= res.upper);
        assert_eq!(res.points_used, 5);
    }

    #[test]
    fn noisy_interval_is_symmetric() {
        let mut points = exact_curve(-3.0, 0.03);
        points[1].estimate = points[1].estimate.map(|r| r + 0.04);
        points[3].estimate = points[3].estimate.map(|r| r - 0.03);
        let res = fit_required_n(&points, 0.8, 0.95).unwrap();
        assert!(res.std_err > 0.0);
        assert!(((res.upper - res.estimate) - (res.estimate - res.lower)).abs() < 1e-9);
        assert!((res.estimate - 146.2).abs() < 25.0);
    }

    #[test]
    fn undefined_points_skipped() {
        let mut points = exact_curve(-3.0, 0.03);
        points.push(point(300, None, 0));
        let res = fit_required_n(&points, 0.8, 0.95).unwrap();
        assert_eq!(res.points_used, 5);
    }

    #[test]
    fn decreasing_curve_fails_loudly() {
        let res = fit_required_n(&exact_curve(3.0, -0.03), 0.8, 0.95);
        match res {
            Err(CtbayesErr::CurveFit(CurveFitError::NonIncreasingSlope { intercept, slope })) => {
                assert!((intercept - 3.0).abs() < 1e-6);
                assert!(slope < 0.0);
            }
            other => panic!("expected slope error, got {other:?}"),
        }
    }

    #[test]
    fn flat_curve_fails_loudly() {
        let points: Vec<AggregateResult> = [50, 100, 150]
            .iter()
            .map(|&n| point(n, Some(0.5), 500))
            .collect();
        assert!(matches!(
            fit_required_n(&points, 0.8, 0.95),
            Err(CtbayesErr::CurveFit(CurveFitError::NonIncreasingSlope { .. }))
        ));
    }

    #[test]
    fn flat_curve_off_half_fails_loudly() {
        for rate in [0.42, 0.3, 0.87] {
            let points: Vec<AggregateResult> = [50, 100, 150, 200]
                .iter()
                .map(|&n| point(n, Some(rate), 500))
                .collect();
            let res = fit_required_n(&points, 0.9, 0.95);
            assert!(
                matches!(
                    res,
                    Err(CtbayesErr::CurveFit(CurveFitError::NonIncreasingSlope { .. }))
                ),
                "rate {rate}: {res:?}"
            );
        }
    }

    #[test]
    fn target_below_curve_has_no_positive_solution() {
        // Rate at n = 0 is already expit(1) = 0.73
        let res = fit_required_n(&exact_curve(1.0, 0.01), 0.5, 0.95);
        assert!(matches!(
            res,
            Err(CtbayesErr::CurveFit(CurveFitError::NonPositiveSolution { .. }))
        ));
    }

    #[test]
    fn bad_target() {
        assert!(fit_required_n(&exact_curve(-3.0, 0.03), 1.0, 0.95).is_err());
    }
}

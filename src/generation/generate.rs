use itertools::izip;
use rand::{
    Rng,
    distributions::{Bernoulli, Distribution, Open01},
};
use statrs::distribution::Normal;

use crate::config::error::ConfigError;
use crate::config::{EffectConfig, EndpointSpec, GeneratorSettings, N_ENDPOINTS, OutcomeSpec};
use crate::error::CtbayesErr;
use crate::generation::error::GenerationError;
use crate::generation::natural_change::natural_change;
use crate::generation::types::TrialDataset;
use crate::util::seeds::SeedStreams;
use crate::util::std_normal::{std_normal_cdf, std_normal_quantile};

// Stream indices into the per-dataset seed set
const BASELINE_STREAM: usize = 0;
const ASSIGNMENT_STREAM: usize = 1;
const CHANGE_STREAM: usize = 2;
const RESIDUAL_STREAM: usize = 3;

/// Fails fast on configurations that would otherwise yield NaNs downstream
pub fn validate_effect(effect: &EffectConfig) -> Result<(), CtbayesErr> {
    if effect.effect.iter().any(|e| !e.is_finite()) {
        return Err(GenerationError::NonFiniteEffect(effect.effect).into());
    }
    let [sd_1, sd_2] = effect.residual_sd;
    let rho = effect.correlation;
    let sds_ok = sd_1.is_finite() && sd_2.is_finite() && sd_1 >= 0.0 && sd_2 >= 0.0;
    if !sds_ok || !rho.is_finite() || rho.abs() > 1.0 {
        return Err(GenerationError::NotPositiveSemiDefinite {
            sd_1,
            sd_2,
            correlation: rho,
        }
        .into());
    }
    Ok(())
}

/// Draws one synthetic trial of `n` subjects.
///
/// Every random quantity is drawn subject by subject from its own stream, so
/// two datasets generated from the same seed with sizes n1 < n2 agree on
/// their first n1 subjects.
pub fn generate(
    n: usize,
    outcomes: &OutcomeSpec,
    effect: &EffectConfig,
    settings: &GeneratorSettings,
    seed: u64,
) -> Result<TrialDataset, CtbayesErr> {
    //----------------------------------------
    // Check arguments
    if n < 1 {
        return Err(GenerationError::EmptySample.into());
    }
    outcomes.validate()?;
    settings.validate()?;
    validate_effect(effect)?;

    //----------------------------------------
    // Set up rngs/distributions
    let streams = SeedStreams::<4>::new(seed);
    let mut baseline_rng = streams.rng(BASELINE_STREAM);
    let mut assignment_rng = streams.rng(ASSIGNMENT_STREAM);
    let mut change_rng = streams.rng(CHANGE_STREAM);
    let mut residual_rng = streams.rng(RESIDUAL_STREAM);

    let std_normal = Normal::new(0.0, 1.0).map_err(|e| GenerationError::Distribution(e.to_string()))?;
    let assignment = Bernoulli::new(settings.allocation)
        .map_err(|_| ConfigError::BadAllocation(settings.allocation))?;

    let [sd_1, sd_2] = effect.residual_sd;
    let rho = effect.correlation;
    let rho_complement = (1.0 - rho * rho).max(0.0).sqrt();

    let mut treatment = Vec::with_capacity(n);
    let mut baseline: [Vec<f64>; N_ENDPOINTS] = [Vec::with_capacity(n), Vec::with_capacity(n)];
    let mut followup: [Vec<f64>; N_ENDPOINTS] = [Vec::with_capacity(n), Vec::with_capacity(n)];

    //----------------------------------------
    // Simulate subjects
    for _ in 0..n {
        let b = [
            truncated_baseline(&outcomes.endpoints[0], baseline_rng.sample(Open01))?,
            truncated_baseline(&outcomes.endpoints[1], baseline_rng.sample(Open01))?,
        ];

        let a: u8 = if assignment.sample(&mut assignment_rng) { 1 } else { 0 };

        // Always draw the change terms so streams stay aligned across settings
        let change_draws: [(f64, f64); N_ENDPOINTS] = [
            (change_rng.sample(Open01), std_normal.sample(&mut change_rng)),
            (change_rng.sample(Open01), std_normal.sample(&mut change_rng)),
        ];

        // Correlated residuals via the 2x2 Cholesky factor
        let z_1 = std_normal.sample(&mut residual_rng);
        let z_2 = std_normal.sample(&mut residual_rng);
        let residual = [sd_1 * z_1, sd_2 * (rho * z_1 + rho_complement * z_2)];

        for (k, endpoint, (u, eps), e, delta) in izip!(
            0..N_ENDPOINTS,
            outcomes.endpoints.iter(),
            change_draws,
            residual,
            effect.effect
        ) {
            let change = match &settings.natural_change {
                Some(params) => natural_change(
                    b[k],
                    endpoint.baseline_center(),
                    endpoint.sd,
                    params,
                    u,
                    eps,
                ),
                None => 0.0,
            };
            let expected = b[k] + change + delta * f64::from(a);
            let y = (expected + e).clamp(endpoint.lower, endpoint.upper);
            baseline[k].push(b[k]);
            followup[k].push(y);
        }
        treatment.push(a);
    }

    Ok(TrialDataset {
        n,
        treatment,
        baseline,
        followup,
    })
}

/// Inverse-CDF draw from N(center, sd) restricted to [lower, upper]
fn truncated_baseline(endpoint: &EndpointSpec, u: f64) -> Result<f64, CtbayesErr> {
    let center = endpoint.baseline_center();
    let p_lower = std_normal_cdf((endpoint.lower - center) / endpoint.sd);
    let p_upper = std_normal_cdf((endpoint.upper - center) / endpoint.sd);
    if p_upper - p_lower <= f64::EPSILON {
        // Range sits entirely in one tail; all mass piles onto the nearer bound
        return Ok(center.clamp(endpoint.lower, endpoint.upper));
    }
    let p = (p_lower + u * (p_upper - p_lower)).clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);
    let x = center + endpoint.sd * std_normal_quantile(p)?;
    Ok(x.clamp(endpoint.lower, endpoint.upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_settings() -> GeneratorSettings {
        GeneratorSettings {
            allocation: 2. / 3.,
            natural_change: None,
        }
    }

    #[test]
    fn vectors_have_length_n() {
        let data = generate(
            37,
            &OutcomeSpec::default(),
            &EffectConfig::default(),
            &GeneratorSettings::default(),
            24601,
        )
        .expect("failed to generate dataset");
        assert_eq!(data.n, 37);
        assert_eq!(data.treatment.len(), 37);
        for k in 0..N_ENDPOINTS {
            assert_eq!(data.baseline[k].len(), 37);
            assert_eq!(data.followup[k].len(), 37);
        }
    }

    #[test]
    fn values_within_bounds() {
        // Large effect and residual SD push many values past the bounds
        let effect = EffectConfig {
            effect: [-40.0, 25.0],
            residual_sd: [30.0, 20.0],
            correlation: -0.6,
        };
        let outcomes = OutcomeSpec::default();
        let data = generate(2_000, &outcomes, &effect, &GeneratorSettings::default(), 11)
            .expect("failed to generate dataset");
        for (k, endpoint) in outcomes.endpoints.iter().enumerate() {
            assert!(
                data.baseline[k]
                    .iter()
                    .chain(data.followup[k].iter())
                    .all(|&v| v >= endpoint.lower && v <= endpoint.upper)
            );
        }
        assert!(data.treatment.iter().all(|&a| a == 0 || a == 1));
    }

    #[test]
    fn allocation_converges() {
        let data = generate(
            10_000,
            &OutcomeSpec::default(),
            &EffectConfig::default(),
            &GeneratorSettings::default(),
            99,
        )
        .expect("failed to generate dataset");
        assert!((data.allocation_proportion() - 2. / 3.).abs() < 0.01);
    }

    #[test]
    fn noiseless_followup_is_baseline_plus_effect() {
        // Baselines within a few units of the centre, far from the bounds,
        // so no follow-up value can be clamped
        let mut outcomes = OutcomeSpec::default();
        for endpoint in outcomes.endpoints.iter_mut() {
            endpoint.sd = 1.0;
        }
        let effect = EffectConfig {
            effect: [-3.0, 1.5],
            residual_sd: [0.0, 0.0],
            correlation: 0.0,
        };
        let data = generate(120, &outcomes, &effect, &quiet_settings(), 5)
            .expect("failed to generate dataset");
        assert!(data.n_treated() > 0 && data.n_control() > 0);
        for (k, endpoint) in outcomes.endpoints.iter().enumerate() {
            for i in 0..data.n {
                let b = data.baseline[k][i];
                assert!(b - endpoint.lower > 10.0 && endpoint.upper - b > 10.0);
                assert_eq!(
                    data.followup[k][i],
                    b + effect.effect[k] * f64::from(data.treatment[i])
                );
            }
        }
    }

    #[test]
    fn cumulative_regeneration_shares_prefix() {
        let outcomes = OutcomeSpec::default();
        let effect = EffectConfig::default();
        let settings = GeneratorSettings::default();
        let small = generate(40, &outcomes, &effect, &settings, 8).unwrap();
        let large = generate(100, &outcomes, &effect, &settings, 8).unwrap();
        assert_eq!(small.treatment[..], large.treatment[..40]);
        assert_eq!(small.followup[1][..], large.followup[1][..40]);
    }

    #[test]
    fn zero_sample_size_error() {
        let res = generate(
            0,
            &OutcomeSpec::default(),
            &EffectConfig::default(),
            &GeneratorSettings::default(),
            1,
        );
        if let Err(e) = res {
            assert_eq!(
                String::from("while generating trial data: sample size must be at least 1"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn bad_correlation_fails_fast() {
        let effect = EffectConfig {
            correlation: 1.2,
            ..EffectConfig::default()
        };
        let res = generate(
            10,
            &OutcomeSpec::default(),
            &effect,
            &GeneratorSettings::default(),
            1,
        );
        assert!(matches!(
            res,
            Err(CtbayesErr::Generation(
                GenerationError::NotPositiveSemiDefinite { .. }
            ))
        ));
    }

    #[test]
    fn negative_sd_fails_fast() {
        let effect = EffectConfig {
            residual_sd: [-1.0, 2.0],
            ..EffectConfig::default()
        };
        assert!(validate_effect(&effect).is_err());
    }

    #[test]
    fn correlated_residuals() {
        let outcomes = OutcomeSpec::default();
        let effect = EffectConfig {
            effect: [0.0, 0.0],
            residual_sd: [5.0, 5.0],
            correlation: 0.8,
        };
        let data = generate(5_000, &outcomes, &effect, &quiet_settings(), 3).unwrap();
        let d: [Vec<f64>; 2] = [0_usize, 1].map(|k| {
            data.followup[k]
                .iter()
                .zip(data.baseline[k].iter())
                .map(|(y, b)| y - b)
                .collect()
        });
        let mean = |v: &Vec<f64>| v.iter().sum::<f64>() / v.len() as f64;
        let (m0, m1) = (mean(&d[0]), mean(&d[1]));
        let cov: f64 = d[0].iter().zip(d[1].iter()).map(|(a, b)| (a - m0) * (b - m1)).sum();
        let v0: f64 = d[0].iter().map(|a| (a - m0).powi(2)).sum();
        let v1: f64 = d[1].iter().map(|b| (b - m1).powi(2)).sum();
        let r = cov / (v0 * v1).sqrt();
        assert!((r - 0.8).abs() < 0.05);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn outcomes_stay_in_range(
                n in 1_usize..200,
                d_0 in -60.0_f64..60.0,
                d_1 in -40.0_f64..40.0,
                sd_0 in 0.0_f64..40.0,
                sd_1 in 0.0_f64..40.0,
                rho in -1.0_f64..=1.0,
                seed in any::<u64>(),
            ) {
                let outcomes = OutcomeSpec::default();
                let effect = EffectConfig {
                    effect: [d_0, d_1],
                    residual_sd: [sd_0, sd_1],
                    correlation: rho,
                };
                let data = generate(n, &outcomes, &effect, &GeneratorSettings::default(), seed)
                    .unwrap();
                for (k, endpoint) in outcomes.endpoints.iter().enumerate() {
                    for (b, y) in data.baseline[k].iter().zip(&data.followup[k]) {
                        prop_assert!((endpoint.lower..=endpoint.upper).contains(b));
                        prop_assert!((endpoint.lower..=endpoint.upper).contains(y));
                    }
                }
            }
        }
    }
}

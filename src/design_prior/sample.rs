use rand::{SeedableRng, distributions::Distribution, rngs::StdRng};
use statrs::distribution::{Normal, StudentsT, Uniform};

use crate::config::{EffectConfig, N_ENDPOINTS};
use crate::design_prior::error::DesignPriorError;
use crate::design_prior::types::{DesignPrior, EffectPrior};
use crate::error::CtbayesErr;
use crate::util::seeds::replicate_seed;

/// `count` independent draws from `prior`
pub fn sample(prior: &DesignPrior, count: usize, seed: u64) -> Result<Vec<f64>, CtbayesErr> {
    prior.validate()?;
    let rng = StdRng::seed_from_u64(seed);
    let draws: Vec<f64> = match *prior {
        DesignPrior::Normal { mean, sd } => Normal::new(mean, sd)
            .map_err(|e| DesignPriorError::Distribution(e.to_string()))?
            .sample_iter(rng)
            .take(count)
            .collect(),
        DesignPrior::StudentT {
            location,
            scale,
            df,
        } => StudentsT::new(location, scale, df)
            .map_err(|e| DesignPriorError::Distribution(e.to_string()))?
            .sample_iter(rng)
            .take(count)
            .collect(),
        DesignPrior::Uniform { lower, upper } => Uniform::new(lower, upper)
            .map_err(|e| DesignPriorError::Distribution(e.to_string()))?
            .sample_iter(rng)
            .take(count)
            .collect(),
    };
    Ok(draws)
}

/// Normal summary of two endpoint priors: the mean of the two means, with
/// variance a quarter of the summed variances (endpoints independent)
pub fn combine_endpoints(a: &DesignPrior, b: &DesignPrior) -> Result<DesignPrior, CtbayesErr> {
    let mean = (a.mean()? + b.mean()?) / 2.0;
    let variance = (a.variance()? + b.variance()?) / 4.0;
    Ok(DesignPrior::Normal {
        mean,
        sd: variance.sqrt(),
    })
}

impl EffectPrior {
    pub fn validate(&self) -> Result<(), CtbayesErr> {
        match self {
            EffectPrior::PerEndpoint(priors) | EffectPrior::Combined(priors) => {
                priors.iter().try_for_each(|p| p.validate())
            }
            EffectPrior::Shared(prior) => prior.validate(),
        }
    }

    /// Summary prior on the scalar combined effect
    pub fn combined(&self) -> Result<DesignPrior, CtbayesErr> {
        match self {
            EffectPrior::PerEndpoint([a, b]) | EffectPrior::Combined([a, b]) => {
                combine_endpoints(a, b)
            }
            EffectPrior::Shared(prior) => {
                prior.validate()?;
                Ok(*prior)
            }
        }
    }

    /// One effect configuration per replicate, each owning its own copy of
    /// the residual structure from `base`
    pub fn draw_effects(
        &self,
        base: &EffectConfig,
        count: usize,
        seed: u64,
    ) -> Result<Vec<EffectConfig>, CtbayesErr> {
        match self {
            EffectPrior::PerEndpoint(priors) => {
                let per_endpoint: Vec<Vec<f64>> = priors
                    .iter()
                    .enumerate()
                    .map(|(k, prior)| sample(prior, count, replicate_seed(seed, k as u64)))
                    .collect::<Result<_, _>>()?;
                Ok((0..count)
                    .map(|i| base.with_effect([per_endpoint[0][i], per_endpoint[1][i]]))
                    .collect())
            }
            EffectPrior::Shared(_) | EffectPrior::Combined(_) => {
                let standardized = sample(&self.combined()?, count, seed)?;
                Ok(standardized
                    .into_iter()
                    .map(|d| {
                        let effect: [f64; N_ENDPOINTS] =
                            [0_usize, 1].map(|k| d * base.residual_sd[k]);
                        base.with_effect(effect)
                    })
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_sd(v: &[f64]) -> (f64, f64) {
        let m = v.iter().sum::<f64>() / v.len() as f64;
        let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
        (m, var.sqrt())
    }

    #[test]
    fn normal_draws() {
        let draws = sample(&DesignPrior::Normal { mean: -4.0, sd: 2.0 }, 20_000, 1).unwrap();
        assert_eq!(draws.len(), 20_000);
        let (m, sd) = mean_sd(&draws);
        assert!((m - -4.0).abs() < 0.05);
        assert!((sd - 2.0).abs() < 0.05);
    }

    #[test]
    fn student_t_draws() {
        let prior = DesignPrior::StudentT {
            location: -2.0,
            scale: 1.0,
            df: 10.0,
        };
        let draws = sample(&prior, 20_000, 2).unwrap();
        let (m, sd) = mean_sd(&draws);
        assert!((m - -2.0).abs() < 0.05);
        assert!((sd - (10.0_f64 / 8.0).sqrt()).abs() < 0.05);
    }

    #[test]
    fn uniform_draws_in_range() {
        let prior = DesignPrior::Uniform {
            lower: -6.0,
            upper: -1.0,
        };
        let draws = sample(&prior, 5_000, 3).unwrap();
        assert!(draws.iter().all(|&d| (-6.0..=-1.0).contains(&d)));
    }

    #[test]
    fn same_seed_same_draws() {
        let prior = DesignPrior::Normal { mean: 0.0, sd: 1.0 };
        assert_eq!(sample(&prior, 10, 9).unwrap(), sample(&prior, 10, 9).unwrap());
    }

    #[test]
    fn combination_rule() {
        let a = DesignPrior::Normal { mean: -8.0, sd: 3.0 };
        let b = DesignPrior::Normal { mean: -4.0, sd: 4.0 };
        match combine_endpoints(&a, &b).unwrap() {
            DesignPrior::Normal { mean, sd } => {
                assert_eq!(mean, -6.0);
                // (9 + 16) / 4 = 6.25
                assert!((sd - 2.5).abs() < 1e-12);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn shared_draws_scale_by_residual_sd() {
        let base = EffectConfig {
            effect: [0.0, 0.0],
            residual_sd: [10.0, 2.0],
            correlation: 0.2,
        };
        let prior = EffectPrior::Shared(DesignPrior::Normal { mean: -0.5, sd: 0.1 });
        let effects = prior.draw_effects(&base, 50, 4).unwrap();
        assert_eq!(effects.len(), 50);
        for e in effects {
            assert!((e.effect[0] / 10.0 - e.effect[1] / 2.0).abs() < 1e-12);
            assert_eq!(e.residual_sd, base.residual_sd);
        }
    }

    #[test]
    fn combined_draws_follow_pooled_prior() {
        let base = EffectConfig {
            effect: [0.0, 0.0],
            residual_sd: [12.0, 6.0],
            correlation: 0.4,
        };
        let a = DesignPrior::Normal { mean: -0.8, sd: 0.3 };
        let b = DesignPrior::Normal { mean: -0.4, sd: 0.4 };
        let combined = EffectPrior::Combined([a, b]);
        let effects = combined.draw_effects(&base, 20_000, 5).unwrap();
        let standardized: Vec<f64> = effects.iter().map(|e| e.effect[0] / 12.0).collect();
        let (m, sd) = mean_sd(&standardized);
        // Pooled prior: mean -0.6, sd sqrt((0.09 + 0.16) / 4) = 0.25
        assert!((m - -0.6).abs() < 0.01);
        assert!((sd - 0.25).abs() < 0.01);
        for e in &effects {
            assert!((e.effect[0] / 12.0 - e.effect[1] / 6.0).abs() < 1e-12);
        }
        // Same draws as sharing the pooled prior directly
        let shared = EffectPrior::Shared(combine_endpoints(&a, &b).unwrap());
        assert_eq!(shared.draw_effects(&base, 20_000, 5).unwrap(), effects);
    }

    #[test]
    fn per_endpoint_draws_are_independent_streams() {
        let base = EffectConfig::default();
        let same = DesignPrior::Normal { mean: 0.0, sd: 1.0 };
        let prior = EffectPrior::PerEndpoint([same, same]);
        let effects = prior.draw_effects(&base, 5, 11).unwrap();
        assert!(effects.iter().any(|e| e.effect[0] != e.effect[1]));
    }
}

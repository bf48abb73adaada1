//! Per-endpoint Bayesian ANCOVA under a flat prior.
//!
//! For each endpoint the model is `followup ~ 1 + baseline + treatment`. With
//! a flat prior on the coefficients and on `log(sigma)`, the marginal posterior
//! of the treatment coefficient is a Student-t with `n - 3` degrees of freedom
//! centred on the least-squares estimate, scaled by its standard error.
//! Joint draws use a bivariate t whose correlation is the residual
//! correlation between the two endpoint regressions.
use itertools::izip;
use nalgebra::{Matrix3, Vector3};
use rand::{SeedableRng, distributions::Distribution, rngs::StdRng};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

use crate::config::N_ENDPOINTS;
use crate::generation::TrialDataset;
use crate::inference::engine::InferenceEngine;
use crate::inference::types::{EngineFailure, ModelConfig, PosteriorSummary};

const N_COEFFICIENTS: usize = 3;
// Relative residual variance below this counts as an exact fit
const VARIANCE_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct AncovaEngine;

/// Least-squares fit of one endpoint
struct EndpointFit {
    effect: f64,
    std_err: f64,
    residuals: Vec<f64>,
}

impl AncovaEngine {
    fn fit_endpoint(dataset: &TrialDataset, k: usize) -> Result<EndpointFit, EngineFailure> {
        let mut xtx = Matrix3::<f64>::zeros();
        let mut xty = Vector3::<f64>::zeros();
        for (&b, &y, &a) in izip!(&dataset.baseline[k], &dataset.followup[k], &dataset.treatment)
        {
            let x = Vector3::new(1.0, b, f64::from(a));
            xtx += x * x.transpose();
            xty += x * y;
        }

        let chol = xtx
            .cholesky()
            .ok_or(EngineFailure::SingularDesign { endpoint: k })?;
        let beta = chol.solve(&xty);
        let xtx_inv = chol.inverse();

        let residuals: Vec<f64> = izip!(&dataset.baseline[k], &dataset.followup[k], &dataset.treatment)
            .map(|(&b, &y, &a)| y - (beta[0] + beta[1] * b + beta[2] * f64::from(a)))
            .collect();
        let df = (dataset.n - N_COEFFICIENTS) as f64;
        let ssr: f64 = residuals.iter().map(|r| r * r).sum();
        let sst: f64 = {
            let mean = dataset.followup[k].iter().sum::<f64>() / dataset.n as f64;
            dataset.followup[k].iter().map(|y| (y - mean).powi(2)).sum()
        };
        if ssr <= VARIANCE_FLOOR * sst.max(1.0) {
            return Err(EngineFailure::ZeroVariance { endpoint: k });
        }
        let sigma_sq = ssr / df;
        let std_err = (sigma_sq * xtx_inv[(2, 2)]).sqrt();
        if !std_err.is_finite() || std_err <= 0.0 {
            return Err(EngineFailure::SingularDesign { endpoint: k });
        }
        Ok(EndpointFit {
            effect: beta[2],
            std_err,
            residuals,
        })
    }
}

impl InferenceEngine for AncovaEngine {
    fn name(&self) -> &str {
        "ancova-flat-prior"
    }

    fn fit(
        &self,
        dataset: &TrialDataset,
        model: &ModelConfig,
        seed: u64,
    ) -> Result<PosteriorSummary, EngineFailure> {
        //----------------------------------------
        // Check data
        if model.draws == 0 {
            return Err(EngineFailure::Configuration(String::from(
                "at least one posterior draw is required",
            )));
        }
        let min_n = N_COEFFICIENTS + model.min_residual_df.max(1);
        if dataset.n < min_n {
            return Err(EngineFailure::InsufficientData { n: dataset.n });
        }
        if dataset.n_treated() == 0 || dataset.n_control() == 0 {
            return Err(EngineFailure::EmptyArm);
        }

        //----------------------------------------
        // Fit each endpoint
        let fits = [
            Self::fit_endpoint(dataset, 0)?,
            Self::fit_endpoint(dataset, 1)?,
        ];
        let df = (dataset.n - N_COEFFICIENTS) as f64;

        let prob_below_zero = [0_usize, 1].map(|k| {
            StudentsT::new(fits[k].effect, fits[k].std_err, df)
                .map(|t| t.cdf(0.0))
                .unwrap_or(f64::NAN)
        });
        if prob_below_zero.iter().any(|p| p.is_nan()) {
            return Err(EngineFailure::NonConvergence(String::from(
                "posterior for treatment effect is undefined",
            )));
        }

        //----------------------------------------
        // Joint draws
        let rho = {
            let cross: f64 = fits[0]
                .residuals
                .iter()
                .zip(fits[1].residuals.iter())
                .map(|(r_0, r_1)| r_0 * r_1)
                .sum();
            let ss = |r: &Vec<f64>| r.iter().map(|x| x * x).sum::<f64>();
            (cross / (ss(&fits[0].residuals) * ss(&fits[1].residuals)).sqrt()).clamp(-1.0, 1.0)
        };
        let rho_complement = (1.0 - rho * rho).sqrt();

        let std_normal = Normal::new(0.0, 1.0)
            .map_err(|e| EngineFailure::Configuration(e.to_string()))?;
        let chi_sq =
            ChiSquared::new(df).map_err(|e| EngineFailure::Configuration(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut draws: [Vec<f64>; N_ENDPOINTS] =
            [Vec::with_capacity(model.draws), Vec::with_capacity(model.draws)];
        for _ in 0..model.draws {
            let z_0 = std_normal.sample(&mut rng);
            let z_1 = rho * z_0 + rho_complement * std_normal.sample(&mut rng);
            let scale = (chi_sq.sample(&mut rng) / df).sqrt();
            draws[0].push(fits[0].effect + fits[0].std_err * z_0 / scale);
            draws[1].push(fits[1].effect + fits[1].std_err * z_1 / scale);
        }
        let joint_hits = draws[0]
            .iter()
            .zip(draws[1].iter())
            .filter(|&(&d_0, &d_1)| d_0 < 0.0 && d_1 < 0.0)
            .count();

        Ok(PosteriorSummary {
            prob_below_zero,
            joint_below_zero: joint_hits as f64 / model.draws as f64,
            draws,
        })
    }
}

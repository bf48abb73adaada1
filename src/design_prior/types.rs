//----------------------------------------
// design prior mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::config::N_ENDPOINTS;
use crate::design_prior::error::DesignPriorError;
use crate::error::CtbayesErr;

/// Uncertainty about one scalar true effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DesignPrior {
    Normal { mean: f64, sd: f64 },
    /// Location-scale Student-t
    StudentT { location: f64, scale: f64, df: f64 },
    Uniform { lower: f64, upper: f64 },
}

impl DesignPrior {
    pub fn family(&self) -> &'static str {
        match self {
            DesignPrior::Normal { .. } => "normal",
            DesignPrior::StudentT { .. } => "student-t",
            DesignPrior::Uniform { .. } => "uniform",
        }
    }

    pub fn validate(&self) -> Result<(), CtbayesErr> {
        let bad = |reason: String| -> CtbayesErr {
            DesignPriorError::BadParameter {
                family: self.family(),
                reason,
            }
            .into()
        };
        match *self {
            DesignPrior::Normal { mean, sd } => {
                if !mean.is_finite() || !(sd > 0.0) || !sd.is_finite() {
                    return Err(bad(format!("need finite mean and sd > 0; got mean {mean}, sd {sd}")));
                }
            }
            DesignPrior::StudentT {
                location,
                scale,
                df,
            } => {
                if !location.is_finite() || !(scale > 0.0) || !(df > 0.0) {
                    return Err(bad(format!(
                        "need finite location, scale > 0 and df > 0; got {location}, {scale}, {df}"
                    )));
                }
            }
            DesignPrior::Uniform { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() || !(lower < upper) {
                    return Err(bad(format!("need finite lower < upper; got [{lower}, {upper}]")));
                }
            }
        }
        Ok(())
    }

    pub fn mean(&self) -> Result<f64, CtbayesErr> {
        self.validate()?;
        match *self {
            DesignPrior::Normal { mean, .. } => Ok(mean),
            DesignPrior::StudentT { location, df, .. } => {
                if df > 1.0 {
                    Ok(location)
                } else {
                    Err(DesignPriorError::UndefinedMoment {
                        family: self.family(),
                        moment: "mean",
                    }
                    .into())
                }
            }
            DesignPrior::Uniform { lower, upper } => Ok((lower + upper) / 2.0),
        }
    }

    pub fn variance(&self) -> Result<f64, CtbayesErr> {
        self.validate()?;
        match *self {
            DesignPrior::Normal { sd, .. } => Ok(sd * sd),
            DesignPrior::StudentT { scale, df, .. } => {
                if df > 2.0 {
                    Ok(scale * scale * df / (df - 2.0))
                } else {
                    Err(DesignPriorError::UndefinedMoment {
                        family: self.family(),
                        moment: "variance",
                    }
                    .into())
                }
            }
            DesignPrior::Uniform { lower, upper } => Ok((upper - lower).powi(2) / 12.0),
        }
    }
}

/// How a design prior turns into the two endpoint effects of a replicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectPrior {
    /// Each endpoint draws its own effect, in its own units
    PerEndpoint([DesignPrior; N_ENDPOINTS]),
    /// One standardized draw per replicate, scaled by each endpoint's
    /// residual SD
    Shared(DesignPrior),
    /// Endpoint priors on the standardized scale (effect / residual SD),
    /// pooled by `combine_endpoints` into one normal prior. Each replicate
    /// draws once from the pooled prior and scales it like `Shared`.
    Combined([DesignPrior; N_ENDPOINTS]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moments() {
        let n = DesignPrior::Normal { mean: -5.0, sd: 2.0 };
        assert_eq!(n.mean().unwrap(), -5.0);
        assert_eq!(n.variance().unwrap(), 4.0);

        let t = DesignPrior::StudentT {
            location: -3.0,
            scale: 2.0,
            df: 4.0,
        };
        assert_eq!(t.mean().unwrap(), -3.0);
        assert!((t.variance().unwrap() - 8.0).abs() < 1e-12);

        let u = DesignPrior::Uniform {
            lower: -6.0,
            upper: 0.0,
        };
        assert_eq!(u.mean().unwrap(), -3.0);
        assert!((u.variance().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn heavy_tails_have_no_variance() {
        let t = DesignPrior::StudentT {
            location: 0.0,
            scale: 1.0,
            df: 2.0,
        };
        assert!(t.variance().is_err());
        assert!(t.mean().is_ok());
    }

    #[test]
    fn bad_uniform() {
        let u = DesignPrior::Uniform {
            lower: 1.0,
            upper: 1.0,
        };
        if let Err(e) = u.validate() {
            assert_eq!(
                String::from(
                    "while sampling design prior: bad uniform prior parameters: \
                     need finite lower < upper; got [1, 1]"
                ),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn serde_tagged() {
        let json = r#"{"family":"student_t","location":-2.0,"scale":1.5,"df":5.0}"#;
        let prior: DesignPrior = serde_json::from_str(json).unwrap();
        assert_eq!(
            prior,
            DesignPrior::StudentT {
                location: -2.0,
                scale: 1.5,
                df: 5.0
            }
        );
    }
}

//----------------------------------------
// config mod types
//----------------------------------------
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::error::CtbayesErr;

/// Number of co-primary endpoints
pub const N_ENDPOINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Population-level constants for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
    /// Minimal clinically important difference
    pub mcid: f64,
    pub lower: f64,
    pub upper: f64,
    pub direction: Direction,
    /// Shift of the enrolled population's baseline relative to `mean`
    pub baseline_adjustment: f64,
}

impl EndpointSpec {
    pub fn baseline_center(&self) -> f64 {
        self.mean + self.baseline_adjustment
    }

    pub fn validate(&self) -> Result<(), CtbayesErr> {
        let bad = |reason: String| -> CtbayesErr {
            ConfigError::BadEndpoint {
                name: self.name.clone(),
                reason,
            }
            .into()
        };
        if !(self.lower < self.upper) {
            return Err(bad(format!(
                "lower bound {} must be below upper bound {}",
                self.lower, self.upper
            )));
        }
        if !(self.sd > 0.0) || !self.sd.is_finite() {
            return Err(bad(format!("population SD must be positive; got {}", self.sd)));
        }
        if !self.mean.is_finite() || !self.baseline_adjustment.is_finite() {
            return Err(bad(String::from("mean and baseline adjustment must be finite")));
        }
        Ok(())
    }
}

/// Immutable outcome definitions shared read-only by every replicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub endpoints: [EndpointSpec; N_ENDPOINTS],
}

impl OutcomeSpec {
    pub fn validate(&self) -> Result<(), CtbayesErr> {
        self.endpoints.iter().try_for_each(|e| e.validate())
    }

    pub fn directions(&self) -> [Direction; N_ENDPOINTS] {
        [self.endpoints[0].direction, self.endpoints[1].direction]
    }
}

impl Default for OutcomeSpec {
    fn default() -> Self {
        OutcomeSpec {
            endpoints: [
                EndpointSpec {
                    name: String::from("symptom_severity"),
                    mean: 55.0,
                    sd: 15.0,
                    mcid: 8.0,
                    lower: 0.0,
                    upper: 100.0,
                    direction: Direction::LowerIsBetter,
                    baseline_adjustment: 5.0,
                },
                EndpointSpec {
                    name: String::from("functional_disability"),
                    mean: 24.0,
                    sd: 8.0,
                    mcid: 4.0,
                    lower: 0.0,
                    upper: 60.0,
                    direction: Direction::LowerIsBetter,
                    baseline_adjustment: 2.0,
                },
            ],
        }
    }
}

/// True treatment effects and residual structure for one run. Passed by
/// value/reference into every call that needs it; never stored globally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Signed treatment effect per endpoint (negative = benefit when lower is better)
    pub effect: [f64; N_ENDPOINTS],
    pub residual_sd: [f64; N_ENDPOINTS],
    pub correlation: f64,
}

impl EffectConfig {
    /// Same residual structure with every treatment effect set to zero
    pub fn null(&self) -> Self {
        EffectConfig {
            effect: [0.0; N_ENDPOINTS],
            ..*self
        }
    }

    pub fn with_effect(&self, effect: [f64; N_ENDPOINTS]) -> Self {
        EffectConfig { effect, ..*self }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            effect: [-8.0, -4.0],
            residual_sd: [12.0, 6.0],
            correlation: 0.4,
        }
    }
}

/// Regression-to-the-mean damping constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalChange {
    /// Largest change as a fraction of the baseline magnitude
    pub cap_fraction: f64,
    pub damping: f64,
}

impl Default for NaturalChange {
    fn default() -> Self {
        NaturalChange {
            cap_fraction: 0.2,
            damping: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Probability of randomization to treatment
    pub allocation: f64,
    /// `None` disables the natural-change term
    pub natural_change: Option<NaturalChange>,
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), CtbayesErr> {
        if !(self.allocation > 0.0 && self.allocation < 1.0) {
            return Err(ConfigError::BadAllocation(self.allocation).into());
        }
        if let Some(nc) = self.natural_change
            && (!(0.0..=1.0).contains(&nc.cap_fraction) || !(nc.damping > 0.0))
        {
            return Err(ConfigError::BadNaturalChange {
                cap_fraction: nc.cap_fraction,
                damping: nc.damping,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            allocation: 2. / 3.,
            natural_change: Some(NaturalChange::default()),
        }
    }
}

//----------------------------------------
// generation errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("sample size must be at least 1")]
    EmptySample,
    #[error(
        "residual covariance is not positive semi-definite (residual SDs {sd_1}, {sd_2}, \
        correlation {correlation})"
    )]
    NotPositiveSemiDefinite {
        sd_1: f64,
        sd_2: f64,
        correlation: f64,
    },
    #[error("treatment effects must be finite; got {0:?}")]
    NonFiniteEffect([f64; 2]),
    #[error("invalid sampling distribution: {0}")]
    Distribution(String),
}

impl From<GenerationError> for CtbayesErr {
    fn from(e: GenerationError) -> CtbayesErr {
        CtbayesErr::Generation(e)
    }
}

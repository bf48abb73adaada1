//----------------------------------------
// curve fitting errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurveFitError {
    #[error("target rate should be in (0, 1); got {0}")]
    BadTarget(f64),
    #[error("need at least two defined points at distinct sample sizes; got {usable}")]
    TooFewPoints { usable: usize },
    #[error(
        "fitted rate does not increase with sample size (intercept {intercept}, slope {slope})"
    )]
    NonIncreasingSlope { intercept: f64, slope: f64 },
    #[error(
        "required sample size {estimate} is not positive (intercept {intercept}, slope {slope})"
    )]
    NonPositiveSolution {
        estimate: f64,
        intercept: f64,
        slope: f64,
    },
    #[error("logistic fit did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error("weighted design matrix is singular")]
    Singular,
}

impl From<CurveFitError> for CtbayesErr {
    fn from(e: CurveFitError) -> CtbayesErr {
        CtbayesErr::CurveFit(e)
    }
}

//----------------------------------------
// calibration errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("search bounds should satisfy 0 <= lower < upper <= 1; got [{0}, {1}]")]
    BadBounds(f64, f64),
    #[error("target alpha should be in (0, 1); got {0}")]
    BadTarget(f64),
    #[error("tolerance must be positive; got {0}")]
    BadTolerance(f64),
    #[error("at least one iteration is required")]
    NoIterations,
    #[error("no iteration produced a valid rate estimate ({iterations} iterations)")]
    NoValidEstimates { iterations: usize },
}

impl From<CalibrationError> for CtbayesErr {
    fn from(e: CalibrationError) -> CtbayesErr {
        CtbayesErr::Calibration(e)
    }
}

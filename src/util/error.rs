//----------------------------------------
// util errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalDistErr {
    #[error("arguments to quantile function should be in (0, 1); got {0}")]
    QuantileOutOfBounds(f64),
    #[error("confidence level should be in (0, 1); got {0}")]
    BadConfidenceLevel(f64),
}

impl From<NormalDistErr> for CtbayesErr {
    fn from(e: NormalDistErr) -> CtbayesErr {
        CtbayesErr::NormalDist(e)
    }
}

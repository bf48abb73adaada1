//----------------------------------------
// design prior errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesignPriorError {
    #[error("bad {family} prior parameters: {reason}")]
    BadParameter {
        family: &'static str,
        reason: String,
    },
    #[error("{family} prior with these parameters has no finite {moment}")]
    UndefinedMoment {
        family: &'static str,
        moment: &'static str,
    },
    #[error("invalid sampling distribution: {0}")]
    Distribution(String),
}

impl From<DesignPriorError> for CtbayesErr {
    fn from(e: DesignPriorError) -> CtbayesErr {
        CtbayesErr::DesignPrior(e)
    }
}

//----------------------------------------
// sequential errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequentialError {
    #[error("look schedule is empty")]
    EmptySchedule,
    #[error("look schedule must be strictly ascending and positive; got {0:?}")]
    UnsortedSchedule(Vec<usize>),
    #[error(
        "thresholds should satisfy 0 <= futility < efficacy <= 1 and final in [0, 1]; \
         got futility {futility}, efficacy {efficacy}, final {final_threshold}"
    )]
    BadThresholds {
        futility: f64,
        efficacy: f64,
        final_threshold: f64,
    },
    #[error("at least one sequential run is required")]
    NoRuns,
    #[error("run stopped at N={0}, which is not in the look schedule")]
    OffSchedule(usize),
}

impl From<SequentialError> for CtbayesErr {
    fn from(e: SequentialError) -> CtbayesErr {
        CtbayesErr::Sequential(e)
    }
}

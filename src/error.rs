//----------------------------------------
// Crate error type
//----------------------------------------
use crate::aggregation::error::AggregationError;
use crate::calibration::error::CalibrationError;
use crate::config::error::ConfigError;
use crate::curve::error::CurveFitError;
use crate::design_prior::error::DesignPriorError;
use crate::generation::error::GenerationError;
use crate::sequential::error::SequentialError;
use crate::util::error::NormalDistErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtbayesErr {
    #[error("while reading configuration: {0}")]
    Config(ConfigError),
    #[error("while generating trial data: {0}")]
    Generation(GenerationError),
    #[error("while aggregating replicates: {0}")]
    Aggregation(AggregationError),
    #[error("while fitting sample size curve: {0}")]
    CurveFit(CurveFitError),
    #[error("while calibrating decision threshold: {0}")]
    Calibration(CalibrationError),
    #[error("while simulating sequential trial: {0}")]
    Sequential(SequentialError),
    #[error("while sampling design prior: {0}")]
    DesignPrior(DesignPriorError),
    #[error("while evaluating normal distribution: {0}")]
    NormalDist(NormalDistErr),
}

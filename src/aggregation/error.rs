//----------------------------------------
// aggregation errors
//----------------------------------------
use crate::error::CtbayesErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("replicate count must be at least 1")]
    NoReplicates,
    #[error("proportion interval needs at least one trial")]
    EmptyInterval,
    #[error("successes ({successes}) exceed trials ({trials})")]
    TooManySuccesses { successes: usize, trials: usize },
    #[error("decision threshold should be in [0, 1]; got {0}")]
    BadThreshold(f64),
    #[error("failed to build cache key: {0}")]
    CacheKey(#[from] serde_json::Error),
    #[error("cache directory {path} is unusable: {source}")]
    CacheDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

impl From<AggregationError> for CtbayesErr {
    fn from(e: AggregationError) -> CtbayesErr {
        CtbayesErr::Aggregation(e)
    }
}

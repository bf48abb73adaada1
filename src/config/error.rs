//----------------------------------------
// config errors
//----------------------------------------
use crate::error::CtbayesErr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("endpoint '{name}': {reason}")]
    BadEndpoint { name: String, reason: String },
    #[error("allocation probability should be in (0, 1); got {0}")]
    BadAllocation(f64),
    #[error("natural change cap fraction should be in [0, 1] and damping > 0; got cap {cap_fraction}, damping {damping}")]
    BadNaturalChange { cap_fraction: f64, damping: f64 },
    #[error("target rate should be in (0, 1); got {0}")]
    BadTarget(f64),
    #[error("thread count must be at least 1")]
    NoThreads,
}

impl From<ConfigError> for CtbayesErr {
    fn from(e: ConfigError) -> CtbayesErr {
        CtbayesErr::Config(e)
    }
}

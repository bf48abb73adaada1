//----------------------------------------
// design prior mod
//----------------------------------------
pub mod error;
pub mod sample;
pub mod types;

pub use sample::{combine_endpoints, sample};
pub use types::{DesignPrior, EffectPrior};

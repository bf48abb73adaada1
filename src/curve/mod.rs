//----------------------------------------
// curve mod
//----------------------------------------
pub mod error;
pub mod estimate_curve;
pub mod fit;
pub mod required_n;
pub mod types;

pub use estimate_curve::estimate_curve;
pub use fit::fit_logistic;
pub use required_n::fit_required_n;
pub use types::{CurveEstimate, CurvePoint, LogisticFit, RequiredSampleSize};

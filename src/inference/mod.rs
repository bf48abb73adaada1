//----------------------------------------
// inference mod
//----------------------------------------
pub mod ancova;
pub mod engine;
pub mod types;

pub use ancova::AncovaEngine;
pub use engine::{InferenceEngine, fit_guarded};
pub use types::{BenefitProbabilities, EngineFailure, ModelConfig, PosteriorSummary};

use std::panic::{self, AssertUnwindSafe};

use crate::generation::TrialDataset;
use crate::inference::types::{EngineFailure, ModelConfig, PosteriorSummary};

/// The posterior-sampling collaborator. Implementations may parallelize
/// internally; callers only rely on this signature.
pub trait InferenceEngine: Send + Sync {
    /// Stable identifier, used as part of cache keys
    fn name(&self) -> &str;

    fn fit(
        &self,
        dataset: &TrialDataset,
        model: &ModelConfig,
        seed: u64,
    ) -> Result<PosteriorSummary, EngineFailure>;
}

/// Runs `engine.fit`, turning a panic inside the engine into
/// `EngineFailure::Panicked` so one bad replicate cannot abort a batch
pub fn fit_guarded<E: InferenceEngine + ?Sized>(
    engine: &E,
    dataset: &TrialDataset,
    model: &ModelConfig,
    seed: u64,
) -> Result<PosteriorSummary, EngineFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| engine.fit(dataset, model, seed))) {
        Ok(res) => res,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                String::from(*s)
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                String::from("unknown panic payload")
            };
            Err(EngineFailure::Panicked(msg))
        }
    }
}

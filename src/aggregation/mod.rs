//----------------------------------------
// aggregation mod
//----------------------------------------
pub mod aggregate;
pub mod batch;
pub mod cache;
pub mod error;
pub mod types;
pub mod wilson;

pub use aggregate::aggregate;
pub use batch::{run_batch, run_batch_cached};
pub use cache::{BatchKey, JsonFileCache, MemoryCache, SimulationCache};
pub use types::{AggregateResult, BatchSettings, EffectSource, OutcomeCounts};
pub use wilson::wilson_interval;

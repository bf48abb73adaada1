//----------------------------------------
// sequential mod
//----------------------------------------
pub mod error;
pub mod simulate;
pub mod summary;
pub mod types;

pub use simulate::{run_sequential_batch, simulate_sequential};
pub use summary::summarize;
pub use types::{
    LookDecision, LookRecord, ReasonProbabilities, SequentialRun, SequentialSettings,
    SequentialSummary, StageRow, StopReason,
};

//----------------------------------------
// evaluation mod
//----------------------------------------
pub mod evaluate;
pub mod types;

pub use evaluate::{Evaluator, classify};
pub use types::{DecisionRule, ReplicateEvaluation, ReplicateOutcome};

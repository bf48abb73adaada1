//----------------------------------------
// generation mod
//----------------------------------------
pub mod error;
pub mod generate;
mod natural_change;
pub mod types;

pub use generate::generate;
pub use types::TrialDataset;

//----------------------------------------
// calibration mod
//----------------------------------------
pub mod calibrate;
pub mod error;
pub mod types;

pub use calibrate::calibrate;
pub use types::{CalibrationResult, CalibrationSettings, CalibrationStep};

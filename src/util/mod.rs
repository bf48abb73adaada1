//----------------------------------------
// util mod
//----------------------------------------
pub mod error;
pub mod seeds;
pub mod std_normal;

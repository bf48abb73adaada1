//----------------------------------------
// config mod
//----------------------------------------
pub mod error;
pub mod load;
pub mod types;

pub use types::{
    Direction, EffectConfig, EndpointSpec, GeneratorSettings, NaturalChange, OutcomeSpec,
    N_ENDPOINTS,
};
pub use load::{CurveSettings, SimulationConfig};

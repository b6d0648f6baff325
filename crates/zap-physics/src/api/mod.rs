// api/mod.rs
//
// Public surface shared by the library and its callers: ids, exported state
// records, and the simulation config.

pub mod config;
pub mod types;

pub use config::{SafetyConfig, SimConfig, SleepConfig};
pub use types::{BodyId, BodyState, JointId};

pub mod api;
pub mod collision;
pub mod core;
pub mod error;
pub mod forces;
pub mod joints;
pub mod sleeping;
pub mod tools;

// Re-export key types at crate root for convenience
pub use api::config::{SafetyConfig, SimConfig, SleepConfig};
pub use api::types::{BodyId, BodyState, JointId};
pub use collision::{Arbiter, ContactGeometry, ContactPoint, RayHit};
pub use core::body::Body;
pub use core::id_table::IdTable;
pub use core::shape::{Polygon, Shape, ShapeKind};
pub use core::time::FixedTimestep;
pub use core::world::World;
pub use error::PhysicsError;
pub use forces::{Effect, Explosion, Wind};
pub use joints::{Joint, JointDesc, JointKind};
pub use sleeping::{Connection, Link};
pub use tools::{RunningAverage, Statistics};

pub use glam::Vec2;

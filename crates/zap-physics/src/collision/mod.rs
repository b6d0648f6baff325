// collision/mod.rs
//
// Collision pipeline: sweep-and-prune pair tracking, exact narrowphase tests
// with time of impact, and the per-pair contact solver.

pub mod arbiter;
pub mod broadphase;
pub mod handler;
pub mod narrowphase;
pub mod pair;
pub mod raycast;

pub use arbiter::{Arbiter, ContactPoint};
pub use broadphase::Broadphase;
pub use handler::{collide, CollisionHandler};
pub use narrowphase::ContactGeometry;
pub use pair::{Pair, PairKey, PairStore};
pub use raycast::RayHit;

// sleeping/mod.rs
//
// Rest detection. Bodies are grouped through their connections every step,
// and whole groups are suspended once they have been still for a while.

pub mod connection;
pub mod grouping;
pub mod system;

pub use connection::{Connection, Link};
pub use grouping::CollisionGrouping;
pub use system::SleepingSystem;

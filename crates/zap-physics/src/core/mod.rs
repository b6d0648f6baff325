// core/mod.rs
//
// Bodies, their shapes, the id table that stores them, and the world that
// steps everything at a fixed rate.

pub mod body;
pub mod id_table;
pub mod shape;
pub mod time;
pub mod world;

pub use body::Body;
pub use id_table::IdTable;
pub use shape::{Polygon, Shape, ShapeKind};
pub use time::FixedTimestep;
pub use world::World;

// forces/mod.rs
//
// External forces applied at the start of every step, plus one-off effects.
// Forces go through the constant-force path: they never wake a body and
// have no effect on static ones.

pub mod air_friction;
pub mod effects;
pub mod gravity;
pub mod wind;

pub use effects::{Effect, Explosion};
pub use wind::Wind;

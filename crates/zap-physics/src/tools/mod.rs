// tools/mod.rs
//
// Helpers outside the simulation loop: scene factories and running
// statistics for headless runs.

pub mod factories;
pub mod stats;

pub use stats::{RunningAverage, Statistics};

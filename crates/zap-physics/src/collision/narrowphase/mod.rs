//! Exact shape-vs-shape tests with time of impact.
//!
//! Every routine reports the normal pointing from the first body towards the
//! second one.

mod circle_circle;
mod polygon_circle;
mod polygon_polygon;

pub use circle_circle::circle_circle;
pub use polygon_circle::polygon_circle;
pub use polygon_polygon::polygon_polygon;

use glam::Vec2;

/// Result of a narrowphase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// First contact point in world space.
    pub pos: Vec2,
    /// Second contact point, for edge-against-edge manifolds.
    pub pos2: Option<Vec2>,
    /// Unit normal from body 1 to body 2.
    pub normal: Vec2,
    /// Penetration depth. Positive means overlap.
    pub depth: f32,
    /// Time of impact within the step, 0 for shapes that already overlap.
    pub time: f32,
}

impl ContactGeometry {
    pub fn point_count(&self) -> usize {
        if self.pos2.is_some() {
            2
        } else {
            1
        }
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> {
        std::iter::once(self.pos).chain(self.pos2)
    }

    /// Same contact seen from the other body.
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

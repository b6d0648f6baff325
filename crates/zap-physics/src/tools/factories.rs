//! Shortcuts for building test and demo scenes.

use glam::Vec2;

use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::shape::Shape;
use crate::core::world::World;
use crate::error::PhysicsError;
use crate::joints::JointDesc;

/// `width` x `height` box with its first corner at `pos`, turned by `angle`
/// around that corner.
pub fn rectangle(pos: Vec2, width: f32, height: f32, mass: f32, angle: f32) -> Result<Body, PhysicsError> {
    let rot = Vec2::from_angle(angle);
    let corners = [
        Vec2::ZERO,
        Vec2::new(width, 0.0),
        Vec2::new(width, height),
        Vec2::new(0.0, height),
    ]
    .map(|c| rot.rotate(c));
    Body::polygon(pos, &corners, mass)
}

pub fn circle(pos: Vec2, radius: f32, mass: f32) -> Body {
    Body::circle(pos, radius, mass)
}

/// `count` equal boxes, the n-th with its corner at `start + step * n`.
pub fn line_of_rectangles(
    start: Vec2,
    step: Vec2,
    count: usize,
    width: f32,
    height: f32,
    mass: f32,
) -> Result<Vec<Body>, PhysicsError> {
    (0..count)
        .map(|i| rectangle(start + step * i as f32, width, height, mass, 0.0))
        .collect()
}

/// Plausible rather than physical mass: `density * sqrt(area)`.
pub fn mass_for_area(shape: &Shape, density: f32) -> f32 {
    density * shape.area().sqrt()
}

/// Distance joint between the centres of two bodies already in `world`.
pub fn distance_joint(world: &World, a: BodyId, b: BodyId) -> Result<JointDesc, PhysicsError> {
    let pa = world.body(a).ok_or(PhysicsError::UnknownBody(a))?.pos();
    let pb = world.body(b).ok_or(PhysicsError::UnknownBody(b))?.pos();
    Ok(JointDesc::distance(a, b, pa, pb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_is_placed_by_its_corner() {
        let body = rectangle(Vec2::new(1.0, 1.0), 4.0, 2.0, 1.0, 0.0).unwrap();
        assert!((body.pos() - Vec2::new(3.0, 2.0)).length() < 1e-5, "{:?}", body.pos());
        assert!((body.shape().area() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn rotated_rectangle_turns_around_its_corner() {
        let body = rectangle(Vec2::ZERO, 2.0, 2.0, 1.0, std::f32::consts::FRAC_PI_2).unwrap();
        assert!((body.pos() - Vec2::new(-1.0, 1.0)).length() < 1e-5, "{:?}", body.pos());
    }

    #[test]
    fn line_spacing_follows_step() {
        let bodies = line_of_rectangles(Vec2::ZERO, Vec2::new(3.0, 0.0), 4, 2.0, 1.0, 1.0).unwrap();
        assert_eq!(bodies.len(), 4);
        assert!((bodies[3].pos().x - 10.0).abs() < 1e-5);
        assert!(line_of_rectangles(Vec2::ZERO, Vec2::X, 2, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn mass_grows_with_root_of_area() {
        let shape = Shape::circle(2.0);
        let expected = 3.0 * (std::f32::consts::PI * 4.0).sqrt();
        assert!((mass_for_area(&shape, 3.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn joint_spans_body_centres() {
        let mut world = World::default();
        let a = world.add_body(circle(Vec2::ZERO, 1.0, 1.0));
        let b = world.add_body(circle(Vec2::new(0.0, 6.0), 1.0, 1.0));
        let desc = distance_joint(&world, a, b).unwrap();
        let id = world.add_joint(desc).unwrap();
        let joint = world.joint(id).unwrap();
        assert_eq!(joint.kind(), &crate::joints::JointKind::Distance { length: 6.0 });
        assert!(distance_joint(&world, a, BodyId(42)).is_err());
    }
}

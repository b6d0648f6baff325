use glam::Vec2;

use crate::api::types::BodyId;
use crate::core::shape::{Polygon, Shape};
use crate::error::PhysicsError;
use crate::sleeping::connection::Connection;

/// A rigid body: pose, motion, mass properties and one owned shape.
///
/// A mass of `0.0` (or infinity) makes the body static. Static bodies have
/// zero inverse mass and inertia and are never integrated.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) acc: Vec2,
    pub(crate) angle: f32,
    pub(crate) ang_vel: f32,
    pub(crate) ang_acc: f32,

    pub(crate) mass: f32,
    pub(crate) inv_mass: f32,
    pub(crate) inertia: f32,
    pub(crate) inv_inertia: f32,

    /// Cached `(cos, sin)` of `angle`.
    pub(crate) rot: Vec2,
    pub(crate) shape: Shape,
    pub(crate) half_extents: Vec2,

    /// Position-correction velocity. Zeroed every step.
    pub(crate) bias_vel: Vec2,

    pub(crate) sleeping: bool,
    pub(crate) idle_time: f32,

    pub(crate) friction: Option<f32>,
    pub(crate) restitution: Option<f32>,

    pub(crate) non_colliding: Vec<BodyId>,
    pub(crate) connections: Vec<Connection>,
}

impl Body {
    /// Create a body centred at `pos`.
    pub fn new(pos: Vec2, shape: Shape, mass: f32) -> Self {
        let mut body = Body {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            angle: 0.0,
            ang_vel: 0.0,
            ang_acc: 0.0,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            inertia: f32::INFINITY,
            inv_inertia: 0.0,
            rot: Vec2::X,
            shape,
            half_extents: Vec2::ZERO,
            bias_vel: Vec2::ZERO,
            sleeping: false,
            idle_time: 0.0,
            friction: None,
            restitution: None,
            non_colliding: Vec::new(),
            connections: Vec::new(),
        };
        if mass > 0.0 && mass.is_finite() {
            body.set_dynamic(mass);
        }
        body.sync_shape();
        body
    }

    pub fn circle(pos: Vec2, radius: f32, mass: f32) -> Self {
        Self::new(pos, Shape::circle(radius), mass)
    }

    /// Polygon body. `vertices` are relative to `pos`; the body is moved to
    /// their centroid.
    pub fn polygon(pos: Vec2, vertices: &[Vec2], mass: f32) -> Result<Self, PhysicsError> {
        let (poly, centroid) = Polygon::new(vertices)?;
        Ok(Self::new(pos + centroid, Shape::Polygon(poly), mass))
    }

    pub fn rectangle(pos: Vec2, width: f32, height: f32, mass: f32) -> Result<Self, PhysicsError> {
        let poly = Polygon::rectangle(width, height)?;
        Ok(Self::new(pos, Shape::Polygon(poly), mass))
    }

    /// Immovable zero-size body used as the far end of background joints.
    pub(crate) fn anchor(pos: Vec2) -> Self {
        Self::new(pos, Shape::circle(0.0), 0.0)
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.set_angle(angle);
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        if !self.is_static() {
            self.vel = vel;
        }
        self
    }

    pub fn with_angular_velocity(mut self, ang_vel: f32) -> Self {
        if !self.is_static() {
            self.ang_vel = ang_vel;
        }
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    // -- mass ------------------------------------------------------------

    pub fn set_static(&mut self) {
        self.mass = f32::INFINITY;
        self.inv_mass = 0.0;
        self.inertia = f32::INFINITY;
        self.inv_inertia = 0.0;
        self.stop();
    }

    pub fn set_dynamic(&mut self, mass: f32) {
        self.mass = mass;
        self.inv_mass = 1.0 / mass;
        self.inertia = self.shape.inertia(mass);
        self.inv_inertia = if self.inertia > 0.0 {
            1.0 / self.inertia
        } else {
            0.0
        };
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    // -- forces and impulses ---------------------------------------------

    /// Persistent force through the centre of mass. Does not wake the body.
    pub fn apply_const_force(&mut self, force: Vec2) {
        if self.is_static() {
            return;
        }
        self.acc += force;
    }

    /// Persistent force at a world point. Does not wake the body.
    pub fn apply_const_force_at(&mut self, force: Vec2, point: Vec2) {
        if self.is_static() {
            return;
        }
        self.acc += force;
        self.ang_acc += (point - self.pos).perp_dot(force);
    }

    /// One-off force at a world point. Wakes the body.
    pub fn apply_force_at(&mut self, force: Vec2, point: Vec2) {
        self.apply_const_force_at(force, point);
        self.wake_up();
    }

    /// Impulse at offset `r` from the centre. Does not wake the body.
    pub fn apply_const_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.vel += impulse * self.inv_mass;
        self.ang_vel += self.inv_inertia * r.perp_dot(impulse);
    }

    /// Impulse through the centre of mass. Wakes the body.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.vel += impulse * self.inv_mass;
        self.wake_up();
    }

    /// Impulse at offset `r` from the centre. Wakes the body.
    pub fn apply_impulse_at(&mut self, impulse: Vec2, r: Vec2) {
        self.apply_const_impulse(impulse, r);
        self.wake_up();
    }

    pub fn apply_const_angular_impulse(&mut self, l: f32) {
        self.ang_vel += l * self.inv_inertia;
    }

    /// Linear push that only feeds position correction.
    pub fn apply_bias_impulse(&mut self, impulse: Vec2) {
        self.bias_vel += impulse * self.inv_mass;
    }

    // -- integration -----------------------------------------------------

    pub fn integrate_velocities(&mut self, dt: f32) {
        self.vel += self.acc * dt * self.inv_mass;
        self.ang_vel += self.ang_acc * dt * self.inv_inertia;
    }

    pub fn integrate_positions(&mut self, dt: f32) {
        self.pos += (self.vel + self.bias_vel) * dt;
        self.angle += self.ang_vel * dt;
    }

    /// Prepare for the next step: new rotation cache, cleared accumulators,
    /// shape moved to the new pose.
    pub fn refresh(&mut self) {
        self.acc = Vec2::ZERO;
        self.ang_acc = 0.0;
        self.bias_vel = Vec2::ZERO;
        self.sync_shape();
    }

    fn sync_shape(&mut self) {
        self.rot = Vec2::from_angle(self.angle);
        self.shape.update(self.pos, self.rot);
        self.half_extents = self.shape.half_extents(self.pos);
    }

    // -- sleeping --------------------------------------------------------

    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.idle_time = 0.0;
    }

    /// Velocities are kept: they balance the contacts the body rests on.
    pub fn sleep(&mut self) {
        self.sleeping = true;
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Zero all motion. Only meant for explicit user resets.
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
        self.acc = Vec2::ZERO;
        self.ang_vel = 0.0;
        self.ang_acc = 0.0;
    }

    // -- spaces ----------------------------------------------------------

    pub fn to_local(&self, point: Vec2) -> Vec2 {
        Vec2::new(self.rot.x, -self.rot.y).rotate(point - self.pos)
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.rot.rotate(local) + self.pos
    }

    /// Velocity of the material point currently at `point`.
    pub fn velocity_at(&self, point: Vec2) -> Vec2 {
        self.vel + (point - self.pos).perp() * self.ang_vel
    }

    pub fn collides_with(&self, other: BodyId) -> bool {
        !self.non_colliding.contains(&other)
    }

    // -- accessors -------------------------------------------------------

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
        self.sync_shape();
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.sync_shape();
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        if !self.is_static() {
            self.vel = vel;
        }
    }

    pub fn ang_vel(&self) -> f32 {
        self.ang_vel
    }

    pub fn set_angular_velocity(&mut self, ang_vel: f32) {
        if !self.is_static() {
            self.ang_vel = ang_vel;
        }
    }

    pub fn acc(&self) -> Vec2 {
        self.acc
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    pub fn friction(&self) -> Option<f32> {
        self.friction
    }

    pub fn restitution(&self) -> Option<f32> {
        self.restitution
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.is_static() {
            return 0.0;
        }
        0.5 * self.mass * self.vel.length_squared() + 0.5 * self.inertia * self.ang_vel * self.ang_vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mass_is_static() {
        let body = Body::circle(Vec2::ZERO, 1.0, 0.0);
        assert!(body.is_static());
        assert_eq!(body.inv_inertia(), 0.0);
        assert!(body.mass().is_infinite());
    }

    #[test]
    fn const_force_ignores_static_bodies() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 0.0);
        body.apply_const_force(Vec2::new(0.0, -100.0));
        body.apply_const_force_at(Vec2::X, Vec2::Y);
        body.integrate_velocities(0.025);
        assert_eq!(body.acc(), Vec2::ZERO);
        assert_eq!(body.vel(), Vec2::ZERO);
        assert_eq!(body.ang_vel(), 0.0);
    }

    #[test]
    fn impulse_at_point_spins_and_wakes() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 2.0);
        body.sleep();
        body.apply_impulse_at(Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));
        assert!(!body.is_sleeping());
        assert!((body.vel().y - 1.0).abs() < 1e-6);
        // I = 0.5 * 2 * 1 = 1, r x p = 2
        assert!((body.ang_vel() - 2.0).abs() < 1e-6, "ang_vel {}", body.ang_vel());
    }

    #[test]
    fn const_impulse_keeps_sleep() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 1.0);
        body.sleep();
        body.apply_const_impulse(Vec2::X, Vec2::ZERO);
        assert!(body.is_sleeping());
    }

    #[test]
    fn sleep_keeps_velocity() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 1.0).with_velocity(Vec2::new(0.01, 0.0));
        body.sleep();
        assert_eq!(body.vel(), Vec2::new(0.01, 0.0));
    }

    #[test]
    fn bias_velocity_moves_once() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 1.0);
        body.apply_bias_impulse(Vec2::new(4.0, 0.0));
        body.integrate_positions(0.5);
        assert!((body.pos().x - 2.0).abs() < 1e-6);
        body.refresh();
        body.integrate_positions(0.5);
        assert!((body.pos().x - 2.0).abs() < 1e-6, "bias must be cleared by refresh");
    }

    #[test]
    fn local_world_round_trip() {
        let body = Body::rectangle(Vec2::new(3.0, -1.0), 2.0, 1.0, 1.0)
            .unwrap()
            .with_angle(0.7);
        let p = Vec2::new(4.5, 2.0);
        let back = body.to_world(body.to_local(p));
        assert!((back - p).length() < 1e-5, "{:?} != {:?}", back, p);
    }

    #[test]
    fn velocity_at_includes_spin() {
        let body = Body::circle(Vec2::ZERO, 1.0, 1.0).with_angular_velocity(2.0);
        let v = body.velocity_at(Vec2::new(1.0, 0.0));
        assert!((v - Vec2::new(0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn set_static_stops_motion() {
        let mut body = Body::circle(Vec2::ZERO, 1.0, 1.0).with_velocity(Vec2::X);
        body.set_static();
        assert!(body.is_static());
        assert_eq!(body.vel(), Vec2::ZERO);
        body.set_dynamic(2.0);
        assert!((body.inv_mass() - 0.5).abs() < 1e-6);
    }
}

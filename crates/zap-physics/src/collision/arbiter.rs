use glam::Vec2;

use super::narrowphase::ContactGeometry;
use crate::api::config::SimConfig;
use crate::api::types::BodyId;
use crate::core::body::Body;

/// Approach speed below which contacts do not bounce.
const RESTITUTION_THRESHOLD: f32 = 1.0;

/// One point of a contact manifold with its warm-start state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub pos: Vec2,
    pub normal: Vec2,
    /// Negative while penetrating.
    pub separation: f32,
    r1: Vec2,
    r2: Vec2,
    mass_normal: f32,
    mass_tangent: f32,
    bias: f32,
    bounce: f32,
    acc_normal: f32,
    acc_tangent: f32,
    acc_bias: f32,
}

impl ContactPoint {
    fn new(pos: Vec2, normal: Vec2, separation: f32) -> Self {
        Self {
            pos,
            normal,
            separation,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            mass_normal: 0.0,
            mass_tangent: 0.0,
            bias: 0.0,
            bounce: 0.0,
            acc_normal: 0.0,
            acc_tangent: 0.0,
            acc_bias: 0.0,
        }
    }

    /// Accumulated normal impulse. Never negative.
    pub fn normal_impulse(&self) -> f32 {
        self.acc_normal
    }

    pub fn tangent_impulse(&self) -> f32 {
        self.acc_tangent
    }

    pub fn bias_impulse(&self) -> f32 {
        self.acc_bias
    }
}

/// Contact constraint between the two bodies of a pair.
///
/// Solved with sequential impulses: a non-negative normal impulse, a
/// separate bias impulse that only moves positions, and Coulomb friction.
/// Accumulated impulses carry over between steps while the manifold keeps
/// its point count.
#[derive(Debug, Clone, PartialEq)]
pub struct Arbiter {
    pub b1: BodyId,
    pub b2: BodyId,
    contacts: Vec<ContactPoint>,
    friction: f32,
    restitution: f32,
}

impl Arbiter {
    pub fn new(b1: BodyId, b2: BodyId, geometry: &ContactGeometry, friction: f32, restitution: f32) -> Self {
        Self {
            b1,
            b2,
            contacts: Self::points_from(geometry),
            friction,
            restitution,
        }
    }

    /// Combined material for two bodies, falling back to the world defaults.
    pub fn material(body1: &Body, body2: &Body, config: &SimConfig) -> (f32, f32) {
        let f1 = body1.friction().unwrap_or(config.friction);
        let f2 = body2.friction().unwrap_or(config.friction);
        let e1 = body1.restitution().unwrap_or(config.restitution);
        let e2 = body2.restitution().unwrap_or(config.restitution);
        ((f1 * f2).sqrt(), e1.max(e2))
    }

    fn points_from(geometry: &ContactGeometry) -> Vec<ContactPoint> {
        geometry
            .points()
            .map(|p| ContactPoint::new(p, geometry.normal, -geometry.depth))
            .collect()
    }

    /// Take this step's geometry. Warm-start state survives unless the point
    /// count changed.
    pub fn update(&mut self, geometry: &ContactGeometry) {
        if geometry.point_count() != self.contacts.len() {
            self.contacts = Self::points_from(geometry);
            return;
        }
        for (contact, pos) in self.contacts.iter_mut().zip(geometry.points()) {
            contact.pos = pos;
            contact.normal = geometry.normal;
            contact.separation = -geometry.depth;
        }
    }

    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Effective masses, bias targets, and the warm start.
    pub fn pre_solve(&mut self, body1: &mut Body, body2: &mut Body, config: &SimConfig) {
        let bias_factor = config.position_correction * config.inv_dt();
        for c in &mut self.contacts {
            c.r1 = c.pos - body1.pos;
            c.r2 = c.pos - body2.pos;

            let tangent = c.normal.perp();
            c.mass_normal = effective_mass(body1, body2, c.r1, c.r2, c.normal);
            c.mass_tangent = effective_mass(body1, body2, c.r1, c.r2, tangent);
            c.bias = bias_factor * (-(c.separation + config.allowed_penetration)).max(0.0);

            let vn = relative_velocity(body1, body2, c.r1, c.r2).dot(c.normal);
            c.bounce = if -vn > RESTITUTION_THRESHOLD {
                -self.restitution * vn
            } else {
                0.0
            };

            let p = c.normal * c.acc_normal + tangent * c.acc_tangent;
            body2.apply_const_impulse(p, c.r2);
            body1.apply_const_impulse(-p, c.r1);

            let pb = c.normal * c.acc_bias;
            body2.apply_bias_impulse(pb);
            body1.apply_bias_impulse(-pb);
        }
    }

    /// One sequential-impulse pass over the manifold.
    pub fn solve(&mut self, body1: &mut Body, body2: &mut Body) {
        for c in &mut self.contacts {
            let tangent = c.normal.perp();

            let dv = relative_velocity(body1, body2, c.r1, c.r2);
            let dpn = c.mass_normal * (-dv.dot(c.normal) + c.bounce);
            let old = c.acc_normal;
            c.acc_normal = (old + dpn).max(0.0);
            let pn = c.normal * (c.acc_normal - old);
            body2.apply_const_impulse(pn, c.r2);
            body1.apply_const_impulse(-pn, c.r1);

            let dvb = body2.bias_vel - body1.bias_vel;
            let dpb = c.mass_normal * (-dvb.dot(c.normal) + c.bias);
            let old = c.acc_bias;
            c.acc_bias = (old + dpb).max(0.0);
            let pb = c.normal * (c.acc_bias - old);
            body2.apply_bias_impulse(pb);
            body1.apply_bias_impulse(-pb);

            let dv = relative_velocity(body1, body2, c.r1, c.r2);
            let dpt = c.mass_tangent * -dv.dot(tangent);
            let max_pt = self.friction * c.acc_normal;
            let old = c.acc_tangent;
            c.acc_tangent = (old + dpt).clamp(-max_pt, max_pt);
            let pt = tangent * (c.acc_tangent - old);
            body2.apply_const_impulse(pt, c.r2);
            body1.apply_const_impulse(-pt, c.r1);
        }
    }
}

/// Velocity of body 2 relative to body 1 at the contact.
fn relative_velocity(body1: &Body, body2: &Body, r1: Vec2, r2: Vec2) -> Vec2 {
    body2.vel + r2.perp() * body2.ang_vel - body1.vel - r1.perp() * body1.ang_vel
}

fn effective_mass(body1: &Body, body2: &Body, r1: Vec2, r2: Vec2, dir: Vec2) -> f32 {
    let rn1 = r1.dot(dir);
    let rn2 = r2.dot(dir);
    let k = body1.inv_mass
        + body2.inv_mass
        + body1.inv_inertia * (r1.length_squared() - rn1 * rn1)
        + body2.inv_inertia * (r2.length_squared() - rn2 * rn2);
    if k > 0.0 {
        1.0 / k
    } else {
        0.0
    }
}

// joints/mod.rs
//
// User-added constraints between bodies. Each joint ties one body either to
// a second body or to a fixed point of the world ("background" joints).
// The far end of a background joint is solved as an immovable anchor body,
// so every kind shares one set of two-body equations.

mod angle;
mod codec;
mod distance;
mod spring;

use glam::Vec2;

use crate::api::config::SimConfig;
use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::id_table::IdTable;

/// Constraint kind with its persisted parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Keeps the anchors `length` apart.
    Distance { length: f32 },
    /// Soft spring-damper pulling the anchors towards `rest_length`.
    Spring { rest_length: f32, stiffness: f32, damping: f32 },
    /// Keeps `angle1 - angle2` (or the absolute angle, without a second
    /// body) at `target`.
    Angle { target: f32 },
}

impl JointKind {
    pub fn name(&self, background: bool) -> &'static str {
        match (self, background) {
            (JointKind::Distance { .. }, false) => "distance",
            (JointKind::Distance { .. }, true) => "background-distance",
            (JointKind::Spring { .. }, false) => "spring",
            (JointKind::Spring { .. }, true) => "background-spring",
            (JointKind::Angle { .. }, false) => "angle",
            (JointKind::Angle { .. }, true) => "background-angle",
        }
    }
}

/// Per-step solver scratch. Only `acc` survives between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SolverState {
    pub r1: Vec2,
    pub r2: Vec2,
    pub normal: Vec2,
    pub k: f32,
    pub bias: f32,
    /// Current anchor distance.
    pub length: f32,
    /// Accumulated impulse for warm starting.
    pub acc: f32,
}

/// A constraint on one or two bodies.
///
/// Bodies are referenced by id. `local1` is the anchor in body 1's local
/// space; `anchor2` is in body 2's local space, or in world space when
/// there is no body 2.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub(crate) b1: BodyId,
    pub(crate) b2: Option<BodyId>,
    pub(crate) local1: Vec2,
    pub(crate) anchor2: Vec2,
    pub(crate) kind: JointKind,
    pub(crate) strength: f32,
    pub(crate) state: SolverState,
}

impl Joint {
    /// Build a joint from anchors already expressed in joint space (see the
    /// struct docs).
    pub fn from_parts(b1: BodyId, b2: Option<BodyId>, local1: Vec2, anchor2: Vec2, kind: JointKind) -> Self {
        Self {
            b1,
            b2,
            local1,
            anchor2,
            kind,
            strength: 1.0,
            state: SolverState::default(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn body1(&self) -> BodyId {
        self.b1
    }

    pub fn body2(&self) -> Option<BodyId> {
        self.b2
    }

    pub fn is_background(&self) -> bool {
        self.b2.is_none()
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    pub fn local_anchor1(&self) -> Vec2 {
        self.local1
    }

    pub fn anchor2(&self) -> Vec2 {
        self.anchor2
    }

    /// Accumulated impulse carried into the next step.
    pub fn impulse(&self) -> f32 {
        self.state.acc
    }

    pub fn involves(&self, id: BodyId) -> bool {
        self.b1 == id || self.b2 == Some(id)
    }

    /// True when no body the joint touches can move: each one is asleep or
    /// static. Such joints are left out of the solver.
    pub fn sleeps(&self, body1: &Body, body2: Option<&Body>) -> bool {
        let resting = |b: &Body| b.is_static() || b.is_sleeping();
        resting(body1) && body2.map_or(true, resting)
    }

    /// Wake both bodies of the joint.
    pub fn wake_up(&self, bodies: &mut IdTable<BodyId, Body>) {
        for id in [Some(self.b1), self.b2].into_iter().flatten() {
            if let Some(body) = bodies.get_mut(id) {
                body.wake_up();
            }
        }
    }

    /// World position of both anchors.
    pub fn world_anchors(&self, body1: &Body, body2: Option<&Body>) -> (Vec2, Vec2) {
        let p1 = body1.to_world(self.local1);
        let p2 = match body2 {
            Some(b) => b.to_world(self.anchor2),
            None => self.anchor2,
        };
        (p1, p2)
    }

    /// Distance between the anchors minus the target, for distance joints.
    pub fn error(&self, body1: &Body, body2: Option<&Body>) -> Option<f32> {
        match self.kind {
            JointKind::Distance { length } => {
                let (p1, p2) = self.world_anchors(body1, body2);
                Some(p1.distance(p2) - length)
            }
            _ => None,
        }
    }

    pub fn pre_solve(&mut self, body1: &mut Body, body2: &mut Body, config: &SimConfig) {
        let p1 = body1.to_world(self.local1);
        let p2 = body2.to_world(self.far_local());
        self.state.r1 = p1 - body1.pos;
        self.state.r2 = p2 - body2.pos;

        match self.kind {
            JointKind::Distance { length } => {
                distance::pre_solve(&mut self.state, body1, body2, p1, p2, length, config)
            }
            JointKind::Spring { .. } => spring::pre_solve(&mut self.state, p1, p2),
            JointKind::Angle { target } => {
                angle::pre_solve(&mut self.state, body1, body2, target, config)
            }
        }
    }

    pub fn solve(&mut self, body1: &mut Body, body2: &mut Body, config: &SimConfig) {
        match self.kind {
            JointKind::Distance { .. } => distance::solve(&mut self.state, body1, body2, self.strength),
            JointKind::Spring {
                rest_length,
                stiffness,
                damping,
            } => {
                let params = spring::Params {
                    rest_length,
                    stiffness,
                    damping,
                    strength: self.strength,
                };
                spring::solve(&self.state, body1, body2, &params, config)
            }
            JointKind::Angle { .. } => angle::solve(&mut self.state, body1, body2, self.strength),
        }
    }

    /// Anchor 2 as an offset in body 2's space. For background joints the
    /// anchor body sits on the world point, so the offset is zero.
    fn far_local(&self) -> Vec2 {
        match self.b2 {
            Some(_) => self.anchor2,
            None => Vec2::ZERO,
        }
    }
}

/// Description of a joint in world coordinates, resolved against the bodies
/// by `World::add_joint`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDesc {
    pub body1: BodyId,
    pub body2: Option<BodyId>,
    /// World-space anchor on body 1.
    pub anchor1: Vec2,
    /// World-space anchor on body 2, or the fixed world point.
    pub anchor2: Vec2,
    pub kind: JointKind,
    pub strength: f32,
}

impl JointDesc {
    /// Distance joint holding the current anchor distance.
    pub fn distance(body1: BodyId, body2: BodyId, anchor1: Vec2, anchor2: Vec2) -> Self {
        Self::new(
            body1,
            Some(body2),
            anchor1,
            anchor2,
            JointKind::Distance {
                length: anchor1.distance(anchor2),
            },
        )
    }

    /// Ties `anchor1` on the body to the fixed world point `anchor2`.
    pub fn background_distance(body1: BodyId, anchor1: Vec2, anchor2: Vec2) -> Self {
        Self::new(
            body1,
            None,
            anchor1,
            anchor2,
            JointKind::Distance {
                length: anchor1.distance(anchor2),
            },
        )
    }

    /// Spring resting at the current anchor distance.
    pub fn spring(body1: BodyId, body2: BodyId, anchor1: Vec2, anchor2: Vec2, stiffness: f32, damping: f32) -> Self {
        Self::new(
            body1,
            Some(body2),
            anchor1,
            anchor2,
            JointKind::Spring {
                rest_length: anchor1.distance(anchor2),
                stiffness,
                damping,
            },
        )
    }

    /// Relative angle joint. Anchors are the body centres.
    pub fn angle(body1: BodyId, body2: BodyId, target: f32) -> Self {
        Self::new(body1, Some(body2), Vec2::ZERO, Vec2::ZERO, JointKind::Angle { target })
    }

    /// Absolute angle joint around the body centre `center`.
    pub fn background_angle(body1: BodyId, center: Vec2, target: f32) -> Self {
        Self::new(body1, None, center, center, JointKind::Angle { target })
    }

    pub fn with_length(mut self, length: f32) -> Self {
        match &mut self.kind {
            JointKind::Distance { length: l } => *l = length,
            JointKind::Spring { rest_length, .. } => *rest_length = length,
            JointKind::Angle { .. } => {}
        }
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    fn new(body1: BodyId, body2: Option<BodyId>, anchor1: Vec2, anchor2: Vec2, kind: JointKind) -> Self {
        Self {
            body1,
            body2,
            anchor1,
            anchor2,
            kind,
            strength: 1.0,
        }
    }

    /// Express the anchors in the bodies' local spaces.
    pub fn build(&self, body1: &Body, body2: Option<&Body>) -> Joint {
        let (local1, anchor2) = match self.kind {
            JointKind::Angle { .. } => (
                Vec2::ZERO,
                match body2 {
                    Some(_) => Vec2::ZERO,
                    None => body1.pos(),
                },
            ),
            _ => (
                body1.to_local(self.anchor1),
                match body2 {
                    Some(b) => b.to_local(self.anchor2),
                    None => self.anchor2,
                },
            ),
        };
        Joint::from_parts(self.body1, self.body2, local1, anchor2, self.kind).with_strength(self.strength)
    }
}

/// `1 / (im1 + im2 + ii1·(r1×n)² + ii2·(r2×n)²)`, or zero when nothing can move.
pub(crate) fn effective_mass(body1: &Body, body2: &Body, r1: Vec2, r2: Vec2, n: Vec2) -> f32 {
    let c1 = r1.perp_dot(n);
    let c2 = r2.perp_dot(n);
    let k = body1.inv_mass + body2.inv_mass + body1.inv_inertia * c1 * c1 + body2.inv_inertia * c2 * c2;
    if k > 0.0 {
        1.0 / k
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pendulum() -> (Body, Body, Joint) {
        let ceiling = Body::anchor(Vec2::new(0.0, 10.0));
        let bob = Body::circle(Vec2::new(5.0, 10.0), 0.5, 1.0);
        let joint = JointDesc::background_distance(BodyId(1), bob.pos(), Vec2::new(0.0, 10.0))
            .build(&bob, None);
        (ceiling, bob, joint)
    }

    #[test]
    fn desc_measures_length_at_creation() {
        let (_, _, joint) = pendulum();
        assert_eq!(joint.kind, JointKind::Distance { length: 5.0 });
        assert!(joint.is_background());
        assert_eq!(joint.anchor2, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn distance_joint_cancels_stretching_velocity() {
        let (mut ceiling, mut bob, mut joint) = pendulum();
        let config = SimConfig::default();
        bob.set_velocity(Vec2::new(3.0, 0.0));
        joint.pre_solve(&mut bob, &mut ceiling, &config);
        for _ in 0..config.solver_iterations {
            joint.solve(&mut bob, &mut ceiling, &config);
        }
        assert!(bob.vel().x.abs() < 1e-3, "radial velocity left: {:?}", bob.vel());
        assert_eq!(ceiling.vel(), Vec2::ZERO);
    }

    #[test]
    fn tangential_motion_is_free() {
        let (mut ceiling, mut bob, mut joint) = pendulum();
        let config = SimConfig::default();
        bob.set_velocity(Vec2::new(0.0, -2.0));
        joint.pre_solve(&mut bob, &mut ceiling, &config);
        joint.solve(&mut bob, &mut ceiling, &config);
        assert!((bob.vel().y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn sleeps_only_when_all_bodies_sleep() {
        let (_, mut bob, joint) = pendulum();
        assert!(!joint.sleeps(&bob, None));
        bob.sleep();
        assert!(joint.sleeps(&bob, None));
        let awake = Body::circle(Vec2::ZERO, 1.0, 1.0);
        assert!(!joint.sleeps(&bob, Some(&awake)));
        let ground = Body::rectangle(Vec2::ZERO, 4.0, 1.0, 0.0).unwrap();
        assert!(joint.sleeps(&bob, Some(&ground)));
    }

    #[test]
    fn wake_up_reaches_both_bodies() {
        let mut bodies = IdTable::new();
        let a: BodyId = bodies.insert(Body::circle(Vec2::ZERO, 1.0, 1.0));
        let b = bodies.insert(Body::circle(Vec2::new(3.0, 0.0), 1.0, 1.0));
        let other = bodies.insert(Body::circle(Vec2::new(9.0, 0.0), 1.0, 1.0));
        for (_, body) in bodies.iter_mut() {
            body.sleep();
        }
        let joint = JointDesc::distance(a, b, Vec2::ZERO, Vec2::new(3.0, 0.0))
            .build(bodies.get(a).unwrap(), bodies.get(b));
        joint.wake_up(&mut bodies);
        assert!(!bodies.get(a).unwrap().is_sleeping());
        assert!(!bodies.get(b).unwrap().is_sleeping());
        assert!(bodies.get(other).unwrap().is_sleeping());
    }

    #[test]
    fn error_is_stretch_beyond_length() {
        let (_, mut bob, joint) = pendulum();
        bob.set_position(Vec2::new(6.0, 10.0));
        let err = joint.error(&bob, None).unwrap();
        assert!((err - 1.0).abs() < 1e-5, "error {}", err);
    }
}

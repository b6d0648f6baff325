use glam::Vec2;

use crate::api::config::{SafetyConfig, SimConfig};
use crate::api::types::{BodyId, BodyState, JointId};
use crate::collision::arbiter::Arbiter;
use crate::collision::handler::CollisionHandler;
use crate::collision::pair::PairKey;
use crate::collision::raycast::{self, RayHit};
use crate::core::body::Body;
use crate::core::id_table::IdTable;
use crate::core::time::FixedTimestep;
use crate::error::PhysicsError;
use crate::forces::{air_friction, gravity, Effect, Wind};
use crate::joints::{Joint, JointDesc};
use crate::sleeping::{Connection, Link, SleepingSystem};

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owns every body and joint and advances them one fixed step at a time.
///
/// A step runs, in this order: external forces, velocity integration,
/// collision detection, the contact and joint solver, position integration,
/// per-body refresh, and the sleeping update. Bodies, pairs and joints are
/// always visited in insertion order, so identical inputs replay to
/// bit-identical states.
pub struct World {
    config: SimConfig,
    bodies: IdTable<BodyId, Body>,
    joints: IdTable<JointId, Joint>,
    handler: CollisionHandler,
    sleeping: SleepingSystem,
    wind: Option<Wind>,
    /// Pairs in contact this step, in solver order.
    arbiters: Vec<PairKey>,
    /// Joint slots solved this step.
    active_joints: Vec<usize>,
    timestep: FixedTimestep,
    time: f64,
    steps: u64,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        let wind = config.wind.and_then(Wind::new);
        Self {
            handler: CollisionHandler::new(&config),
            timestep: FixedTimestep::new(config.dt).with_max_steps(config.max_steps_per_frame),
            bodies: IdTable::new(),
            joints: IdTable::new(),
            sleeping: SleepingSystem::new(),
            wind,
            arbiters: Vec::new(),
            active_joints: Vec::new(),
            time: 0.0,
            steps: 0,
            config,
        }
    }

    // -- bodies ----------------------------------------------------------

    /// Register a body. Out-of-range mass or area is logged, never refused.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = self.bodies.insert(body);
        if let Some(body) = self.bodies.get(id) {
            check_body(id, body, &self.config.safety);
        }
        self.handler.add_body(self.bodies.as_slice(), self.bodies.ids(), self.config.dt);
        log::debug!("body {} added ({} bodies)", id, self.bodies.len());
        id
    }

    /// Remove a body together with every joint attached to it. Everything
    /// the body touched is woken up, since their contacts are about to
    /// change.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, PhysicsError> {
        let attached: Vec<JointId> = self
            .joints
            .iter()
            .filter(|(_, joint)| joint.involves(id))
            .map(|(joint_id, _)| joint_id)
            .collect();
        for joint_id in attached {
            self.remove_joint(joint_id)?;
        }

        let slot = self.bodies.index_of(id).ok_or(PhysicsError::UnknownBody(id))?;
        let dropped_pairs = self.handler.remove_body(slot);
        let (_, mut body) = self.bodies.remove(id).ok_or(PhysicsError::UnknownBody(id))?;
        self.arbiters.clear();
        self.active_joints.clear();

        body.wake_up();
        let neighbours = body
            .connections
            .iter()
            .map(|c| c.other_than(id))
            .chain(dropped_pairs.iter().map(|p| p.other_than(id)));
        for other in neighbours {
            if let Some(other) = self.bodies.get_mut(other) {
                other.wake_up();
            }
        }
        for (_, other) in self.bodies.iter_mut() {
            other.connections.retain(|c| c.b1 != id && c.b2 != id);
            other.non_colliding.retain(|nc| *nc != id);
        }
        body.connections.clear();

        log::debug!("body {} removed ({} bodies)", id, self.bodies.len());
        Ok(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    /// Bodies in slot order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_index(&self, id: BodyId) -> Option<usize> {
        self.bodies.index_of(id)
    }

    pub fn body_id_at(&self, slot: usize) -> Option<BodyId> {
        self.bodies.id_at(slot)
    }

    /// Stop contacts between `a` and `b`.
    pub fn set_non_colliding(&mut self, a: BodyId, b: BodyId) -> Result<(), PhysicsError> {
        self.ensure_body(a)?;
        self.ensure_body(b)?;
        for (this, other) in [(a, b), (b, a)] {
            if let Some(body) = self.bodies.get_mut(this) {
                if !body.non_colliding.contains(&other) {
                    body.non_colliding.push(other);
                }
            }
        }
        Ok(())
    }

    /// Undo `set_non_colliding`.
    pub fn set_colliding(&mut self, a: BodyId, b: BodyId) -> Result<(), PhysicsError> {
        self.ensure_body(a)?;
        self.ensure_body(b)?;
        for (this, other) in [(a, b), (b, a)] {
            if let Some(body) = self.bodies.get_mut(this) {
                body.non_colliding.retain(|id| *id != other);
                body.wake_up();
            }
        }
        Ok(())
    }

    fn ensure_body(&self, id: BodyId) -> Result<(), PhysicsError> {
        if self.bodies.contains(id) {
            Ok(())
        } else {
            Err(PhysicsError::UnknownBody(id))
        }
    }

    // -- joints ----------------------------------------------------------

    /// Create a joint from world-space anchors.
    pub fn add_joint(&mut self, desc: JointDesc) -> Result<JointId, PhysicsError> {
        let body1 = self
            .bodies
            .get(desc.body1)
            .ok_or(PhysicsError::UnknownBody(desc.body1))?;
        let body2 = match desc.body2 {
            Some(id) => Some(self.bodies.get(id).ok_or(PhysicsError::UnknownBody(id))?),
            None => None,
        };
        let joint = desc.build(body1, body2);
        self.insert_joint(joint)
    }

    /// Register an already built joint, e.g. one parsed from its text form.
    pub fn insert_joint(&mut self, joint: Joint) -> Result<JointId, PhysicsError> {
        let static1 = self
            .bodies
            .get(joint.b1)
            .ok_or(PhysicsError::UnknownBody(joint.b1))?
            .is_static();
        let static2 = match joint.b2 {
            Some(id) => self.bodies.get(id).ok_or(PhysicsError::UnknownBody(id))?.is_static(),
            None => true,
        };
        if static1 && static2 {
            log::warn!("refusing joint `{}`: it has no dynamic body", joint);
            return Err(PhysicsError::StaticJoint);
        }

        let (b1, b2) = (joint.b1, joint.b2);
        let id = self.joints.insert(joint);
        if let Some(b2) = b2 {
            let connection = Connection::new(b1, b2, Link::Joint(id));
            for body in [b1, b2] {
                if let Some(body) = self.bodies.get_mut(body) {
                    body.connections.push(connection);
                }
            }
        }
        if let Some(joint) = self.joints.get(id) {
            joint.wake_up(&mut self.bodies);
        }
        log::debug!("joint {} added between {} and {:?}", id, b1, b2);
        Ok(id)
    }

    pub fn remove_joint(&mut self, id: JointId) -> Result<Joint, PhysicsError> {
        let (_, joint) = self.joints.remove(id).ok_or(PhysicsError::UnknownJoint(id))?;
        for body in [Some(joint.b1), joint.b2].into_iter().flatten() {
            if let Some(body) = self.bodies.get_mut(body) {
                body.connections.retain(|c| c.link != Link::Joint(id));
            }
        }
        joint.wake_up(&mut self.bodies);
        self.active_joints.clear();
        log::debug!("joint {} removed", id);
        Ok(joint)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id)
    }

    pub fn joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // -- stepping --------------------------------------------------------

    /// Apply `effect` to every dynamic body.
    pub fn apply_effect<E: Effect + ?Sized>(&mut self, effect: &E) {
        for body in self.bodies.as_mut_slice().iter_mut().filter(|b| !b.is_static()) {
            effect.apply(body);
        }
    }

    /// Feed a variable frame time and run the fixed steps it covers.
    /// Returns the number of steps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Fraction of a step left in the accumulator, for pose interpolation.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    /// Advance the simulation by one fixed step.
    pub fn step(&mut self) {
        let dt = self.config.dt;

        let bodies = self.bodies.as_mut_slice();
        gravity::apply(bodies, &self.config);
        air_friction::apply(bodies, &self.config);
        if let Some(wind) = self.wind.as_mut() {
            wind.apply(bodies);
        }
        for body in bodies.iter_mut() {
            if !body.is_static() && !body.is_sleeping() {
                body.integrate_velocities(dt);
            }
            body.connections.retain(|c| !c.is_contact());
        }

        self.arbiters = self
            .handler
            .handle(self.bodies.as_slice(), self.bodies.ids(), &self.config);
        self.connect_contacts();

        self.solve();

        for body in self.bodies.as_mut_slice() {
            if !body.is_static() && !body.is_sleeping() {
                body.integrate_positions(dt);
            }
            body.refresh();
        }

        self.sleeping.update(&mut self.bodies, &self.config.sleep, dt);
        self.time += dt as f64;
        self.steps += 1;
    }

    /// Contact connections for this step's live pairs, plus the dormant
    /// pairs that hold a sleeping group together.
    fn connect_contacts(&mut self) {
        let bodies = self.bodies.as_mut_slice();
        for &key in self.arbiters.iter().chain(self.handler.dormant()) {
            let Some(pair) = self.handler.pairs().get(key) else {
                continue;
            };
            let connection = Connection::new(pair.b1, pair.b2, Link::Contact);
            bodies[pair.s1].connections.push(connection);
            bodies[pair.s2].connections.push(connection);
        }
    }

    fn solve(&mut self) {
        let config = &self.config;
        let pairs = self.handler.pairs_mut();

        for &key in &self.arbiters {
            let Some(pair) = pairs.get_mut(key) else {
                continue;
            };
            if let (Some(arbiter), Some((b1, b2))) = (pair.arbiter.as_mut(), self.bodies.get2_mut(pair.s1, pair.s2)) {
                arbiter.pre_solve(b1, b2, config);
            }
        }

        self.active_joints.clear();
        for slot in 0..self.joints.len() {
            let Some(joint) = self.joints.as_mut_slice().get_mut(slot) else {
                continue;
            };
            let mut ground = None;
            let Some((b1, b2)) = joint_bodies(&mut self.bodies, joint, &mut ground) else {
                continue;
            };
            if joint.sleeps(b1, Some(&*b2)) {
                continue;
            }
            joint.pre_solve(b1, b2, config);
            self.active_joints.push(slot);
        }

        for _ in 0..config.solver_iterations {
            for &key in &self.arbiters {
                let Some(pair) = pairs.get_mut(key) else {
                    continue;
                };
                if let (Some(arbiter), Some((b1, b2))) = (pair.arbiter.as_mut(), self.bodies.get2_mut(pair.s1, pair.s2)) {
                    arbiter.solve(b1, b2);
                }
            }
            for &slot in &self.active_joints {
                let Some(joint) = self.joints.as_mut_slice().get_mut(slot) else {
                    continue;
                };
                let mut ground = None;
                if let Some((b1, b2)) = joint_bodies(&mut self.bodies, joint, &mut ground) {
                    joint.solve(b1, b2, config);
                }
            }
        }
    }

    // -- queries ---------------------------------------------------------

    /// One record per body, in slot order.
    pub fn snapshot(&self) -> Vec<BodyState> {
        self.bodies
            .iter()
            .map(|(id, body)| BodyState {
                id: id.0,
                sleeping: body.is_sleeping() as u32,
                pos: body.pos().to_array(),
                angle: body.angle(),
                vel: body.vel().to_array(),
                ang_vel: body.ang_vel(),
            })
            .collect()
    }

    /// Every body the ray from `origin` along `dir` enters.
    pub fn ray_cast_all(&self, origin: Vec2, dir: Vec2, min_dist: f32) -> Vec<RayHit> {
        raycast::ray_cast_all(self.bodies.iter(), origin, dir, min_dist)
    }

    /// Nearest body along the ray, ignoring bodies that contain `origin`.
    pub fn ray_cast(&self, origin: Vec2, dir: Vec2, min_dist: f32) -> Option<RayHit> {
        raycast::ray_cast(self.bodies.iter(), origin, dir, min_dist)
    }

    /// Translational plus rotational energy of all dynamic bodies.
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies.as_slice().iter().map(Body::kinetic_energy).sum()
    }

    /// Summed absolute length error over all distance joints.
    pub fn joint_error(&self) -> f32 {
        self.joints
            .as_slice()
            .iter()
            .filter_map(|joint| {
                let body1 = self.bodies.get(joint.b1)?;
                let body2 = joint.b2.and_then(|id| self.bodies.get(id));
                joint.error(body1, body2)
            })
            .map(f32::abs)
            .sum()
    }

    /// Collision groups of the last step, as body ids.
    pub fn groups(&self) -> Vec<Vec<BodyId>> {
        self.sleeping
            .groups()
            .iter()
            .map(|group| group.iter().filter_map(|&slot| self.bodies.id_at(slot)).collect())
            .collect()
    }

    /// Arbiters of the pairs in contact this step, in solver order.
    pub fn arbiters(&self) -> impl Iterator<Item = &Arbiter> {
        self.arbiters
            .iter()
            .filter_map(|&key| self.handler.pairs().get(key))
            .filter_map(|pair| pair.arbiter.as_ref())
    }

    /// Pair keys in contact this step.
    pub fn contact_pairs(&self) -> &[PairKey] {
        &self.arbiters
    }

    pub fn collision_handler(&self) -> &CollisionHandler {
        &self.handler
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulated seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

/// The two bodies a joint acts on. Background joints get a fresh immovable
/// anchor in `ground` as their second body.
fn joint_bodies<'a>(
    bodies: &'a mut IdTable<BodyId, Body>,
    joint: &Joint,
    ground: &'a mut Option<Body>,
) -> Option<(&'a mut Body, &'a mut Body)> {
    match joint.b2 {
        Some(b2) => {
            let s1 = bodies.index_of(joint.b1)?;
            let s2 = bodies.index_of(b2)?;
            bodies.get2_mut(s1, s2)
        }
        None => {
            let body1 = bodies.get_mut(joint.b1)?;
            let anchor = ground.get_or_insert_with(|| Body::anchor(joint.anchor2));
            Some((body1, anchor))
        }
    }
}

/// Advisory sanity check on a new body.
fn check_body(id: BodyId, body: &Body, safety: &SafetyConfig) {
    if !safety.enabled || body.is_static() {
        return;
    }
    let mass = body.mass();
    if mass > safety.max_mass {
        log::warn!("body {} is too heavy: mass {}", id, mass);
    }
    if mass < safety.min_mass {
        log::warn!("body {} is too light: mass {}", id, mass);
    }
    let area = body.shape().area();
    if area > safety.max_area {
        log::warn!("body {} is too large: area {}", id, area);
    }
    if area < safety.min_area {
        log::warn!("body {} is too small: area {}", id, area);
    }
}

use super::arbiter::Arbiter;
use super::broadphase::Broadphase;
use super::narrowphase::{circle_circle, polygon_circle, polygon_polygon, ContactGeometry};
use super::pair::{Pair, PairKey, PairStore};
use crate::api::config::SimConfig;
use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::shape::Shape;

/// Runs broadphase and narrowphase, and keeps each pair's arbiter alive
/// across steps.
pub struct CollisionHandler {
    broadphase: Broadphase,
    pairs: PairStore,
    candidates: Vec<PairKey>,
    /// Touching pairs skipped this step because both bodies rest.
    dormant: Vec<PairKey>,
}

impl CollisionHandler {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            broadphase: Broadphase::new(config.bounding_margin),
            pairs: PairStore::new(),
            candidates: Vec::new(),
            dormant: Vec::new(),
        }
    }

    /// Start tracking the body in the last slot of `bodies`.
    pub fn add_body(&mut self, bodies: &[Body], ids: &[BodyId], dt: f32) {
        self.pairs.add_slot();
        self.broadphase.add_body(bodies, ids, dt, &mut self.pairs);
    }

    /// Stop tracking `slot`. Returns the pairs the body was part of.
    pub fn remove_body(&mut self, slot: usize) -> Vec<Pair> {
        self.broadphase.remove_body(slot);
        let removed = self.pairs.remove_slot(slot);
        self.candidates.clear();
        self.dormant.clear();
        removed
    }

    /// Test every candidate pair and return those in contact, in broadphase
    /// order. Pairs that are skipped keep their arbiter for warm starting;
    /// those where both bodies rest and still touch are listed in `dormant`.
    pub fn handle(&mut self, bodies: &[Body], ids: &[BodyId], config: &SimConfig) -> Vec<PairKey> {
        self.broadphase.update(bodies, ids, config.dt, &mut self.pairs);
        self.candidates.clear();
        self.candidates.extend(self.pairs.keys());
        self.dormant.clear();

        let mut live = Vec::new();
        for &key in &self.candidates {
            let Some(pair) = self.pairs.get_mut(key) else {
                continue;
            };
            let (b1, b2) = (&bodies[pair.s1], &bodies[pair.s2]);
            if b1.is_static() && b2.is_static() {
                continue;
            }
            if resting(b1) && resting(b2) {
                if pair.arbiter.is_some() {
                    self.dormant.push(key);
                }
                continue;
            }
            if !b1.collides_with(pair.b2) {
                continue;
            }
            match collide(b1, b2, config.dt, config.allowed_penetration) {
                Some(geometry) => {
                    match pair.arbiter.as_mut() {
                        Some(arbiter) => arbiter.update(&geometry),
                        None => {
                            let (friction, restitution) = Arbiter::material(b1, b2, config);
                            pair.arbiter =
                                Some(Arbiter::new(pair.b1, pair.b2, &geometry, friction, restitution));
                        }
                    }
                    pair.contact = Some(geometry);
                    live.push(key);
                }
                None => {
                    pair.contact = None;
                    pair.arbiter = None;
                }
            }
        }
        live
    }

    /// Pairs that were touching when both their bodies fell asleep. They keep
    /// the sleeping group connected without being solved.
    pub fn dormant(&self) -> &[PairKey] {
        &self.dormant
    }

    /// Pair keys the broadphase reported in the last `handle` call.
    pub fn candidates(&self) -> &[PairKey] {
        &self.candidates
    }

    pub fn pairs(&self) -> &PairStore {
        &self.pairs
    }

    pub fn pairs_mut(&mut self) -> &mut PairStore {
        &mut self.pairs
    }
}

fn resting(body: &Body) -> bool {
    body.is_static() || body.is_sleeping()
}

/// Dispatch on the shape combination. Normals point from `b1` to `b2`.
pub fn collide(b1: &Body, b2: &Body, dt: f32, allowed_penetration: f32) -> Option<ContactGeometry> {
    match (&b1.shape, &b2.shape) {
        (Shape::Polygon(p1), Shape::Polygon(p2)) => {
            polygon_polygon(b1, p1, b2, p2, dt, allowed_penetration)
        }
        (Shape::Polygon(p), Shape::Circle { radius }) => polygon_circle(b1.pos, p, b2.pos, *radius),
        (Shape::Circle { radius }, Shape::Polygon(p)) => {
            polygon_circle(b2.pos, p, b1.pos, *radius).map(ContactGeometry::flipped)
        }
        (Shape::Circle { radius: r1 }, Shape::Circle { radius: r2 }) => {
            circle_circle(b1, *r1, b2, *r2, dt)
        }
    }
}

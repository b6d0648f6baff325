use glam::Vec2;

use crate::core::body::Body;

/// A one-off action applied to every dynamic body by `World::apply_effect`.
/// Effects should use the waking force and impulse paths.
pub trait Effect {
    fn apply(&self, body: &mut Body);
}

/// Radial blast. Bodies inside `radius` get an impulse away from the centre,
/// stronger the closer they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub strength: f32,
}

impl Explosion {
    pub fn new(center: Vec2, radius: f32, strength: f32) -> Self {
        Self {
            center,
            radius,
            strength,
        }
    }
}

impl Effect for Explosion {
    fn apply(&self, body: &mut Body) {
        let d = self.center.distance(body.pos());
        if d > 0.0 && d < self.radius {
            body.apply_impulse((body.pos() - self.center) * (self.strength / (0.1 * d)));
        }
    }
}

impl<F> Effect for F
where
    F: Fn(&mut Body),
{
    fn apply(&self, body: &mut Body) {
        self(body)
    }
}

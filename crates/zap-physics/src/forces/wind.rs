use glam::Vec2;

use crate::core::body::Body;

/// Body count above which wind is reported as expensive.
const WARN_BODIES: usize = 300;

/// Steady wind with shadowing: bodies are visited upwind first, and every
/// body only catches the part of its cross-section that no upwind body
/// already covers.
#[derive(Debug, Clone)]
pub struct Wind {
    dir: Vec2,
    speed: f32,
    order: Vec<usize>,
    covered: Vec<(f32, f32)>,
}

impl Wind {
    /// `None` for a zero wind velocity.
    pub fn new(velocity: Vec2) -> Option<Self> {
        let dir = velocity.try_normalize()?;
        Some(Self {
            dir,
            speed: velocity.length(),
            order: Vec::new(),
            covered: Vec::new(),
        })
    }

    pub fn apply(&mut self, bodies: &mut [Body]) {
        if bodies.len() > WARN_BODIES {
            log::warn!("wind is active with {} bodies, this can slow the simulation down", bodies.len());
        }
        let dir = self.dir;
        let across = dir.perp();

        self.order.clear();
        self.order.extend(0..bodies.len());
        // Stable sort keeps slot order between bodies at equal depth.
        self.order
            .sort_by(|&a, &b| bodies[a].pos.dot(dir).total_cmp(&bodies[b].pos.dot(dir)));

        self.covered.clear();
        for &slot in &self.order {
            let body = &mut bodies[slot];
            let full = body.shape.project(body.pos, across);
            if body.is_static() {
                self.covered.push(full);
                continue;
            }
            let exposed = self
                .covered
                .iter()
                .try_fold(full, |interval, occluder| subtract(interval, *occluder));
            let Some(exposed) = exposed else {
                continue;
            };
            self.covered.push(exposed);

            let shift = (exposed.0 + exposed.1 - full.0 - full.1) * 0.5;
            let force = dir * self.speed * (exposed.1 - exposed.0);
            body.apply_const_force_at(force, body.pos + across * shift);
        }
    }
}

/// `interval` minus `occluder`, or `None` once nothing is left.
///
/// An occluder strictly inside the interval would split it in two; that
/// case is not handled and the occluder is ignored.
fn subtract(interval: (f32, f32), occluder: (f32, f32)) -> Option<(f32, f32)> {
    let (x1, y1) = interval;
    let (x2, y2) = occluder;
    if x1 >= x2 && y1 <= y2 {
        None
    } else if y1 <= x2 || x1 >= y2 {
        Some(interval)
    } else if x1 <= x2 && y1 <= y2 {
        Some((x1, x2))
    } else if x1 >= x2 && y1 >= y2 {
        Some((y2, y1))
    } else {
        Some(interval)
    }
}

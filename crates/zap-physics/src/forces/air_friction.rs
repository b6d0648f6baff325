use crate::api::config::SimConfig;
use crate::core::body::Body;

/// Quadratic drag against the direction of motion:
/// `-dir(v) · k · units_per_meter · width · |v|²`, where `width` is the
/// body's extent across its velocity.
pub fn apply(bodies: &mut [Body], config: &SimConfig) {
    if config.air_friction == 0.0 {
        return;
    }
    let k = config.air_friction * config.units_per_meter;
    for body in bodies.iter_mut().filter(|b| !b.is_static()) {
        let dir = body.vel.normalize_or_zero();
        if dir == glam::Vec2::ZERO {
            continue;
        }
        let (lo, hi) = body.shape.project(body.pos, dir.perp());
        let drag = -dir * k * (hi - lo) * body.vel.length_squared();
        body.apply_const_force(drag);
    }
}

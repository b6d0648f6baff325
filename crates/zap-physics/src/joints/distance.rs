use glam::Vec2;

use super::{effective_mass, SolverState};
use crate::api::config::SimConfig;
use crate::core::body::Body;

/// C = |p1 - p2| - length. The normal points from anchor 2 to anchor 1.
pub(super) fn pre_solve(
    state: &mut SolverState,
    body1: &mut Body,
    body2: &mut Body,
    p1: Vec2,
    p2: Vec2,
    length: f32,
    config: &SimConfig,
) {
    let d = p1 - p2;
    state.length = d.length();
    state.normal = d.normalize_or_zero();
    state.k = effective_mass(body1, body2, state.r1, state.r2, state.normal);
    state.bias = (state.length - length) * config.inv_dt() * config.position_correction;

    let p = state.normal * state.acc;
    body1.apply_const_impulse(p, state.r1);
    body2.apply_const_impulse(-p, state.r2);
}

pub(super) fn solve(state: &mut SolverState, body1: &mut Body, body2: &mut Body, strength: f32) {
    let n = state.normal;
    let dv = body2.vel + state.r2.perp() * body2.ang_vel - body1.vel - state.r1.perp() * body1.ang_vel;
    let lambda = dv.dot(n) * state.k * strength;
    state.acc += lambda;
    let p = n * lambda;
    body1.apply_const_impulse(p, state.r1);
    body2.apply_const_impulse(-p, state.r2);

    // Position error is fed to the bias velocities only.
    let dvb = body2.bias_vel - body1.bias_vel;
    let bias_lambda = (dvb.dot(n) - state.bias) * state.k * strength;
    let pb = n * bias_lambda;
    body1.apply_bias_impulse(pb);
    body2.apply_bias_impulse(-pb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretched_joint_pulls_bias_velocities_together() {
        let config = SimConfig::default();
        let mut a = Body::circle(Vec2::ZERO, 0.5, 1.0);
        let mut b = Body::circle(Vec2::new(3.0, 0.0), 0.5, 1.0);
        let mut state = SolverState::default();
        let (pa, pb) = (a.pos(), b.pos());
        pre_solve(&mut state, &mut a, &mut b, pa, pb, 2.0, &config);
        assert!((state.normal + Vec2::X).length() < 1e-6);
        assert!(state.bias > 0.0);

        solve(&mut state, &mut a, &mut b, 1.0);
        assert!(a.bias_vel.x > 0.0, "a should move towards b");
        assert!(b.bias_vel.x < 0.0, "b should move towards a");
        assert_eq!(a.vel(), Vec2::ZERO);
    }

    #[test]
    fn warm_start_reapplies_accumulated_impulse() {
        let config = SimConfig::default();
        let mut a = Body::circle(Vec2::ZERO, 0.5, 1.0);
        let mut b = Body::circle(Vec2::new(2.0, 0.0), 0.5, 0.0);
        let mut state = SolverState {
            acc: 0.5,
            ..SolverState::default()
        };
        let (pa, pb) = (a.pos(), b.pos());
        pre_solve(&mut state, &mut a, &mut b, pa, pb, 2.0, &config);
        // Normal is -X, so a positive accumulated impulse pushes `a` along -X.
        assert!((a.vel().x + 0.5).abs() < 1e-6, "vel {:?}", a.vel());
        assert_eq!(b.vel(), Vec2::ZERO);
    }
}

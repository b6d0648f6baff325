use super::SolverState;
use crate::api::config::SimConfig;
use crate::core::body::Body;

/// C = (angle1 - angle2) - target, solved on angular velocity alone.
pub(super) fn pre_solve(state: &mut SolverState, body1: &mut Body, body2: &mut Body, target: f32, config: &SimConfig) {
    let k = body1.inv_inertia + body2.inv_inertia;
    state.k = if k > 0.0 { 1.0 / k } else { 0.0 };
    state.bias = ((body1.angle - body2.angle) - target) * config.inv_dt() * config.position_correction;

    body1.apply_const_angular_impulse(state.acc);
    body2.apply_const_angular_impulse(-state.acc);
}

pub(super) fn solve(state: &mut SolverState, body1: &mut Body, body2: &mut Body, strength: f32) {
    let l = state.k * ((body2.ang_vel - body1.ang_vel) - state.bias) * strength;
    body1.apply_const_angular_impulse(l);
    body2.apply_const_angular_impulse(-l);
    state.acc += l;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn matches_angular_velocities() {
        let config = SimConfig::default();
        let mut a = Body::circle(Vec2::ZERO, 1.0, 1.0).with_angular_velocity(2.0);
        let mut b = Body::circle(Vec2::new(3.0, 0.0), 1.0, 1.0);
        let mut state = SolverState::default();
        pre_solve(&mut state, &mut a, &mut b, 0.0, &config);
        solve(&mut state, &mut a, &mut b, 1.0);
        assert!((a.ang_vel() - b.ang_vel()).abs() < 1e-5);
        assert!((a.ang_vel() - 1.0).abs() < 1e-5, "ω {}", a.ang_vel());
    }

    #[test]
    fn background_angle_turns_body_back() {
        let config = SimConfig::default();
        let mut body = Body::circle(Vec2::ZERO, 1.0, 1.0).with_angle(0.5);
        let mut world = Body::anchor(Vec2::ZERO);
        let mut state = SolverState::default();
        pre_solve(&mut state, &mut body, &mut world, 0.0, &config);
        solve(&mut state, &mut body, &mut world, 1.0);
        assert!(body.ang_vel() < 0.0);
        assert_eq!(world.ang_vel(), 0.0);
    }
}

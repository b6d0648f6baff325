use glam::Vec2;

use super::SolverState;
use crate::api::config::SimConfig;
use crate::core::body::Body;

pub(super) struct Params {
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub strength: f32,
}

pub(super) fn pre_solve(state: &mut SolverState, p1: Vec2, p2: Vec2) {
    let d = p1 - p2;
    state.length = d.length();
    state.normal = d.normalize_or_zero();
}

/// Soft constraint: the clamped spring and damper force is spread over the
/// solver iterations as an impulse. Nothing is accumulated.
pub(super) fn solve(state: &SolverState, body1: &mut Body, body2: &mut Body, params: &Params, config: &SimConfig) {
    if state.length == 0.0 {
        return;
    }
    let max = config.spring_max_force;
    let n = state.normal;
    let mut force = (params.stiffness * (params.rest_length - state.length) * 0.5).clamp(-max, max);
    let closing = (body2.vel - body1.vel).dot(n);
    force += (closing * params.damping).clamp(-max, max);

    let share = config.dt / config.solver_iterations.max(1) as f32;
    let p = n * force * share * params.strength;
    body1.apply_const_impulse(p, state.r1);
    body2.apply_const_impulse(-p, state.r2);
}

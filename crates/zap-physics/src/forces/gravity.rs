use crate::api::config::SimConfig;
use crate::core::body::Body;

/// Constant downward pull, `gravity · units_per_meter · mass`.
pub fn apply(bodies: &mut [Body], config: &SimConfig) {
    let g = config.scaled_gravity();
    for body in bodies.iter_mut().filter(|b| !b.is_static()) {
        body.apply_const_force(g * body.mass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn pull_scales_with_mass_and_skips_static() {
        let config = SimConfig::default();
        let mut bodies = vec![
            Body::circle(Vec2::ZERO, 1.0, 2.0),
            Body::rectangle(Vec2::ZERO, 10.0, 1.0, 0.0).unwrap(),
        ];
        apply(&mut bodies, &config);
        assert!((bodies[0].acc().y + 9.81 * 10.0 * 2.0).abs() < 1e-3, "{:?}", bodies[0].acc());
        assert_eq!(bodies[1].acc(), Vec2::ZERO);
    }
}

use glam::Vec2;

use super::ContactGeometry;
use crate::core::body::Body;

/// Below this squared relative speed a separated pair is left alone.
const MIN_RELATIVE_SPEED_SQ: f32 = 1e-4;

/// Circle against circle, with the earliest touching time when the two are
/// still apart but close within `dt`.
pub fn circle_circle(b1: &Body, r1: f32, b2: &Body, r2: f32, dt: f32) -> Option<ContactGeometry> {
    let reach = r1 + r2;
    let delta = b2.pos - b1.pos;

    if delta.length_squared() < reach * reach {
        let normal = match delta.try_normalize() {
            Some(n) => n,
            None => Vec2::X,
        };
        return Some(ContactGeometry {
            pos: b1.pos + normal * r1,
            pos2: None,
            normal,
            depth: reach - delta.length(),
            time: 0.0,
        });
    }

    let dv = b1.vel - b2.vel;
    let speed_sq = dv.length_squared();
    if speed_sq < MIN_RELATIVE_SPEED_SQ {
        return None;
    }
    let dx = b1.pos - b2.pos;
    let cross = dx.perp_dot(dv);
    let disc = reach * reach * speed_sq - cross * cross;
    if disc < 0.0 {
        return None;
    }
    let t = -(dx.dot(dv) + disc.sqrt()) / speed_sq;
    if t > dt || t <= 0.0 {
        return None;
    }

    let c1 = b1.pos + b1.vel * t;
    let c2 = b2.pos + b2.vel * t;
    let normal = (c2 - c1).normalize_or_zero();
    Some(ContactGeometry {
        pos: c1 + normal * r1,
        pos2: None,
        normal,
        depth: 0.0,
        time: t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 40.0;

    fn ball(x: f32, y: f32, vx: f32) -> Body {
        Body::circle(Vec2::new(x, y), 1.0, 1.0).with_velocity(Vec2::new(vx, 0.0))
    }

    #[test]
    fn overlapping_circles_report_depth() {
        let a = ball(0.0, 0.0, 0.0);
        let b = ball(1.5, 0.0, 0.0);
        let c = circle_circle(&a, 1.0, &b, 1.0, DT).unwrap();
        assert!((c.depth - 0.5).abs() < 1e-5, "depth {}", c.depth);
        assert!((c.normal - Vec2::X).length() < 1e-6);
        assert!((c.pos - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert_eq!(c.time, 0.0);
    }

    #[test]
    fn concentric_circles_get_fallback_normal() {
        let a = ball(0.0, 0.0, 0.0);
        let b = ball(0.0, 0.0, 0.0);
        let c = circle_circle(&a, 1.0, &b, 1.0, DT).unwrap();
        assert!((c.normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fast_approach_is_caught_before_overlap() {
        // 0.5 apart, closing at 40 units/s: touch after 1/80 s.
        let a = ball(0.0, 0.0, 40.0);
        let b = ball(2.5, 0.0, 0.0);
        let c = circle_circle(&a, 1.0, &b, 1.0, DT).unwrap();
        assert!((c.time - 0.0125).abs() < 1e-5, "time {}", c.time);
        assert!((c.normal - Vec2::X).length() < 1e-5);
        assert!((c.pos.x - 1.5).abs() < 1e-4, "pos {:?}", c.pos);
    }

    #[test]
    fn receding_or_slow_pairs_do_not_collide() {
        let a = ball(0.0, 0.0, -40.0);
        let b = ball(2.5, 0.0, 0.0);
        assert!(circle_circle(&a, 1.0, &b, 1.0, DT).is_none());

        let a = ball(0.0, 0.0, 0.001);
        assert!(circle_circle(&a, 1.0, &b, 1.0, DT).is_none());
    }

    #[test]
    fn miss_beyond_this_step() {
        let a = ball(0.0, 0.0, 10.0);
        let b = ball(5.0, 0.0, 0.0);
        assert!(circle_circle(&a, 1.0, &b, 1.0, DT).is_none());
    }

    #[test]
    fn passing_paths_do_not_collide() {
        let a = ball(0.0, 0.0, 100.0);
        let b = ball(2.5, 3.0, 0.0);
        assert!(circle_circle(&a, 1.0, &b, 1.0, DT).is_none());
    }
}

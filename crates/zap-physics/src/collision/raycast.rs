use glam::Vec2;

use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::shape::{Polygon, Shape};

/// Where a ray meets a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyId,
    /// Nearer intersection along the ray.
    pub point: Vec2,
    /// Farther intersection, when the line crosses the shape twice.
    pub exit: Option<Vec2>,
}

/// Points where the infinite line through `origin` along `dir` crosses the
/// body's outline, nearer one first.
pub fn intersect(body: &Body, origin: Vec2, dir: Vec2) -> Option<(Vec2, Option<Vec2>)> {
    let (a, b) = match body.shape() {
        Shape::Circle { radius } => line_circle(origin, dir, body.pos(), *radius)?,
        Shape::Polygon(poly) => line_polygon(origin, dir, poly)?,
    };
    match b {
        Some(b) if (b - origin).dot(dir) < (a - origin).dot(dir) => Some((b, Some(a))),
        _ => Some((a, b)),
    }
}

fn line_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<(Vec2, Option<Vec2>)> {
    let dir = dir.normalize_or_zero();
    let oc = origin - center;
    let b = 2.0 * oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - 4.0 * c;
    // A grazing line counts as a miss.
    if disc <= 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t1 = (-b - sq) * 0.5;
    let t2 = (-b + sq) * 0.5;
    Some((origin + dir * t1, Some(origin + dir * t2)))
}

const VERTEX_EPS: f32 = 1e-10;

fn line_polygon(origin: Vec2, dir: Vec2, poly: &Polygon) -> Option<(Vec2, Option<Vec2>)> {
    let points = poly.points();
    let mut first = None;
    let mut second = None;
    for (i, &p1) in points.iter().enumerate() {
        let p2 = points[(i + 1) % points.len()];
        let Some(hit) = line_segment(origin, dir, p1, p2) else {
            continue;
        };
        // A line through a vertex meets both edges sharing it.
        let seen = |p: Option<Vec2>| p.is_some_and(|p| p.distance_squared(hit) < VERTEX_EPS);
        if seen(first) || seen(second) {
            continue;
        }
        if first.is_none() {
            first = Some(hit);
        } else {
            second = Some(hit);
        }
    }
    first.map(|f| (f, second))
}

/// Crossing of the line with the closed segment `p1..=p2`.
fn line_segment(origin: Vec2, dir: Vec2, p1: Vec2, p2: Vec2) -> Option<Vec2> {
    let edge = p2 - p1;
    let denom = dir.perp_dot(edge);
    if denom == 0.0 {
        return None;
    }
    let t = (p1 - origin).perp_dot(dir) / denom;
    if (0.0..=1.0).contains(&t) {
        Some(p1 + edge * t)
    } else {
        None
    }
}

/// Every body the ray enters in front of `origin`, beyond `min_dist`.
pub fn ray_cast_all<'a>(
    bodies: impl Iterator<Item = (BodyId, &'a Body)>,
    origin: Vec2,
    dir: Vec2,
    min_dist: f32,
) -> Vec<RayHit> {
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    bodies
        .filter_map(|(id, body)| {
            let (point, exit) = intersect(body, origin, dir)?;
            let ahead = (point - origin).dot(dir) > 0.0;
            let far_enough = point.distance_squared(origin) > min_dist * min_dist;
            (ahead && far_enough).then_some(RayHit { body: id, point, exit })
        })
        .collect()
}

/// Nearest body hit by the ray. Bodies containing the origin are skipped.
pub fn ray_cast<'a>(
    bodies: impl Iterator<Item = (BodyId, &'a Body)>,
    origin: Vec2,
    dir: Vec2,
    min_dist: f32,
) -> Option<RayHit> {
    let dir = dir.normalize_or_zero();
    let mut nearest: Option<(f32, RayHit)> = None;
    for hit in ray_cast_all(bodies, origin, dir, min_dist) {
        let dist = (hit.point - origin).dot(dir);
        if let Some(exit) = hit.exit {
            let exit_dist = (exit - origin).dot(dir);
            if dist.signum() != exit_dist.signum() {
                continue;
            }
        }
        if dist > min_dist && nearest.map_or(true, |(best, _)| dist < best) {
            nearest = Some((dist, hit));
        }
    }
    nearest.map(|(_, hit)| hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Vec<(BodyId, Body)> {
        vec![
            (BodyId(0), Body::circle(Vec2::new(10.0, 0.0), 1.0, 1.0)),
            (BodyId(1), Body::rectangle(Vec2::new(20.0, 0.0), 2.0, 2.0, 0.0).unwrap()),
            (BodyId(2), Body::circle(Vec2::new(-10.0, 0.0), 1.0, 1.0)),
        ]
    }

    fn refs(bodies: &[(BodyId, Body)]) -> impl Iterator<Item = (BodyId, &Body)> {
        bodies.iter().map(|(id, b)| (*id, b))
    }

    #[test]
    fn circle_hit_orders_entry_then_exit() {
        let bodies = scene();
        let hits = ray_cast_all(refs(&bodies), Vec2::ZERO, Vec2::X, 0.0);
        assert_eq!(hits.len(), 2);
        let circle = hits[0];
        assert_eq!(circle.body, BodyId(0));
        assert!((circle.point - Vec2::new(9.0, 0.0)).length() < 1e-4);
        assert!((circle.exit.unwrap() - Vec2::new(11.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn polygon_hit_crosses_two_edges() {
        let bodies = scene();
        let hits = ray_cast_all(refs(&bodies), Vec2::new(0.0, 0.5), Vec2::X, 0.0);
        let square = hits.iter().find(|h| h.body == BodyId(1)).unwrap();
        assert!((square.point - Vec2::new(19.0, 0.5)).length() < 1e-4, "{:?}", square);
        assert!((square.exit.unwrap() - Vec2::new(21.0, 0.5)).length() < 1e-4);
    }

    #[test]
    fn diagonal_through_corners_hits_once() {
        let bodies = scene();
        let hits = ray_cast_all(refs(&bodies), Vec2::new(17.0, -3.0), Vec2::ONE, 0.0);
        assert_eq!(hits.len(), 1);
        let square = hits[0];
        assert_eq!(square.body, BodyId(1));
        assert!((square.point - Vec2::new(19.0, -1.0)).length() < 1e-4, "{:?}", square);
        assert!((square.exit.unwrap() - Vec2::new(21.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn nearest_hit_wins_and_behind_is_ignored() {
        let bodies = scene();
        let hit = ray_cast(refs(&bodies), Vec2::ZERO, Vec2::new(3.0, 0.0), 0.0).unwrap();
        assert_eq!(hit.body, BodyId(0));
        let back = ray_cast(refs(&bodies), Vec2::ZERO, -Vec2::X, 0.0).unwrap();
        assert_eq!(back.body, BodyId(2));
    }

    #[test]
    fn tangent_ray_misses_circle() {
        let bodies = scene();
        let hits = ray_cast_all(refs(&bodies), Vec2::new(0.0, 1.0), Vec2::X, 0.0);
        assert!(hits.iter().all(|h| h.body != BodyId(0)));
    }

    #[test]
    fn origin_inside_body_is_skipped() {
        let bodies = scene();
        let hit = ray_cast(refs(&bodies), Vec2::new(10.0, 0.0), Vec2::X, 0.0).unwrap();
        assert_eq!(hit.body, BodyId(1));
    }

    #[test]
    fn min_dist_filters_close_hits() {
        let bodies = scene();
        let hit = ray_cast(refs(&bodies), Vec2::ZERO, Vec2::X, 15.0).unwrap();
        assert_eq!(hit.body, BodyId(1));
    }
}

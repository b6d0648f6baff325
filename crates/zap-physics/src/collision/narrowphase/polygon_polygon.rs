use glam::Vec2;

use super::ContactGeometry;
use crate::core::body::Body;
use crate::core::shape::Polygon;

/// Relative speed along a separating axis below which the gap never closes.
const MIN_AXIS_SPEED: f32 = 1e-4;

/// Vertices within this fraction of the smaller bounding radius of the
/// extreme vertex count as one supporting feature.
const SUPPORT_TOLERANCE: f32 = 0.003;

/// Swept separating-axis test between two convex polygons.
///
/// Axes are the edge normals of both polygons plus the normal of the
/// relative velocity. Overlapping axes yield a resting contact on the
/// shallowest one; separated axes must all close within `dt`, and then the
/// latest of those closing axes wins.
pub fn polygon_polygon(
    b1: &Body,
    p1: &Polygon,
    b2: &Body,
    p2: &Polygon,
    dt: f32,
    allowed_penetration: f32,
) -> Option<ContactGeometry> {
    let v = b2.vel - b1.vel;
    let reach = p1.radius() + p2.radius() + v.length() * dt;
    if reach * reach < b1.pos.distance_squared(b2.pos) {
        return None;
    }

    let velocity_axis = v.perp().try_normalize();
    let axes = p1
        .normals()
        .iter()
        .chain(p2.normals())
        .copied()
        .chain(velocity_axis);

    let mut min_depth = f32::INFINITY;
    let mut min_axis = None;
    let mut impact: Option<(f32, Vec2)> = None;

    for axis in axes {
        let (lo1, hi1) = p1.project(axis);
        let (lo2, hi2) = p2.project(axis);
        let gap1 = lo1 - hi2;
        let gap2 = lo2 - hi1;

        if gap1 > 0.0 || gap2 > 0.0 {
            let vn = axis.dot(v);
            if vn.abs() < MIN_AXIS_SPEED {
                return None;
            }
            let (mut t1, mut t2) = (gap1 / vn, -gap2 / vn);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            let t = if t1 > 0.0 { t1 } else { t2 };
            if t > dt || t < 0.0 {
                return None;
            }
            if impact.map_or(true, |(latest, _)| t > latest) {
                impact = Some((t, axis));
            }
        } else {
            let depth = gap1.abs().min(gap2.abs());
            if depth < min_depth {
                min_depth = depth;
                min_axis = Some(axis);
            }
        }
    }

    let (time, axis) = match (impact, min_axis) {
        (Some(hit), _) => hit,
        (None, Some(axis)) => (0.0, axis),
        (None, None) => return None,
    };
    let normal = if (b2.pos - b1.pos).dot(axis) < 0.0 {
        -axis
    } else {
        axis
    };

    let tolerance = p1.radius().min(p2.radius()) * SUPPORT_TOLERANCE;
    let (pos, pos2) = manifold(p1, p2, normal, tolerance);
    let depth = if time > 0.0 {
        allowed_penetration
    } else {
        min_depth
    };

    Some(ContactGeometry {
        pos,
        pos2,
        normal,
        depth,
        time,
    })
}

/// Supporting feature of `points` in direction `dir`: one vertex, or the two
/// tangential extremes of a near-flat edge.
fn support(points: &[Vec2], dir: Vec2, tolerance: f32) -> (Vec2, Option<Vec2>) {
    let best = points
        .iter()
        .map(|p| p.dot(dir))
        .fold(f32::NEG_INFINITY, f32::max);
    let tangent = dir.perp();

    let mut lo: Option<Vec2> = None;
    let mut hi: Option<Vec2> = None;
    let mut count = 0;
    for p in points.iter().copied().filter(|p| best - p.dot(dir) <= tolerance) {
        count += 1;
        if lo.map_or(true, |q| p.dot(tangent) < q.dot(tangent)) {
            lo = Some(p);
        }
        if hi.map_or(true, |q| p.dot(tangent) > q.dot(tangent)) {
            hi = Some(p);
        }
    }
    match (lo, hi) {
        (Some(a), Some(b)) if count > 1 => (a, Some(b)),
        (Some(a), _) => (a, None),
        _ => (points[0], None),
    }
}

/// Contact points between the supporting features facing each other along
/// `normal` (pointing from `p1` to `p2`).
fn manifold(p1: &Polygon, p2: &Polygon, normal: Vec2, tolerance: f32) -> (Vec2, Option<Vec2>) {
    let s1 = support(p1.points(), normal, tolerance);
    let s2 = support(p2.points(), -normal, tolerance);

    match (s1, s2) {
        ((a, None), (b, None)) => ((a + b) * 0.5, None),
        ((a1, Some(a2)), (b1, Some(b2))) => clip_edges(normal, (a1, a2), (b1, b2)),
        ((v, None), (l1, Some(l2))) | ((l1, Some(l2)), (v, None)) => {
            (project_on_line(v, l1, l2), None)
        }
    }
}

/// Overlap of two facing edges along the contact tangent.
fn clip_edges(normal: Vec2, e1: (Vec2, Vec2), e2: (Vec2, Vec2)) -> (Vec2, Option<Vec2>) {
    let tangent = normal.perp();
    let ordered = |(a, b): (Vec2, Vec2)| {
        if a.dot(tangent) <= b.dot(tangent) {
            (a, b)
        } else {
            (b, a)
        }
    };
    let (lo1, hi1) = ordered(e1);
    let (lo2, hi2) = ordered(e2);

    let lo = if lo1.dot(tangent) < lo2.dot(tangent) {
        lo2
    } else {
        lo1
    };
    let hi = if hi1.dot(tangent) > hi2.dot(tangent) {
        hi2
    } else {
        hi1
    };
    if lo.dot(tangent) > hi.dot(tangent) {
        return ((lo + hi) * 0.5, None);
    }
    (lo, Some(hi))
}

fn project_on_line(p: Vec2, l1: Vec2, l2: Vec2) -> Vec2 {
    let dir = (l2 - l1).normalize_or_zero();
    l1 + dir * (p - l1).dot(dir)
}

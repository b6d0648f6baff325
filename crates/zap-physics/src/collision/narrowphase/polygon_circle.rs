use glam::Vec2;

use super::ContactGeometry;
use crate::core::shape::Polygon;

/// Separating-axis test of a polygon against a circle at `center`.
///
/// Candidate axes are the polygon's edge normals and the directions from each
/// vertex to the circle centre. The normal of the result points from the
/// polygon towards the circle.
pub fn polygon_circle(
    poly_pos: Vec2,
    poly: &Polygon,
    center: Vec2,
    radius: f32,
) -> Option<ContactGeometry> {
    let vertex_axes = poly
        .points()
        .iter()
        .filter_map(|p| (*p - center).try_normalize());
    let axes = poly.normals().iter().copied().chain(vertex_axes);

    let mut min_depth = f32::INFINITY;
    let mut min_axis = None;
    for axis in axes {
        let (p_min, p_max) = poly.project(axis);
        let c = center.dot(axis);
        let (c_min, c_max) = (c - radius, c + radius);
        if p_max < c_min || c_max < p_min {
            return None;
        }
        let depth = (p_max - c_min).abs().min((c_max - p_min).abs());
        if depth < min_depth {
            min_depth = depth;
            min_axis = Some(axis);
        }
    }

    let mut normal = min_axis?;
    if (center - poly_pos).dot(normal) < 0.0 {
        normal = -normal;
    }

    let support = poly
        .points()
        .iter()
        .copied()
        .fold((f32::NEG_INFINITY, Vec2::ZERO), |(best, point), p| {
            let d = p.dot(normal);
            if d > best {
                (d, p)
            } else {
                (best, point)
            }
        })
        .1;
    let tangent = normal.perp();

    Some(ContactGeometry {
        pos: support + tangent * (center - support).dot(tangent),
        pos2: None,
        normal,
        depth: min_depth,
        time: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::body::Body;
    use crate::core::shape::Shape;

    fn ground() -> Body {
        Body::rectangle(Vec2::ZERO, 20.0, 2.0, 0.0).unwrap()
    }

    fn poly(body: &Body) -> &Polygon {
        match body.shape() {
            Shape::Polygon(p) => p,
            Shape::Circle { .. } => panic!("expected polygon"),
        }
    }

    #[test]
    fn circle_resting_on_box_top() {
        let g = ground();
        let c = polygon_circle(g.pos(), poly(&g), Vec2::new(2.0, 1.9), 1.0).unwrap();
        assert!((c.normal - Vec2::Y).length() < 1e-5, "normal {:?}", c.normal);
        assert!((c.depth - 0.1).abs() < 1e-4, "depth {}", c.depth);
        assert!((c.pos - Vec2::new(2.0, 1.0)).length() < 1e-4, "pos {:?}", c.pos);
    }

    #[test]
    fn circle_below_box_points_down() {
        let g = ground();
        let c = polygon_circle(g.pos(), poly(&g), Vec2::new(-3.0, -1.5), 1.0).unwrap();
        assert!((c.normal + Vec2::Y).length() < 1e-5, "normal {:?}", c.normal);
    }

    #[test]
    fn separated_circle_is_rejected() {
        let g = ground();
        assert!(polygon_circle(g.pos(), poly(&g), Vec2::new(0.0, 3.0), 1.0).is_none());
        // Near a corner but outside the rounded region.
        assert!(polygon_circle(g.pos(), poly(&g), Vec2::new(10.8, 1.8), 1.0).is_none());
    }

    #[test]
    fn corner_contact_uses_vertex_axis() {
        let g = ground();
        let center = Vec2::new(10.5, 1.5);
        let c = polygon_circle(g.pos(), poly(&g), center, 1.0).unwrap();
        let expected = (center - Vec2::new(10.0, 1.0)).normalize();
        assert!((c.normal - expected).length() < 1e-4, "normal {:?}", c.normal);
        assert!((c.pos - Vec2::new(10.0, 1.0)).length() < 1e-4, "pos {:?}", c.pos);
        assert!((c.normal.length() - 1.0).abs() < 1e-5);
    }
}

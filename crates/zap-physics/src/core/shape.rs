use glam::Vec2;

use crate::error::PhysicsError;

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Collision geometry owned by exactly one body.
///
/// Everything is expressed relative to the owning body's position, which is
/// always the shape's centroid.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon(Polygon),
}

/// Coarse shape tag used for narrowphase dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Polygon,
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle {
            radius: radius.abs(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Polygon(poly) => poly.area(),
        }
    }

    /// Moment of inertia about the centroid for the given mass.
    pub fn inertia(&self, mass: f32) -> f32 {
        match self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Polygon(poly) => poly.inertia(mass),
        }
    }

    /// Radius of the smallest centroid-centred circle enclosing the shape.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon(poly) => poly.radius,
        }
    }

    /// Move world-space geometry to the body's current pose.
    pub fn update(&mut self, pos: Vec2, rot: Vec2) {
        if let Shape::Polygon(poly) = self {
            poly.update(pos, rot);
        }
    }

    /// Half width and half height of the world-space bounding box.
    pub fn half_extents(&self, pos: Vec2) -> Vec2 {
        match self {
            Shape::Circle { radius } => Vec2::splat(*radius),
            Shape::Polygon(poly) => poly
                .points
                .iter()
                .fold(Vec2::ZERO, |acc, p| acc.max((*p - pos).abs())),
        }
    }

    /// `(min, max)` of the shape projected on `axis`.
    pub fn project(&self, pos: Vec2, axis: Vec2) -> (f32, f32) {
        match self {
            Shape::Circle { radius } => {
                let c = pos.dot(axis);
                (c - radius, c + radius)
            }
            Shape::Polygon(poly) => poly.project(axis),
        }
    }
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// Convex polygon with counter-clockwise winding.
///
/// Edge `i` runs from `points[i]` to `points[i + 1]`; its outward normal is
/// the edge direction rotated clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    offsets: Vec<Vec2>,
    points: Vec<Vec2>,
    edges: Vec<Vec2>,
    normals: Vec<Vec2>,
    radius: f32,
}

impl Polygon {
    /// Build a polygon from vertices given in any winding.
    ///
    /// Returns the polygon together with the centroid of the input vertices;
    /// the owning body must be placed at that centroid.
    pub fn new(vertices: &[Vec2]) -> Result<(Self, Vec2), PhysicsError> {
        let degenerate = PhysicsError::DegeneratePolygon {
            vertices: vertices.len(),
        };
        if vertices.len() < 3 {
            return Err(degenerate);
        }
        let area = signed_area(vertices);
        if area.abs() <= f32::EPSILON {
            return Err(degenerate);
        }
        let centroid = centroid(vertices, area);

        let mut offsets: Vec<Vec2> = vertices.iter().map(|v| *v - centroid).collect();
        if area < 0.0 {
            offsets.reverse();
        }
        if !is_convex(&offsets) {
            log::warn!(
                "polygon with {} vertices is not convex, collisions will be wrong",
                offsets.len()
            );
        }

        let radius = offsets.iter().map(|o| o.length()).fold(0.0, f32::max);
        let n = offsets.len();
        let mut poly = Polygon {
            points: offsets.clone(),
            edges: vec![Vec2::ZERO; n],
            normals: vec![Vec2::ZERO; n],
            offsets,
            radius,
        };
        poly.update(Vec2::ZERO, Vec2::X);
        Ok((poly, centroid))
    }

    /// Axis-aligned box centred on the origin.
    pub fn rectangle(width: f32, height: f32) -> Result<Self, PhysicsError> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let corners = [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ];
        Polygon::new(&corners).map(|(poly, _)| poly)
    }

    fn update(&mut self, pos: Vec2, rot: Vec2) {
        let n = self.offsets.len();
        for (point, offset) in self.points.iter_mut().zip(&self.offsets) {
            *point = rot.rotate(*offset) + pos;
        }
        for i in 0..n {
            let edge = (self.points[(i + 1) % n] - self.points[i]).normalize_or_zero();
            self.edges[i] = edge;
            self.normals[i] = Vec2::new(edge.y, -edge.x);
        }
    }

    pub fn area(&self) -> f32 {
        signed_area(&self.offsets).abs()
    }

    pub fn inertia(&self, mass: f32) -> f32 {
        let n = self.offsets.len();
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..n {
            let a = self.offsets[i];
            let b = self.offsets[(i + 1) % n];
            let cross = b.perp_dot(a).abs();
            numerator += cross * (a.length_squared() + b.length_squared() + a.dot(b));
            denominator += cross;
        }
        numerator / denominator * mass / 6.0
    }

    pub fn project(&self, axis: Vec2) -> (f32, f32) {
        self.points
            .iter()
            .map(|p| p.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    /// World-space vertices, counter-clockwise.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Vertices relative to the centroid in body space.
    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    /// World-space unit edge directions.
    pub fn edges(&self) -> &[Vec2] {
        &self.edges
    }

    /// World-space outward unit edge normals.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut a = 0.0;
    for i in 0..n {
        let j = (i + n - 1) % n;
        a += points[j].perp_dot(points[i]);
    }
    a * 0.5
}

fn centroid(points: &[Vec2], area: f32) -> Vec2 {
    let n = points.len();
    let mut c = Vec2::ZERO;
    for i in 0..n {
        let j = (i + n - 1) % n;
        c += (points[i] + points[j]) * points[j].perp_dot(points[i]);
    }
    c / (6.0 * area)
}

fn is_convex(ccw: &[Vec2]) -> bool {
    let n = ccw.len();
    (0..n).all(|i| {
        let a = ccw[(i + 1) % n] - ccw[i];
        let b = ccw[(i + 2) % n] - ccw[(i + 1) % n];
        a.perp_dot(b) >= -1e-6
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(side, 0.0),
            Vec2::new(side, side),
            Vec2::new(0.0, side),
        ]
    }

    #[test]
    fn polygon_recenters_on_centroid() {
        let (poly, centroid) = Polygon::new(&square(2.0)).unwrap();
        assert!((centroid - Vec2::new(1.0, 1.0)).length() < 1e-5, "centroid {:?}", centroid);
        let sum: Vec2 = poly.offsets().iter().copied().sum();
        assert!(sum.length() < 1e-5, "offsets should be centred, sum {:?}", sum);
        assert!((poly.radius() - 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn clockwise_input_is_rewound() {
        let mut cw = square(1.0);
        cw.reverse();
        let (poly, _) = Polygon::new(&cw).unwrap();
        assert!(signed_area(poly.offsets()) > 0.0);
        // Outward normals point away from the centroid.
        for (p, n) in poly.points().iter().zip(poly.normals()) {
            assert!(p.dot(*n) > 0.0, "normal {:?} at {:?} points inward", n, p);
        }
    }

    #[test]
    fn rectangle_inertia_matches_closed_form() {
        let poly = Polygon::rectangle(2.0, 4.0).unwrap();
        let m = 3.0;
        let expected = m * (2.0 * 2.0 + 4.0 * 4.0) / 12.0;
        assert!((poly.inertia(m) - expected).abs() < 1e-4, "inertia {}", poly.inertia(m));
        assert!((poly.area() - 8.0).abs() < 1e-5);
    }

    #[test]
    fn circle_inertia_is_half_m_r_squared() {
        let circle = Shape::circle(2.0);
        assert!((circle.inertia(4.0) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_polygons_are_rejected() {
        let line = [Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)];
        assert!(matches!(
            Polygon::new(&line),
            Err(PhysicsError::DegeneratePolygon { vertices: 3 })
        ));
        assert!(Polygon::new(&[Vec2::ZERO, Vec2::X]).is_err());
    }

    #[test]
    fn rotated_extents_grow() {
        let mut shape = Shape::Polygon(Polygon::rectangle(2.0, 2.0).unwrap());
        let pos = Vec2::new(5.0, 5.0);
        shape.update(pos, Vec2::X);
        let flat = shape.half_extents(pos);
        assert!((flat - Vec2::ONE).length() < 1e-5);
        shape.update(pos, Vec2::from_angle(std::f32::consts::FRAC_PI_4));
        let turned = shape.half_extents(pos);
        assert!((turned.x - 2f32.sqrt()).abs() < 1e-4, "extents {:?}", turned);
    }
}

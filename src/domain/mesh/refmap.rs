use super::element::ElementShape;
use super::space::{Point, V2D};
use nalgebra::{Rotation2, Vector2};

/// Reference-domain corners of a Triangle: `(-1, -1), (1, -1), (-1, 1)`
pub const TRIANGLE_CORNERS: [V2D; 3] = [
    V2D::from([-1.0, -1.0]),
    V2D::from([1.0, -1.0]),
    V2D::from([-1.0, 1.0]),
];

/// Reference-domain corners of a Quad: the square `[-1, 1]²` counter-clockwise from `(-1, -1)`
pub const QUAD_CORNERS: [V2D; 4] = [
    V2D::from([-1.0, -1.0]),
    V2D::from([1.0, -1.0]),
    V2D::from([1.0, 1.0]),
    V2D::from([-1.0, 1.0]),
];

pub fn reference_corners(shape: ElementShape) -> &'static [V2D] {
    match shape {
        ElementShape::Triangle => &TRIANGLE_CORNERS,
        ElementShape::Quad => &QUAD_CORNERS,
    }
}

/// A circular arc between two Points, bulging to the right of `start -> end` for positive angles
#[derive(Clone, Copy, Debug)]
pub struct CircularArc {
    center: Vector2<f64>,
    start: Vector2<f64>,
    angle: f64,
}

impl CircularArc {
    pub fn new(start: Point, end: Point, angle: f64) -> Self {
        let a = Vector2::new(start.x, start.y);
        let b = Vector2::new(end.x, end.y);

        let chord = b - a;
        let half_length = chord.norm() / 2.0;
        let dir = chord / (2.0 * half_length);
        let right_normal = Vector2::new(dir.y, -dir.x);

        let half_angle = angle.abs() / 2.0;
        let radius = half_length / half_angle.sin();
        let center = (a + b) / 2.0 - right_normal * (angle.signum() * radius * half_angle.cos());

        Self {
            center,
            start: a,
            angle,
        }
    }

    /// Point at parameter `t` in `[0, 1]` along the arc
    pub fn point(&self, t: f64) -> Point {
        let p = self.center + Rotation2::new(self.angle * t) * (self.start - self.center);
        Point::new(p.x, p.y)
    }
}

/// Map a reference point into real space
///
/// Straight Elements use the affine (Triangle) or bilinear (Quad) map of their corners. Curved Edges are blended in
/// transfinitely, such that the mapped Element boundary follows each arc exactly.
///
/// `arcs[k]` is the angle of local edge `k` relative to its traversal direction.
pub fn map_to_physical(shape: ElementShape, corners: &[Point], arcs: &[Option<f64>], r: V2D) -> Point {
    match shape {
        ElementShape::Triangle => map_triangle(corners, arcs, r),
        ElementShape::Quad => map_quad(corners, arcs, r),
    }
}

fn map_triangle(p: &[Point], arcs: &[Option<f64>], r: V2D) -> Point {
    let l1 = (r[0] + 1.0) / 2.0;
    let l2 = (r[1] + 1.0) / 2.0;
    let lambda = [1.0 - l1 - l2, l1, l2];

    let linear = p[0] * lambda[0] + p[1] * lambda[1] + p[2] * lambda[2];

    (0..3).fold(linear, |acc, k| match arcs.get(k).copied().flatten() {
        Some(angle) => {
            let next = (k + 1) % 3;
            let weight = lambda[k] + lambda[next];
            if weight < 1e-14 {
                acc
            } else {
                let t = lambda[next] / weight;
                acc + edge_deviation(p[k], p[next], angle, t) * weight
            }
        }
        None => acc,
    })
}

fn map_quad(p: &[Point], arcs: &[Option<f64>], r: V2D) -> Point {
    let u = (r[0] + 1.0) / 2.0;
    let v = (r[1] + 1.0) / 2.0;

    let linear = p[0] * ((1.0 - u) * (1.0 - v))
        + p[1] * (u * (1.0 - v))
        + p[2] * (u * v)
        + p[3] * ((1.0 - u) * v);

    // (edge parameter, blending weight) for each edge in traversal order
    let blend = [(u, 1.0 - v), (v, u), (1.0 - u, v), (1.0 - v, 1.0 - u)];

    (0..4).fold(linear, |acc, k| match arcs.get(k).copied().flatten() {
        Some(angle) => {
            let (t, weight) = blend[k];
            acc + edge_deviation(p[k], p[(k + 1) % 4], angle, t) * weight
        }
        None => acc,
    })
}

// arc position minus the straight-line position at parameter t
fn edge_deviation(a: Point, b: Point, angle: f64, t: f64) -> Point {
    CircularArc::new(a, b, angle).point(t) - (a * (1.0 - t) + b * t)
}

/// Area of a polygon given its vertices in counter-clockwise order (negative when clockwise)
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

pub type Point = Point3<f64>;
pub type Vector = Vector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BBox3 {
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn include_point(&mut self, point: &Point) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(point[i]);
            self.max[i] = self.max[i].max(point[i]);
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    pub fn min_z(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.min[2])
        }
    }
}

pub fn bbox_of(points: &[Point]) -> BBox3 {
    let mut bbox = BBox3::empty();
    for p in points {
        bbox.include_point(p);
    }
    bbox
}

/// Newell's method. The length of the returned vector is twice the polygon
/// area and its direction follows the right-hand rule over the loop.
pub fn area_vector(points: &[Point]) -> Vector {
    let n = points.len();
    let mut acc = Vector::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc.x += (a.y - b.y) * (a.z + b.z);
        acc.y += (a.z - b.z) * (a.x + b.x);
        acc.z += (a.x - b.x) * (a.y + b.y);
    }
    acc
}

pub fn area(points: &[Point]) -> f64 {
    area_vector(points).norm() * 0.5
}

pub fn unit_normal(points: &[Point]) -> Option<Vector> {
    let v = area_vector(points);
    let len = v.norm();
    if !len.is_finite() || len < 1e-12 {
        return None;
    }
    Some(v / len)
}

pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::origin();
    }
    let mut acc = Vector::zeros();
    for p in points {
        acc += p.coords;
    }
    Point::from(acc / points.len() as f64)
}

/// Largest distance of any point from the plane through the centroid with the
/// given unit normal.
pub fn plane_deviation(points: &[Point], normal: &Vector) -> f64 {
    let c = centroid(points);
    points
        .iter()
        .map(|p| (p - c).dot(normal).abs())
        .fold(0.0, f64::max)
}

/// True when the loops' area vectors cancel out, as they do for any closed
/// shell. Only then is the signed volume independent of the origin.
pub fn is_closed_shell(loops: &[&[Point]]) -> bool {
    let mut net = Vector::zeros();
    let mut total = 0.0;
    for pts in loops {
        let v = area_vector(pts);
        net += v;
        total += v.norm();
    }
    total > 0.0 && net.norm() <= total * 1e-6
}

/// Six times the signed volume enclosed by a set of planar loops, positive when
/// the loops are wound counter-clockwise seen from outside.
pub fn signed_volume6<'a>(loops: impl IntoIterator<Item = &'a [Point]>) -> f64 {
    let mut total = 0.0;
    for pts in loops {
        if pts.len() < 3 {
            continue;
        }
        let origin = pts[0];
        for i in 1..pts.len() - 1 {
            let a = pts[i].coords - origin.coords;
            let b = pts[i + 1].coords - origin.coords;
            total += origin.coords.dot(&a.cross(&b));
        }
    }
    total
}

/// Drops the axis where the normal is largest so the loop can be tested in 2D.
pub fn project_to_plane(points: &[Point], normal: &Vector) -> Vec<Point2<f64>> {
    let ax = normal.x.abs();
    let ay = normal.y.abs();
    let az = normal.z.abs();
    points
        .iter()
        .map(|p| {
            if az >= ax && az >= ay {
                Point2::new(p.x, p.y)
            } else if ay >= ax {
                Point2::new(p.z, p.x)
            } else {
                Point2::new(p.y, p.z)
            }
        })
        .collect()
}

/// True when two non-adjacent edges of the loop cross or touch.
pub fn is_self_intersecting(points: &[Point2<f64>], eps: f64) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a1 = points[i];
        let a2 = points[(i + 1) % n];
        for j in (i + 1)..n {
            // Neighbouring edges share a vertex by construction.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b1 = points[j];
            let b2 = points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2, eps) {
                return true;
            }
        }
    }
    false
}

fn segments_intersect(
    p1: Point2<f64>,
    p2: Point2<f64>,
    q1: Point2<f64>,
    q2: Point2<f64>,
    eps: f64,
) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let r_cross_s = perp_dot(r, s);
    let q_minus_p = q1 - p1;

    if r_cross_s.abs() < eps * eps {
        // Parallel. Only collinear overlap counts.
        if perp_dot(q_minus_p, r).abs() > eps * r.norm().max(eps) {
            return false;
        }
        let rr = r.norm_squared();
        if rr < eps * eps {
            return false;
        }
        let t0 = q_minus_p.dot(&r) / rr;
        let t1 = (q2 - p1).dot(&r) / rr;
        let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        return hi >= -1e-9 && lo <= 1.0 + 1e-9;
    }

    let t = perp_dot(q_minus_p, s) / r_cross_s;
    let u = perp_dot(q_minus_p, r) / r_cross_s;
    let tol = 1e-9;
    t >= -tol && t <= 1.0 + tol && u >= -tol && u <= 1.0 + tol
}

fn perp_dot(v1: Vector2<f64>, v2: Vector2<f64>) -> f64 {
    v1.x * v2.y - v1.y * v2.x
}

//! Polygon encoding for surfaces, openings and shades.
//!
//! dsbXML has no orientation flag: a loop must already run counter-clockwise
//! seen from outside. Loops wound the other way are reversed here. Degenerate
//! loops are rejected, never repaired.

use crate::accessor::Polygon;
use crate::error::{Result, TranslateError};
use crate::geom::{
    area, is_closed_shell, is_self_intersecting, plane_deviation, project_to_plane, signed_volume6,
    unit_normal, Point, Vector,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoordinateMode {
    /// z measured from the story's base elevation.
    #[default]
    StoryRelative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Keep,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoryFrame {
    pub base_elevation: f64,
}

/// What is being encoded. All variants carry the same payload; the tag decides
/// how it is placed in the document.
#[derive(Debug, Clone, Copy)]
pub enum GeometryEntity<'a> {
    Face(&'a Polygon),
    Aperture(&'a Polygon),
    Door(&'a Polygon),
    Shade(&'a Polygon),
}

impl<'a> GeometryEntity<'a> {
    pub fn payload(&self) -> &'a Polygon {
        match self {
            GeometryEntity::Face(p)
            | GeometryEntity::Aperture(p)
            | GeometryEntity::Door(p)
            | GeometryEntity::Shade(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FragmentKind {
    Surface,
    Window,
    Door,
    Shade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFragment {
    pub kind: FragmentKind,
    pub identifier: String,
    pub vertices: Vec<Point>,
    pub normal: Vector,
    pub area: f64,
    pub reversed: bool,
}

#[derive(Debug, Clone)]
pub struct GeometryEncoder {
    tolerance: f64,
    /// Degrees.
    angle_tolerance: f64,
    mode: CoordinateMode,
}

impl GeometryEncoder {
    pub fn new(tolerance: f64, mode: CoordinateMode) -> Self {
        Self {
            tolerance: if tolerance.is_finite() && tolerance > 0.0 {
                tolerance
            } else {
                1e-6
            },
            angle_tolerance: 1.0,
            mode,
        }
    }

    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        if degrees.is_finite() && degrees >= 0.0 {
            self.angle_tolerance = degrees;
        }
        self
    }

    pub fn encode(
        &self,
        entity: GeometryEntity<'_>,
        frame: Option<&StoryFrame>,
        winding: Winding,
    ) -> Result<GeometryFragment> {
        let polygon = entity.payload();
        let mut vertices = self.validate(polygon)?;

        let kind = match entity {
            GeometryEntity::Face(_) => FragmentKind::Surface,
            GeometryEntity::Aperture(_) => FragmentKind::Window,
            GeometryEntity::Door(_) => FragmentKind::Door,
            GeometryEntity::Shade(_) => FragmentKind::Shade,
        };
        // Shades are two-sided in the simulation; only enclosing geometry is reoriented.
        let reversed = match entity {
            GeometryEntity::Shade(_) => false,
            GeometryEntity::Face(_) | GeometryEntity::Aperture(_) | GeometryEntity::Door(_) => {
                winding == Winding::Reverse
            }
        };
        if reversed {
            reverse_loop(&mut vertices);
        }

        if let (CoordinateMode::StoryRelative, Some(frame)) = (self.mode, frame) {
            for p in &mut vertices {
                p.z -= frame.base_elevation;
            }
        }

        let normal = unit_normal(&vertices).unwrap_or_else(Vector::zeros);
        let area = area(&vertices);
        Ok(GeometryFragment {
            kind,
            identifier: polygon.identifier.clone(),
            vertices,
            normal,
            area,
            reversed,
        })
    }

    /// Returns the loop without an explicit closing vertex, or the reason it
    /// cannot be exported.
    pub fn validate(&self, polygon: &Polygon) -> Result<Vec<Point>> {
        let tol = self.tolerance;
        let fail = |reason: String| TranslateError::geometry(&polygon.identifier, reason);

        if let Some(p) = polygon
            .points
            .iter()
            .find(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(fail(format!("non-finite coordinate {p:?}")));
        }

        let mut pts = polygon.points.clone();
        if pts.len() > 3 && same_point(&pts[0], &pts[pts.len() - 1], tol) {
            pts.pop();
        }

        let distinct = count_distinct(&pts, tol);
        if distinct < 3 {
            return Err(fail(format!(
                "loop has {} distinct point(s); at least 3 are required",
                distinct
            )));
        }

        let n = pts.len();
        for i in 0..n {
            let j = (i + 1) % n;
            if same_point(&pts[i], &pts[j], tol) {
                return Err(fail(format!("vertices {i} and {j} coincide")));
            }
        }

        if area(&pts) < tol * tol {
            return Err(fail("loop has no area (points are collinear)".to_string()));
        }

        if let Some(normal) = unit_normal(&pts) {
            let deviation = plane_deviation(&pts, &normal);
            if deviation > tol {
                return Err(fail(format!(
                    "loop is not planar (a vertex lies {deviation:.4} m off its plane)"
                )));
            }
            let planar = project_to_plane(&pts, &normal);
            if is_self_intersecting(&planar, tol) {
                return Err(fail("loop intersects itself".to_string()));
            }
        }

        Ok(pts)
    }

    /// A closed room whose face loops enclose a negative volume is wound
    /// inward. Open rooms have no inside and keep their loops as given.
    pub fn room_winding<'a>(&self, loops: impl IntoIterator<Item = &'a [Point]>) -> Winding {
        let loops: Vec<&[Point]> = loops.into_iter().collect();
        if !is_closed_shell(&loops) {
            return Winding::Keep;
        }
        if signed_volume6(loops.iter().copied()) < -(self.tolerance.powi(3)) {
            Winding::Reverse
        } else {
            Winding::Keep
        }
    }

    /// An extruded floor plate: a closed room whose faces are all horizontal or
    /// vertical, with the horizontal ones on exactly two levels.
    pub fn is_extrusion<'a>(&self, loops: impl IntoIterator<Item = &'a [Point]>) -> bool {
        let loops: Vec<&[Point]> = loops.into_iter().collect();
        if !is_closed_shell(&loops) {
            return false;
        }
        let angle = self.angle_tolerance.to_radians();
        let (vertical, horizontal) = (angle.sin(), angle.cos());
        let mut levels: Vec<f64> = Vec::new();
        for pts in &loops {
            let Some(normal) = unit_normal(pts) else {
                return false;
            };
            if normal.z.abs() <= vertical {
                continue;
            }
            if normal.z.abs() < horizontal {
                return false;
            }
            let z = pts[0].z;
            if pts.iter().any(|p| (p.z - z).abs() > self.tolerance) {
                return false;
            }
            if !levels.iter().any(|l| (l - z).abs() <= self.tolerance) {
                levels.push(z);
            }
        }
        levels.len() == 2
    }

    /// Sub-faces must face the same way as their (already oriented) parent.
    pub fn sub_face_winding(&self, parent_normal: &Vector, sub_face: &Polygon) -> Winding {
        match unit_normal(&sub_face.points) {
            Some(n) if n.dot(parent_normal) < 0.0 => Winding::Reverse,
            _ => Winding::Keep,
        }
    }
}

/// Keeps the first vertex in place and reverses the rest.
pub fn reverse_loop(points: &mut [Point]) {
    if points.len() > 1 {
        points[1..].reverse();
    }
}

fn same_point(a: &Point, b: &Point, tol: f64) -> bool {
    (a - b).norm() <= tol
}

fn count_distinct(points: &[Point], tol: f64) -> usize {
    let mut distinct: Vec<&Point> = Vec::new();
    for p in points {
        if !distinct.iter().any(|q| same_point(p, q, tol)) {
            distinct.push(p);
        }
    }
    distinct.len()
}

//! Separating-axis collision geometry for convex polygons.
//!
//! All polygons are wound counter-clockwise in world space (y up), so the outward normal of the
//! edge `u -> v` is `(v - u).orthog()`.

use crate::core::prelude::*;
use crate::util::gg_iter::GgFloatIter;
use crate::util::{gg_float, gg_range};
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// How two shapes relate along their contact normal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactState {
    Separated,
    Touching,
    Penetrating,
}

impl ContactState {
    /// Classifies a signed separation: within [`EPSILON`] of zero is touching, negative is
    /// penetrating, positive is separated.
    pub fn of(separation: f64) -> Self {
        Self::with_tolerance(separation, EPSILON)
    }

    /// As [`ContactState::of`], but with a caller-chosen band around zero.
    pub fn with_tolerance(separation: f64, tolerance: f64) -> Self {
        if separation.abs() < tolerance {
            Self::Touching
        } else if separation < 0.0 {
            Self::Penetrating
        } else {
            Self::Separated
        }
    }
}

impl Display for ContactState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Separated => write!(f, "separated"),
            Self::Touching => write!(f, "touching"),
            Self::Penetrating => write!(f, "penetrating"),
        }
    }
}

/// Result of the separating-axis test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SatResult {
    /// `axis` separates the shapes with a gap of `gap > 0`.
    Separated { axis: Vec2, gap: f64 },
    /// No separating axis exists. `normal` is the axis of least overlap, pointing from the second
    /// shape towards the first, and `depth >= 0` is the overlap along it.
    Overlapping { normal: Vec2, depth: f64 },
}

impl SatResult {
    /// The signed separation: the gap if separated, minus the depth if overlapping.
    pub fn separation(&self) -> f64 {
        match self {
            Self::Separated { gap, .. } => *gap,
            Self::Overlapping { depth, .. } => -depth,
        }
    }

    pub fn state(&self) -> ContactState {
        ContactState::of(self.separation())
    }
}

/// The closest features of two shapes, as seen from the face with the largest separation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Unit normal pointing away from the second shape, towards the first.
    pub normal: Vec2,
    /// Signed distance along `normal`; negative when the shapes interpenetrate.
    pub separation: f64,
    /// World-space point at which an impulse should be applied.
    pub point: Vec2,
}

impl Contact {
    pub fn state(&self) -> ContactState {
        ContactState::of(self.separation)
    }
}

/// A convex polygon with counter-clockwise winding.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Creates a polygon from the vertices of a convex shape, given in either winding order.
    pub fn new(mut vertices: Vec<Vec2>) -> Self {
        check_le!(3, vertices.len());
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    /// An oriented box: a rectangle of the given half-widths, rotated counter-clockwise about its
    /// centre.
    pub fn oriented_box(centre: Vec2, half_widths: Vec2, rotation: Angle) -> Self {
        let Vec2 { x: w, y: h } = half_widths.abs();
        let vertices = [
            Vec2 { x: -w, y: -h },
            Vec2 { x: w, y: -h },
            Vec2 { x: w, y: h },
            Vec2 { x: -w, y: h },
        ]
        .into_iter()
        .map(|corner| centre + corner.rotated(rotation))
        .collect();
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.vertices.iter().copied().circular_tuple_windows()
    }

    /// Outward unit normals, one per edge, in edge order.
    pub fn normals(&self) -> Vec<Vec2> {
        self.edges().map(|(u, v)| (v - u).orthog().normed()).collect()
    }

    /// Edge normals with parallel (or anti-parallel) duplicates removed. A box has two axes.
    pub fn axes(&self) -> Vec<Vec2> {
        let mut axes = Vec::new();
        push_distinct_axes(&mut axes, self.normals());
        axes
    }

    /// The interval covered by the polygon's projection onto `axis`.
    pub fn project(&self, axis: Vec2) -> Range<f64> {
        let projections = self.vertices.iter().map(|v| axis.dot(*v));
        let start = projections.clone().min_f64().unwrap_or(0.0);
        let end = projections.max_f64().unwrap_or(0.0);
        start..end
    }

    /// The area centroid.
    pub fn centre(&self) -> Vec2 {
        let (area, x, y) = self
            .edges()
            .map(|(u, v)| {
                let area = u.cross(v);
                (area, (u.x + v.x) * area, (u.y + v.y) * area)
            })
            .fold((0.0, 0.0, 0.0), |acc, next| {
                (acc.0 + next.0, acc.1 + next.1, acc.2 + next.2)
            });
        if gg_float::is_approximately_zero(area) {
            // Degenerate: fall back to the vertex mean.
            self.vertices.iter().copied().sum::<Vec2>() / self.vertices.len() as f64
        } else {
            Vec2 {
                x: x / (3.0 * area),
                y: y / (3.0 * area),
            }
        }
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::bounding(self.vertices.iter().copied()).unwrap_or_default()
    }

    /// True if the polygons overlap by more than [`EPSILON`]; shapes that only touch do not
    /// collide.
    pub fn collides_with(&self, other: &Polygon) -> bool {
        sat(self, other).state() == ContactState::Penetrating
    }

    /// The face of `self` whose plane `other` lies furthest outside of, as
    /// `(edge index, separation)`.
    fn max_face_separation(&self, other: &Polygon) -> (usize, f64) {
        self.edges()
            .enumerate()
            .map(|(i, (u, v))| {
                let normal = (v - u).orthog().normed();
                let separation = other
                    .vertices
                    .iter()
                    .map(|p| normal.dot(*p - u))
                    .min_f64()
                    .unwrap_or(f64::INFINITY);
                (i, separation)
            })
            .fold((0, f64::NEG_INFINITY), |best, next| {
                if next.1 > best.1 { next } else { best }
            })
    }

    fn edge(&self, index: usize) -> (Vec2, Vec2) {
        let next = (index + 1) % self.vertices.len();
        (self.vertices[index], self.vertices[next])
    }
}

impl Display for Polygon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Polygon[{}]", self.vertices.iter().join(", "))
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    vertices
        .iter()
        .circular_tuple_windows()
        .map(|(u, v)| u.cross(*v))
        .sum::<f64>()
        / 2.0
}

fn push_distinct_axes(axes: &mut Vec<Vec2>, candidates: impl IntoIterator<Item = Vec2>) {
    for candidate in candidates {
        if !axes
            .iter()
            .any(|axis| gg_float::is_approximately_zero(axis.cross(candidate)))
        {
            axes.push(candidate);
        }
    }
}

/// The signed separation of the two polygons' projections onto every distinct edge normal of
/// both shapes. Any positive entry is a separating axis.
pub fn axis_separations(a: &Polygon, b: &Polygon) -> Vec<(Vec2, f64)> {
    let mut axes = a.axes();
    push_distinct_axes(&mut axes, b.axes());
    axes.into_iter()
        .map(|axis| (axis, gg_range::separation_f64(&a.project(axis), &b.project(axis))))
        .collect()
}

/// The separating-axis test. Returns on the first separating axis found; otherwise reports the
/// axis of least overlap, oriented from `b` towards `a`.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
/// use tumble::util::collision::sat;
///
/// let a = Polygon::oriented_box(Vec2::zero(), Vec2::splat(0.5), Angle::zero());
/// let b = Polygon::oriented_box(Vec2 { x: 2.0, y: 0.0 }, Vec2::splat(0.5), Angle::zero());
/// assert_eq!(sat(&a, &b).state(), ContactState::Separated);
/// ```
pub fn sat(a: &Polygon, b: &Polygon) -> SatResult {
    let mut axes = a.axes();
    push_distinct_axes(&mut axes, b.axes());

    let mut min_axis = Vec2::zero();
    let mut min_depth = f64::INFINITY;
    for axis in axes {
        let separation = gg_range::separation_f64(&a.project(axis), &b.project(axis));
        if separation > 0.0 {
            return SatResult::Separated {
                axis,
                gap: separation,
            };
        }
        let depth = -separation;
        if depth < min_depth {
            min_depth = depth;
            min_axis = axis;
        }
    }

    if (a.centre() - b.centre()).dot(min_axis) < 0.0 {
        min_axis = -min_axis;
    }
    SatResult::Overlapping {
        normal: min_axis,
        depth: min_depth,
    }
}

/// Keeps the part of the segment on which `dir·p <= offset`.
fn clip_segment(segment: [Vec2; 2], dir: Vec2, offset: f64) -> Option<[Vec2; 2]> {
    let [p0, p1] = segment;
    let d0 = dir.dot(p0) - offset;
    let d1 = dir.dot(p1) - offset;
    match (d0 <= 0.0, d1 <= 0.0) {
        (true, true) => Some(segment),
        (false, false) => None,
        _ => {
            let crossing = p0 + (d0 / (d0 - d1)) * (p1 - p0);
            if d0 <= 0.0 {
                Some([p0, crossing])
            } else {
                Some([crossing, p1])
            }
        }
    }
}

/// Finds the contact point on `incident` against face `face_index` of `reference`.
fn contact_point(reference: &Polygon, face_index: usize, incident: &Polygon, tolerance: f64) -> Vec2 {
    let (u, v) = reference.edge(face_index);
    let normal = (v - u).orthog().normed();
    let depth_of = |p: Vec2| normal.dot(p - u);

    let deepest_vertex = incident
        .vertices
        .iter()
        .copied()
        .min_by(|p, q| depth_of(*p).total_cmp(&depth_of(*q)))
        .unwrap_or(u);

    // The incident face is the one most anti-parallel to the reference normal.
    let Some((incident_index, _)) = incident
        .normals()
        .into_iter()
        .enumerate()
        .min_by(|(_, m), (_, n)| m.dot(normal).total_cmp(&n.dot(normal)))
    else {
        return deepest_vertex;
    };
    let (p, q) = incident.edge(incident_index);

    let tangent = (v - u).normed();
    let clipped = clip_segment([p, q], -tangent, -tangent.dot(u))
        .and_then(|segment| clip_segment(segment, tangent, tangent.dot(v)));
    let Some(clipped) = clipped else {
        return deepest_vertex;
    };

    let Some(min_depth) = clipped.iter().map(|p| depth_of(*p)).min_f64() else {
        return deepest_vertex;
    };
    let kept = clipped
        .iter()
        .copied()
        .filter(|p| depth_of(*p) <= min_depth + tolerance)
        .collect_vec();
    if kept.is_empty() {
        deepest_vertex
    } else {
        kept.iter().copied().sum::<Vec2>() / kept.len() as f64
    }
}

/// Computes the contact between two polygons by querying the vertices of each against the faces
/// of the other. The perspective with the larger separation wins (ties go to `b`'s faces), and
/// the normal always points away from `b`, towards `a`.
///
/// Incident-face points within `tolerance` of the deepest are averaged, so flat faces resting on
/// one another yield a contact point at the middle of their overlap.
pub fn contact(a: &Polygon, b: &Polygon, tolerance: f64) -> Contact {
    let (b_face, b_separation) = b.max_face_separation(a);
    let (a_face, a_separation) = a.max_face_separation(b);

    if b_separation >= a_separation {
        let (u, v) = b.edge(b_face);
        Contact {
            normal: (v - u).orthog().normed(),
            separation: b_separation,
            point: contact_point(b, b_face, a, tolerance),
        }
    } else {
        let (u, v) = a.edge(a_face);
        Contact {
            normal: -(v - u).orthog().normed(),
            separation: a_separation,
            point: contact_point(a, a_face, b, tolerance),
        }
    }
}

#[allow(unused_imports)]
use crate::core::prelude::*;

use crate::util::gg_float;
use crate::util::gg_iter::GgFloatIter;
use num_traits::Zero;
use std::iter::Sum;
use std::{
    fmt,
    fmt::Formatter,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

/// A 2D vector with 64-bit floating point coordinates, used both for points and displacements.
///
/// World space follows the usual mathematical convention: x increases to the right, y increases
/// upwards, and positive rotations are counter-clockwise. View space may flip an axis; see
/// [`Viewport`](crate::core::viewport::Viewport).
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let v1 = Vec2 { x: 3.0, y: 4.0 };
/// let v2 = Vec2 { x: 1.0, y: 2.0 };
/// assert_eq!(v1 + v2, Vec2 { x: 4.0, y: 6.0 });
/// assert_eq!(v1.len(), 5.0);
/// ```
///
/// # Equality
/// Two finite vectors are considered equal if their components differ by less than
/// [`EPSILON`](crate::core::config::EPSILON). Non-finite vectors are compared exactly.
#[derive(Default, Debug, Copy, Clone)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl PartialEq for Vec2 {
    fn eq(&self, other: &Self) -> bool {
        if self.is_finite() && other.is_finite() {
            (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
        } else {
            self.x == other.x && self.y == other.y
        }
    }
}

impl Vec2 {
    #[must_use]
    pub fn right() -> Vec2 {
        Vec2 { x: 1.0, y: 0.0 }
    }
    /// Returns a unit vector pointing upward (positive y-axis in world space).
    #[must_use]
    pub fn up() -> Vec2 {
        Vec2 { x: 0.0, y: 1.0 }
    }
    #[must_use]
    pub fn left() -> Vec2 {
        Vec2 { x: -1.0, y: 0.0 }
    }
    #[must_use]
    pub fn down() -> Vec2 {
        Vec2 { x: 0.0, y: -1.0 }
    }
    #[must_use]
    pub fn one() -> Vec2 {
        Vec2 { x: 1.0, y: 1.0 }
    }
    #[must_use]
    pub fn zero() -> Vec2 {
        Vec2 { x: 0.0, y: 0.0 }
    }
    #[must_use]
    pub fn splat(v: f64) -> Vec2 {
        Vec2 { x: v, y: v }
    }

    /// Returns the squared length of the vector.
    ///
    /// Use this instead of [`len`](Vec2::len) when comparing lengths to avoid the square root.
    #[must_use]
    pub fn len_squared(&self) -> f64 {
        self.dot(*self)
    }

    #[must_use]
    pub fn len(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns a unit vector in the same direction as this vector.
    ///
    /// If the vector's length is zero, returns the zero vector instead of dividing by zero. Use
    /// [`try_normed`](Vec2::try_normed) where a zero-length input is a bug.
    #[must_use]
    pub fn normed(&self) -> Vec2 {
        self.try_normed().unwrap_or_else(|_| Vec2::zero())
    }

    /// Returns a unit vector in the same direction as this vector, or
    /// [`PhysicsError::DegenerateVector`] if the length is zero or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use tumble::core::prelude::*;
    ///
    /// assert_eq!(Vec2 { x: 0.0, y: -2.0 }.try_normed(), Ok(Vec2::down()));
    /// assert_eq!(Vec2::zero().try_normed(), Err(PhysicsError::DegenerateVector));
    /// ```
    pub fn try_normed(&self) -> Result<Vec2, PhysicsError> {
        let len = self.len();
        if gg_float::is_finite_positive(len) {
            let mut rv = *self / len;
            rv.x = gg_float::force_positive_zero(rv.x);
            rv.y = gg_float::force_positive_zero(rv.y);
            Ok(rv)
        } else {
            Err(PhysicsError::DegenerateVector)
        }
    }

    #[must_use]
    pub fn abs(&self) -> Vec2 {
        Vec2 {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Returns a new vector rotated counter-clockwise about the origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use tumble::core::prelude::*;
    ///
    /// let rotated = Vec2::right().rotated(Angle::degrees(90.0));
    /// assert!(rotated.almost_eq(Vec2::up()));
    /// ```
    #[must_use]
    pub fn rotated(&self, angle: Angle) -> Vec2 {
        AffineMap::rotation(angle).apply_vector(*self)
    }

    /// Returns a new vector rotated counter-clockwise about `origin`.
    #[must_use]
    pub fn rotated_around(&self, angle: Angle, origin: Vec2) -> Vec2 {
        origin + (*self - origin).rotated(angle)
    }

    /// Returns the direction of this vector, measured counter-clockwise from the x-axis.
    #[must_use]
    pub fn angle(&self) -> Angle {
        Angle::radians(self.y.atan2(self.x))
    }

    /// Returns a perpendicular vector, rotated 90 degrees clockwise from this one.
    ///
    /// For the edges of a polygon wound counter-clockwise, this is the outward normal.
    #[must_use]
    pub fn orthog(&self) -> Vec2 {
        Vec2 {
            x: self.y,
            y: -self.x,
        }
    }

    #[must_use]
    pub fn component_wise(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }

    #[must_use]
    pub fn component_min(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }
    #[must_use]
    pub fn component_max(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    #[must_use]
    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Returns the z-component of the 3D cross product of the two vectors (embedded in the
    /// plane z = 0). Positive when `other` is counter-clockwise from `self`.
    #[must_use]
    pub fn cross(&self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Returns `ω × self` for an angular velocity `ω` about the z-axis: the velocity of a point at
    /// offset `self` from the centre of rotation.
    #[must_use]
    pub fn cross_scalar(&self, omega: f64) -> Vec2 {
        Vec2 {
            x: -omega * self.y,
            y: omega * self.x,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Checks whether the distance between the two vectors is less than
    /// [`EPSILON`](crate::core::config::EPSILON).
    pub fn almost_eq(&self, rhs: Vec2) -> bool {
        (*self - rhs).len() < EPSILON
    }

    /// Like [`almost_eq`](Vec2::almost_eq) with a caller-chosen tolerance.
    pub fn almost_eq_within(&self, rhs: Vec2, tolerance: f64) -> bool {
        (*self - rhs).len() < tolerance
    }
}

impl Zero for Vec2 {
    fn zero() -> Self {
        Vec2::zero()
    }

    fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "vec({:.3}, {:.3})", self.x, self.y)
    }
}

impl Add<Vec2> for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl AddAssign<Vec2> for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vec2> for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl SubAssign<Vec2> for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Sum<Vec2> for Vec2 {
    fn sum<I: Iterator<Item = Vec2>>(iter: I) -> Self {
        iter.fold(Vec2::zero(), Vec2::add)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Self::Output {
        rhs * self
    }
}
impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}
impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Self::Output {
        Vec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}
impl DivAssign<f64> for Vec2 {
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Self::Output {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// An orientation, stored in radians.
///
/// Arithmetic does not wrap; `sin`, `cos` and `tan` handle any multiple of a full turn.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let quarter = Angle::degrees(90.0);
/// assert!((quarter.as_radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// assert!((quarter.sin() - 1.0).abs() < 1e-12);
/// ```
#[derive(Default, Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub fn radians(radians: f64) -> Angle {
        Angle(radians)
    }
    pub fn degrees(degrees: f64) -> Angle {
        Angle(degrees.to_radians())
    }
    pub fn zero() -> Angle {
        Angle(0.0)
    }

    pub fn as_radians(&self) -> f64 {
        self.0
    }
    pub fn as_degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    pub fn sin(&self) -> f64 {
        self.0.sin()
    }
    pub fn cos(&self) -> f64 {
        self.0.cos()
    }
    pub fn tan(&self) -> f64 {
        self.0.tan()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.as_degrees())
    }
}

impl Add<Angle> for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Self::Output {
        Angle(self.0 + rhs.0)
    }
}
impl AddAssign<Angle> for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        self.0 += rhs.0;
    }
}
impl Sub<Angle> for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Self::Output {
        Angle(self.0 - rhs.0)
    }
}
impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}
impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Self::Output {
        Angle(self.0 * rhs)
    }
}

/// An axis-aligned rectangle, stored as its centre and half-widths.
///
/// # Examples
///
/// ```
/// use tumble::core::prelude::*;
///
/// let rect = Rect::from_coords(Vec2 { x: -1.0, y: 0.0 }, Vec2 { x: 3.0, y: 2.0 });
/// assert_eq!(rect.centre(), Vec2 { x: 1.0, y: 1.0 });
/// assert_eq!(rect.extent(), Vec2 { x: 4.0, y: 2.0 });
/// assert!(rect.contains_point(Vec2 { x: 0.0, y: 1.5 }));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    centre: Vec2,
    half_widths: Vec2,
}

impl Rect {
    pub fn new(centre: Vec2, half_widths: Vec2) -> Self {
        Self {
            centre,
            half_widths: half_widths.abs(),
        }
    }
    /// Creates a rectangle from two opposite corners, in either order.
    pub fn from_coords(a: Vec2, b: Vec2) -> Self {
        let min = a.component_min(b);
        let max = a.component_max(b);
        let half_widths = (max - min) / 2.0;
        Self {
            centre: min + half_widths,
            half_widths,
        }
    }
    /// Returns the smallest rectangle containing every point, or `None` if there are no points.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
        I::IntoIter: Clone,
    {
        let points = points.into_iter();
        let min = Vec2 {
            x: points.clone().map(|p| p.x).min_f64()?,
            y: points.clone().map(|p| p.y).min_f64()?,
        };
        let max = Vec2 {
            x: points.clone().map(|p| p.x).max_f64()?,
            y: points.map(|p| p.y).max_f64()?,
        };
        Some(Self::from_coords(min, max))
    }

    pub fn centre(&self) -> Vec2 {
        self.centre
    }
    pub fn half_widths(&self) -> Vec2 {
        self.half_widths
    }
    pub fn extent(&self) -> Vec2 {
        self.half_widths * 2.0
    }

    pub fn left(&self) -> f64 {
        self.centre.x - self.half_widths.x
    }
    pub fn right(&self) -> f64 {
        self.centre.x + self.half_widths.x
    }
    /// The smaller y-coordinate (the lower edge in world space).
    pub fn bottom(&self) -> f64 {
        self.centre.y - self.half_widths.y
    }
    pub fn top(&self) -> f64 {
        self.centre.y + self.half_widths.y
    }

    pub fn is_empty(&self) -> bool {
        self.half_widths.x.is_zero() || self.half_widths.y.is_zero()
    }

    pub fn contains_point(&self, pos: Vec2) -> bool {
        (self.left()..=self.right()).contains(&pos.x)
            && (self.bottom()..=self.top()).contains(&pos.y)
    }

    /// Returns true if the two rectangles share interior area; rectangles that only touch along
    /// an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }
}

/// A 2D affine transform, using the row-vector convention of CoreGraphics:
/// ```text
///                 | a  b  0 |
/// [x' y' 1] = [x y 1] | c  d  0 |
///                 | tx ty 1 |
/// ```
/// that is, `x' = a·x + c·y + tx` and `y' = b·x + d·y + ty`.
///
/// Composition reads left to right: `first.then(second)` applies `first`, then `second`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[must_use]
pub struct AffineMap {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMap {
    pub fn identity() -> AffineMap {
        Self::scale(1.0, 1.0)
    }

    pub fn translation(dx: f64, dy: f64) -> AffineMap {
        AffineMap {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: dx,
            ty: dy,
        }
    }
    pub fn translation_vec2(by: Vec2) -> AffineMap {
        Self::translation(by.x, by.y)
    }

    pub fn scale(sx: f64, sy: f64) -> AffineMap {
        AffineMap {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// A map that mirrors the y-axis, e.g. to make "up" positive in a y-down view space.
    pub fn flip_y() -> AffineMap {
        Self::scale(1.0, -1.0)
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotation(angle: Angle) -> AffineMap {
        let (sin, cos) = angle.as_radians().sin_cos();
        AffineMap {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Returns the map that applies `self` and then `next`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tumble::core::prelude::*;
    ///
    /// let map = AffineMap::scale(2.0, 2.0).then(AffineMap::translation(1.0, 0.0));
    /// assert_eq!(map.apply_point(Vec2::one()), Vec2 { x: 3.0, y: 2.0 });
    /// ```
    pub fn then(&self, next: AffineMap) -> AffineMap {
        AffineMap {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            tx: self.tx * next.a + self.ty * next.c + next.tx,
            ty: self.tx * next.b + self.ty * next.d + next.ty,
        }
    }

    /// Returns the map that translates by `by` and then applies `self`.
    pub fn translated_by(&self, by: Vec2) -> AffineMap {
        Self::translation_vec2(by).then(*self)
    }

    /// Returns the map that scales by `(sx, sy)` and then applies `self`.
    pub fn scaled_by(&self, sx: f64, sy: f64) -> AffineMap {
        Self::scale(sx, sy).then(*self)
    }

    pub fn det(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the inverse map, or [`PhysicsError::DegenerateTransform`] if the map collapses the
    /// plane onto a line or point.
    pub fn inverse(&self) -> Result<AffineMap, PhysicsError> {
        let det = self.det();
        if !det.is_finite() || gg_float::is_approximately_zero(det) {
            return Err(PhysicsError::DegenerateTransform);
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Ok(AffineMap {
            a,
            b,
            c,
            d,
            tx: -(self.tx * a + self.ty * c),
            ty: -(self.tx * b + self.ty * d),
        })
    }

    #[must_use]
    pub fn apply_point(&self, p: Vec2) -> Vec2 {
        self.apply_vector(p)
            + Vec2 {
                x: self.tx,
                y: self.ty,
            }
    }

    /// Applies only the linear part of the map (no translation), as for a displacement.
    #[must_use]
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        Vec2 {
            x: self.a * v.x + self.c * v.y,
            y: self.b * v.x + self.d * v.y,
        }
    }

    /// Applies the linear part of the map to a `(width, height)` pair. A flipped axis would
    /// produce a negative dimension, so each component is made non-negative.
    #[must_use]
    pub fn apply_size(&self, size: Vec2) -> Vec2 {
        self.apply_vector(size).abs()
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
            .iter()
            .all(|x| x.is_finite())
    }

    pub fn almost_eq(&self, rhs: AffineMap) -> bool {
        [
            self.a - rhs.a,
            self.b - rhs.b,
            self.c - rhs.c,
            self.d - rhs.d,
            self.tx - rhs.tx,
            self.ty - rhs.ty,
        ]
        .iter()
        .all(|x| x.abs() < EPSILON)
    }
}

impl Mul<Vec2> for AffineMap {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        self.apply_point(rhs)
    }
}

impl fmt::Display for AffineMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.3} {:.3} | {:.3} {:.3} | {:.3} {:.3}]",
            self.a, self.b, self.c, self.d, self.tx, self.ty
        )
    }
}

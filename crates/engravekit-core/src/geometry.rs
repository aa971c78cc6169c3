//! 2D geometry primitives
//!
//! Small value types used everywhere in the engine: `Vec2` for points and
//! directions (both parametric `(s,t)` and object space), `Affine2` for the
//! object-to-reference transforms used while tracing, and `Rect` for working
//! bounds. Degenerate inputs are repaired with safe defaults instead of being
//! allowed to produce NaN.

use crate::error::GeometryError;
use lyon::geom::euclid::default::Transform2D;
use lyon::geom::euclid::Angle;
use lyon::geom::{point, Point};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Tolerance used for "effectively zero" comparisons.
pub const EPSILON: f64 = 1e-9;

/// A 2D vector or point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const X: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const Y: Vec2 = Vec2 { x: 0.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians from the +x axis.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Counter-clockwise perpendicular.
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Normalised copy, or `fallback` when the vector is (near) zero or not finite.
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let len = self.length();
        if !len.is_finite() || len < EPSILON {
            fallback
        } else {
            self / len
        }
    }

    /// Normalised copy, treating a zero vector as the default horizontal.
    pub fn normalize(self) -> Vec2 {
        self.normalize_or(Vec2::X)
    }

    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        self + (other - self) * t
    }

    pub fn rotate(self, angle: f64) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Component-wise multiply.
    pub fn scale(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    /// The same position as a lyon point.
    pub fn to_point(self) -> Point<f64> {
        point(self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<Point<f64>> for Vec2 {
    fn from(p: Point<f64>) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vec2::new(x, y)
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep of `t` clamped to [0,1].
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Distance from `p` to the segment `a`-`b`, plus the segment parameter of
/// the closest point.
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < EPSILON * EPSILON {
        return (p.distance(a), 0.0);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p.distance(a + ab * t), t)
}

/// 2x3 affine transform backed by lyon's `Transform2D`.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`. Persisted as the six
/// terms `[a, b, c, d, e, f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Affine2(Transform2D<f64>);

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 6]> for Affine2 {
    fn from(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }
}

impl From<Affine2> for [f64; 6] {
    fn from(t: Affine2) -> Self {
        let m = t.0;
        [m.m11, m.m12, m.m21, m.m22, m.m31, m.m32]
    }
}

impl Affine2 {
    pub fn identity() -> Self {
        Self(Transform2D::identity())
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(Transform2D::new(a, b, c, d, e, f))
    }

    pub fn translation(offset: Vec2) -> Self {
        Self(Transform2D::translation(offset.x, offset.y))
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self(Transform2D::scale(sx, sy))
    }

    pub fn rotation(angle: f64) -> Self {
        Self(Transform2D::rotation(Angle::radians(angle)))
    }

    /// Apply `self` first, then `next`.
    pub fn then(&self, next: &Affine2) -> Affine2 {
        Self(self.0.then(&next.0))
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.0.transform_point(p.to_point()).into()
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    pub fn inverse(&self) -> Result<Affine2, GeometryError> {
        let determinant = self.determinant();
        if determinant.abs() < EPSILON || !determinant.is_finite() {
            return Err(GeometryError::SingularTransform { determinant });
        }
        self.0
            .inverse()
            .map(Self)
            .ok_or(GeometryError::SingularTransform { determinant })
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Rect {
    /// The unit parametric domain `[0,1] x [0,1]`.
    pub const UNIT: Rect = Rect {
        min: Vec2::ZERO,
        max: Vec2 { x: 1.0, y: 1.0 },
    };

    /// Build from two corners in any order.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        self.min.lerp(self.max, 0.5)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// Largest distance from `p` to any corner.
    pub fn max_corner_distance(&self, p: Vec2) -> f64 {
        self.corners()
            .iter()
            .map(|c| c.distance(p))
            .fold(0.0, f64::max)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(GeometryError::NonFinite {
                name: "rect".to_string(),
            });
        }
        if self.width() <= EPSILON || self.height() <= EPSILON {
            return Err(GeometryError::DegenerateBounds {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Where the segment from inside point `a` toward `b` leaves the rectangle.
    ///
    /// Returns `b` itself when `b` is inside.
    pub fn exit_point(&self, a: Vec2, b: Vec2) -> Vec2 {
        if self.contains(b) {
            return b;
        }
        let d = b - a;
        let mut t_exit: f64 = 1.0;
        if d.x.abs() > EPSILON {
            let tx = if d.x > 0.0 {
                (self.max.x - a.x) / d.x
            } else {
                (self.min.x - a.x) / d.x
            };
            t_exit = t_exit.min(tx);
        }
        if d.y.abs() > EPSILON {
            let ty = if d.y > 0.0 {
                (self.max.y - a.y) / d.y
            } else {
                (self.min.y - a.y) / d.y
            };
            t_exit = t_exit.min(ty);
        }
        self.clamp(a + d * t_exit.clamp(0.0, 1.0))
    }
}

//! Surface mapping between parametric `(s,t)` and object space.
//!
//! The engine only ever asks its host surface for a point at `(s,t)`, the
//! local stretch of the mapping, and an approximate inverse. Spacing and
//! weight are object-space quantities and are converted to parametric steps
//! point by point, since a surface may be stretched non-uniformly.

use engravekit_core::{Vec2, EPSILON};
use serde::{Deserialize, Serialize};

/// Host surface collaborator.
pub trait Surface {
    /// Object-space position of the parametric coordinate `(s,t)`.
    fn point(&self, s: f64, t: f64) -> Vec2;

    /// Object-space length of a unit step along `s` and along `t` at `(s,t)`.
    fn scaling(&self, s: f64, t: f64) -> Vec2 {
        let h = 1e-4;
        let p = self.point(s, t);
        Vec2::new(
            self.point(s + h, t).distance(p) / h,
            self.point(s, t + h).distance(p) / h,
        )
    }

    /// Approximate parametric coordinate of an object-space point.
    fn inverse(&self, p: Vec2) -> Option<Vec2>;

    /// Object-space length of the parametric vector `dir` applied at `at`.
    fn stretch(&self, at: Vec2, dir: Vec2) -> f64 {
        let len = dir.length();
        if len < EPSILON {
            return 0.0;
        }
        let h = 1e-4 / len;
        let a = self.point(at.x, at.y);
        let b = self.point(at.x + dir.x * h, at.y + dir.y * h);
        b.distance(a) / h
    }

    /// Parametric step along unit direction `dir` covering `distance` object units.
    ///
    /// A vanishing stretch falls back to treating the mapping as unscaled.
    fn param_step(&self, at: Vec2, dir: Vec2, distance: f64) -> f64 {
        let stretch = self.stretch(at, dir.normalize());
        if !stretch.is_finite() || stretch < EPSILON {
            distance
        } else {
            distance / stretch
        }
    }
}

/// Axis-aligned rectangular surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectSurface {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Default for RectSurface {
    fn default() -> Self {
        Self::unit()
    }
}

impl RectSurface {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Object space equal to parametric space.
    pub fn unit() -> Self {
        Self::new(Vec2::ZERO, Vec2::new(1.0, 1.0))
    }
}

impl Surface for RectSurface {
    fn point(&self, s: f64, t: f64) -> Vec2 {
        self.origin + Vec2::new(s * self.size.x, t * self.size.y)
    }

    fn scaling(&self, _s: f64, _t: f64) -> Vec2 {
        Vec2::new(self.size.x.abs(), self.size.y.abs())
    }

    fn inverse(&self, p: Vec2) -> Option<Vec2> {
        if self.size.x.abs() < EPSILON || self.size.y.abs() < EPSILON {
            return None;
        }
        let d = p - self.origin;
        Some(Vec2::new(d.x / self.size.x, d.y / self.size.y))
    }

    fn stretch(&self, _at: Vec2, dir: Vec2) -> f64 {
        dir.scale(self.size).length()
    }
}

/// Bilinear patch over four object-space corners.
///
/// Corners are ordered `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)` in parametric space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadSurface {
    pub corners: [Vec2; 4],
}

impl QuadSurface {
    pub fn new(corners: [Vec2; 4]) -> Self {
        Self { corners }
    }

    fn partials(&self, s: f64, t: f64) -> (Vec2, Vec2) {
        let [p00, p10, p11, p01] = self.corners;
        let ds = (p10 - p00) * (1.0 - t) + (p11 - p01) * t;
        let dt = (p01 - p00) * (1.0 - s) + (p11 - p10) * s;
        (ds, dt)
    }
}

impl Surface for QuadSurface {
    fn point(&self, s: f64, t: f64) -> Vec2 {
        let [p00, p10, p11, p01] = self.corners;
        let bottom = p00.lerp(p10, s);
        let top = p01.lerp(p11, s);
        bottom.lerp(top, t)
    }

    fn scaling(&self, s: f64, t: f64) -> Vec2 {
        let (ds, dt) = self.partials(s, t);
        Vec2::new(ds.length(), dt.length())
    }

    /// Newton iteration from the patch centre.
    fn inverse(&self, p: Vec2) -> Option<Vec2> {
        let mut st = Vec2::new(0.5, 0.5);
        for _ in 0..32 {
            let err = self.point(st.x, st.y) - p;
            if err.length() < 1e-10 {
                return Some(st);
            }
            let (ds, dt) = self.partials(st.x, st.y);
            let det = ds.cross(dt);
            if det.abs() < EPSILON {
                return None;
            }
            st -= Vec2::new(err.cross(dt) / det, ds.cross(err) / det);
            if !st.is_finite() {
                return None;
            }
        }
        let residual = self.point(st.x, st.y).distance(p);
        (residual < 1e-6).then_some(st)
    }

    fn stretch(&self, at: Vec2, dir: Vec2) -> f64 {
        let (ds, dt) = self.partials(at.x, at.y);
        (ds * dir.x + dt * dir.y).length()
    }
}

/// Serialisable surface held by a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PatchSurface {
    Rect(RectSurface),
    Quad(QuadSurface),
}

impl Default for PatchSurface {
    fn default() -> Self {
        PatchSurface::Rect(RectSurface::unit())
    }
}

impl Surface for PatchSurface {
    fn point(&self, s: f64, t: f64) -> Vec2 {
        match self {
            PatchSurface::Rect(r) => r.point(s, t),
            PatchSurface::Quad(q) => q.point(s, t),
        }
    }

    fn scaling(&self, s: f64, t: f64) -> Vec2 {
        match self {
            PatchSurface::Rect(r) => r.scaling(s, t),
            PatchSurface::Quad(q) => q.scaling(s, t),
        }
    }

    fn inverse(&self, p: Vec2) -> Option<Vec2> {
        match self {
            PatchSurface::Rect(r) => r.inverse(p),
            PatchSurface::Quad(q) => q.inverse(p),
        }
    }

    fn stretch(&self, at: Vec2, dir: Vec2) -> f64 {
        match self {
            PatchSurface::Rect(r) => r.stretch(at, dir),
            PatchSurface::Quad(q) => q.stretch(at, dir),
        }
    }
}

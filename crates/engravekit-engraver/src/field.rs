//! Direction and scalar fields over parametric space.
//!
//! Generators and the growth engine only ever ask a field for
//! `direction(s, t)`. The four analytic topologies are built from a group's
//! [`DirectionSettings`]; image-driven maps and a group's own lines can stand
//! in for them wherever a field is accepted.

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fmt;

use engravekit_core::{segment_distance, Vec2, EPSILON};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generators::LineProfile;

/// A vector field sampled in parametric space.
///
/// Implementations return unit vectors, or [`Vec2::ZERO`] where the field has
/// no usable direction.
pub trait DirectionField {
    fn direction(&self, s: f64, t: f64) -> Vec2;
}

/// A scalar field sampled in parametric space, such as a spacing or weight map.
pub trait ScalarField {
    fn value(&self, s: f64, t: f64) -> f64;
}

impl<F> ScalarField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn value(&self, s: f64, t: f64) -> f64 {
        self(s, t)
    }
}

/// Parallel lines along one direction.
#[derive(Debug, Clone, Copy)]
pub struct LinearField {
    direction: Vec2,
}

impl LinearField {
    pub fn new(direction: Vec2) -> Self {
        Self {
            direction: direction.normalize(),
        }
    }
}

impl DirectionField for LinearField {
    fn direction(&self, _s: f64, _t: f64) -> Vec2 {
        self.direction
    }
}

/// Rays out of a centre point.
#[derive(Debug, Clone, Copy)]
pub struct RadialField {
    center: Vec2,
}

impl RadialField {
    pub fn new(center: Vec2) -> Self {
        Self { center }
    }
}

impl DirectionField for RadialField {
    fn direction(&self, s: f64, t: f64) -> Vec2 {
        (Vec2::new(s, t) - self.center).normalize()
    }
}

/// Concentric rings around a centre point.
#[derive(Debug, Clone, Copy)]
pub struct CircularField {
    center: Vec2,
}

impl CircularField {
    pub fn new(center: Vec2) -> Self {
        Self { center }
    }
}

impl DirectionField for CircularField {
    fn direction(&self, s: f64, t: f64) -> Vec2 {
        (Vec2::new(s, t) - self.center).normalize().perp()
    }
}

/// Archimedean spiral `r = pitch * theta` around a centre point.
#[derive(Debug, Clone, Copy)]
pub struct SpiralField {
    center: Vec2,
    /// Radial growth per radian.
    pitch: f64,
    /// `1.0` counter-clockwise, `-1.0` clockwise.
    spin: f64,
}

impl SpiralField {
    pub fn new(center: Vec2, pitch: f64, spin: f64) -> Self {
        Self {
            center,
            pitch: pitch.abs(),
            spin: if spin < 0.0 { -1.0 } else { 1.0 },
        }
    }
}

impl DirectionField for SpiralField {
    fn direction(&self, s: f64, t: f64) -> Vec2 {
        let d = Vec2::new(s, t) - self.center;
        let r = d.length();
        let radial = d.normalize();
        let tangential = radial.perp() * self.spin;
        (radial * self.pitch + tangential * r).normalize()
    }
}

/// Direction from an RGB normal map: lines run along the contours, so the
/// direction is perpendicular to the encoded slope.
#[derive(Debug, Clone)]
pub struct NormalMapField {
    map: RgbImage,
}

impl NormalMapField {
    pub fn new(map: RgbImage) -> Self {
        Self { map }
    }

    pub fn from_file(path: &std::path::Path) -> image::ImageResult<Self> {
        Ok(Self::new(image::open(path)?.to_rgb8()))
    }
}

impl DirectionField for NormalMapField {
    fn direction(&self, s: f64, t: f64) -> Vec2 {
        let (w, h) = self.map.dimensions();
        if w == 0 || h == 0 || !s.is_finite() || !t.is_finite() {
            return Vec2::ZERO;
        }
        let x = ((s.clamp(0.0, 1.0) * w as f64) as u32).min(w - 1);
        let y = ((t.clamp(0.0, 1.0) * h as f64) as u32).min(h - 1);
        let px = self.map.get_pixel(x, y);
        let nx = px[0] as f64 / 255.0 * 2.0 - 1.0;
        let ny = px[1] as f64 / 255.0 * 2.0 - 1.0;
        let slope = Vec2::new(nx, ny);
        if slope.length() < 0.02 {
            Vec2::ZERO
        } else {
            slope.normalize().perp()
        }
    }
}

/// A set of polylines acting as their own direction source: the tangent of
/// the nearest segment.
#[derive(Debug, Clone, Default)]
pub struct LinesField {
    lines: Vec<Vec<Vec2>>,
}

impl LinesField {
    pub fn new(lines: Vec<Vec<Vec2>>) -> Self {
        Self {
            lines: lines.into_iter().filter(|l| l.len() >= 2).collect(),
        }
    }

    /// Build from the parametric coordinates of generated lines.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a crate::line::Line>,
    {
        Self::new(
            lines
                .into_iter()
                .map(|l| l.points().map(|p| p.st()).collect())
                .collect(),
        )
    }
}

impl DirectionField for LinesField {
    fn direction(&self, s: f64, t: f64) -> Vec2 {
        let p = Vec2::new(s, t);
        let mut best = f64::INFINITY;
        let mut dir = Vec2::X;
        for line in &self.lines {
            for w in line.windows(2) {
                let (d, _) = segment_distance(p, w[0], w[1]);
                let seg = w[1] - w[0];
                if d < best && seg.length() > EPSILON {
                    best = d;
                    dir = seg.normalize();
                }
            }
        }
        dir
    }
}

/// Grayscale image as a 0..1 scalar field.
#[derive(Debug, Clone)]
pub struct LumaField {
    image: GrayImage,
}

impl LumaField {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }
}

impl ScalarField for LumaField {
    fn value(&self, s: f64, t: f64) -> f64 {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || !s.is_finite() || !t.is_finite() {
            return 0.0;
        }
        let x = ((s.clamp(0.0, 1.0) * w as f64) as u32).min(w - 1);
        let y = ((t.clamp(0.0, 1.0) * h as f64) as u32).min(h - 1);
        self.image.get_pixel(x, y)[0] as f64 / 255.0
    }
}

/// Field topology of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Linear,
    Radial,
    Circular,
    Spiral,
    /// Externally supplied direction map, grown with `GrowLines`.
    Map,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Linear => "linear",
            FieldKind::Radial => "radial",
            FieldKind::Circular => "circular",
            FieldKind::Spiral => "spiral",
            FieldKind::Map => "map",
        }
    }

    /// Parse a kind name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" | "regular" => Some(FieldKind::Linear),
            "radial" => Some(FieldKind::Radial),
            "circular" => Some(FieldKind::Circular),
            "spiral" => Some(FieldKind::Spiral),
            "map" | "directionmap" => Some(FieldKind::Map),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for FieldKind {
    fn from(name: String) -> Self {
        FieldKind::parse(&name).unwrap_or_else(|| {
            warn!("Unknown field kind '{}', using linear", name);
            FieldKind::Linear
        })
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.name().to_string()
    }
}

/// Generator configuration of a group.
///
/// Offsets and the default weight are fractions of the group spacing;
/// `resolution` is the number of samples per spacing along a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionSettings {
    pub kind: FieldKind,
    pub position: Vec2,
    pub direction: Vec2,
    /// Extra named parameters: `arms` and `spin` for spirals, `start` and
    /// `end` arc fractions for circles.
    pub params: BTreeMap<String, f64>,
    pub default_weight: f64,
    pub resolution: f64,
    pub line_offset: f64,
    pub point_offset: f64,
    /// Noise feature size, in spacings.
    pub noise_scale: f64,
    pub seed: u64,
    pub profile: LineProfile,
}

impl Default for DirectionSettings {
    fn default() -> Self {
        Self {
            kind: FieldKind::Linear,
            position: Vec2::new(0.5, 0.5),
            direction: Vec2::X,
            params: BTreeMap::new(),
            default_weight: 0.5,
            resolution: 3.0,
            line_offset: 0.0,
            point_offset: 0.0,
            noise_scale: 1.0,
            seed: 0,
            profile: LineProfile::default(),
        }
    }
}

impl DirectionSettings {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.params
            .get(name)
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: f64) {
        self.params.insert(name.into(), value);
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_param(name, value);
        self
    }

    /// Repair non-finite and out-of-range values in place.
    pub fn normalize(&mut self) {
        let d = Self::default();
        if !self.position.is_finite() {
            self.position = d.position;
        }
        self.direction = self.direction.normalize_or(Vec2::X);
        let fix = |v: f64, fallback: f64, lo: f64| if v.is_finite() { v.max(lo) } else { fallback };
        self.default_weight = fix(self.default_weight, d.default_weight, 0.0);
        self.resolution = fix(self.resolution, d.resolution, 1.0);
        self.line_offset = fix(self.line_offset, d.line_offset, 0.0);
        self.point_offset = fix(self.point_offset, d.point_offset, 0.0);
        self.noise_scale = fix(self.noise_scale, d.noise_scale, EPSILON);
        self.params.retain(|_, v| v.is_finite());
        self.profile.normalize();
    }

    /// Spiral radial growth per radian for a given parametric spacing.
    pub fn spiral_pitch(&self, spacing: f64) -> f64 {
        let arms = self.param("arms", 1.0).round().max(1.0);
        arms * spacing / TAU
    }

    /// The analytic field for this topology.
    ///
    /// A `Map` group without an attached map behaves as linear.
    pub fn field(&self, spacing: f64) -> Box<dyn DirectionField> {
        match self.kind {
            FieldKind::Linear | FieldKind::Map => Box::new(LinearField::new(self.direction)),
            FieldKind::Radial => Box::new(RadialField::new(self.position)),
            FieldKind::Circular => Box::new(CircularField::new(self.position)),
            FieldKind::Spiral => Box::new(SpiralField::new(
                self.position,
                self.spiral_pitch(spacing),
                self.param("spin", 1.0),
            )),
        }
    }
}

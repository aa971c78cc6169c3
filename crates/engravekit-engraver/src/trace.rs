//! Trace sampling: weights from a reference raster.
//!
//! A reference (image, gradient or any host object that can render itself)
//! is rasterised lazily and cached until it reports a newer modification
//! stamp or the cache is invalidated. Each sample point's object-space
//! position is mapped through the trace transform into raster pixels; the
//! luminance there goes through the response curve and becomes the new
//! weight, scaled by the group spacing.

use std::rc::Rc;

use engravekit_core::{lerp, Affine2, Vec2, EPSILON};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TraceError, TraceResult};
use crate::line::Line;

/// A rendered reference.
#[derive(Debug, Clone)]
pub struct Raster {
    pub image: RgbaImage,
    /// Modification stamp of the reference when it was rendered.
    pub timestamp: u64,
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Luminance composited over white, in 0..1; `None` outside the raster
    /// or where the raster is fully transparent.
    pub fn sample(&self, px: Vec2) -> Option<f64> {
        if !px.is_finite() || px.x < 0.0 || px.y < 0.0 {
            return None;
        }
        let (x, y) = (px.x.floor() as u64, px.y.floor() as u64);
        if x >= self.width() as u64 || y >= self.height() as u64 {
            return None;
        }
        let la = self.image.get_pixel(x as u32, y as u32).to_luma_alpha();
        let alpha = la[1] as f64 / 255.0;
        if alpha <= 0.0 {
            return None;
        }
        let luma = la[0] as f64 / 255.0;
        Some(luma * alpha + (1.0 - alpha))
    }
}

/// Something that can render itself for tracing.
pub trait RasterSource {
    /// Render to a raster, or `None` when the reference is unrenderable.
    fn render(&self) -> Option<Raster>;

    /// Current modification stamp.
    fn modified(&self) -> u64;

    /// Whether a raster rendered at `cached` is out of date.
    fn needs_update(&self, cached: u64) -> bool {
        self.modified() > cached
    }
}

/// A bitmap reference.
#[derive(Debug, Clone)]
pub struct ImageSource {
    image: DynamicImage,
    stamp: u64,
}

impl ImageSource {
    pub fn new(image: DynamicImage, stamp: u64) -> Self {
        Self { image, stamp }
    }

    pub fn from_file(path: &std::path::Path) -> TraceResult<Self> {
        let image = image::open(path).map_err(|e| TraceError::Image(e.to_string()))?;
        let stamp = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());
        Ok(Self::new(image, stamp))
    }

    /// Replace the image and bump the stamp.
    pub fn set_image(&mut self, image: DynamicImage) {
        self.image = image;
        self.stamp += 1;
    }
}

impl RasterSource for ImageSource {
    fn render(&self) -> Option<Raster> {
        Some(Raster {
            image: self.image.to_rgba8(),
            timestamp: self.stamp,
        })
    }

    fn modified(&self) -> u64 {
        self.stamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientShape {
    #[default]
    Linear,
    Radial,
}

/// A black-to-white luminance ramp rendered on demand.
///
/// `start` and `end` are in raster pixels; luminance is 0 at `start` and 1
/// at `end` (or at distance `|end - start|` for radial ramps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientSource {
    pub shape: GradientShape,
    pub start: Vec2,
    pub end: Vec2,
    pub width: u32,
    pub height: u32,
    pub stamp: u64,
}

impl Default for GradientSource {
    fn default() -> Self {
        Self {
            shape: GradientShape::Linear,
            start: Vec2::ZERO,
            end: Vec2::new(256.0, 0.0),
            width: 256,
            height: 256,
            stamp: 0,
        }
    }
}

impl GradientSource {
    fn value_at(&self, p: Vec2) -> f64 {
        let axis = self.end - self.start;
        let len2 = axis.length_squared();
        if len2 < EPSILON {
            return 1.0;
        }
        let v = match self.shape {
            GradientShape::Linear => (p - self.start).dot(axis) / len2,
            GradientShape::Radial => p.distance(self.start) / len2.sqrt(),
        };
        v.clamp(0.0, 1.0)
    }
}

impl RasterSource for GradientSource {
    fn render(&self) -> Option<Raster> {
        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let v = self.value_at(Vec2::new(x as f64 + 0.5, y as f64 + 0.5));
            let c = (v * 255.0).round() as u8;
            Rgba([c, c, c, 255])
        });
        Some(Raster {
            image,
            timestamp: self.stamp,
        })
    }

    fn modified(&self) -> u64 {
        self.stamp
    }
}

/// Piecewise-linear luminance to weight mapping.
///
/// Control points are `(luminance, weight_fraction)` pairs sorted by
/// luminance, both in 0..1. The default maps black to a full spacing of
/// weight and white to none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseCurve {
    points: Vec<(f64, f64)>,
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self {
            points: vec![(0.0, 1.0), (1.0, 0.0)],
        }
    }
}

impl ResponseCurve {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        let mut curve = Self { points };
        curve.normalize();
        curve
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Drop non-finite points, clamp into the unit square and sort.
    /// Fewer than two points fall back to the default ramp.
    pub fn normalize(&mut self) {
        self.points
            .retain(|(x, y)| x.is_finite() && y.is_finite());
        for p in &mut self.points {
            p.0 = p.0.clamp(0.0, 1.0);
            p.1 = p.1.clamp(0.0, 1.0);
        }
        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.points.dedup_by(|a, b| (a.0 - b.0).abs() < EPSILON);
        if self.points.len() < 2 {
            *self = Self::default();
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
        self.normalize();
    }

    /// Remove the control point at `index`, keeping at least two.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if self.points.len() <= 2 || index >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        true
    }

    pub fn eval(&self, x: f64) -> f64 {
        let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
        let Some(&(x0, y0)) = self.points.first() else {
            return 1.0 - x;
        };
        if x <= x0 {
            return y0;
        }
        for w in self.points.windows(2) {
            let ((xa, ya), (xb, yb)) = (w[0], w[1]);
            if x <= xb {
                let span = xb - xa;
                return if span > EPSILON {
                    lerp(ya, yb, (x - xa) / span)
                } else {
                    yb
                };
            }
        }
        self.points.last().map_or(0.0, |p| p.1)
    }
}

/// Where a group's weights come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    /// Keep the current weights.
    #[default]
    Current,
    Image,
    Gradient,
}

/// Trace configuration of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    pub kind: TraceKind,
    /// Object space to reference pixels.
    pub transform: Affine2,
    pub curve: ResponseCurve,
    /// Host identifier of the reference, or an image path.
    pub identifier: Option<String>,
    /// Ramp used by `Gradient` traces when no source is attached.
    pub gradient: GradientSource,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            kind: TraceKind::Current,
            transform: Affine2::identity(),
            curve: ResponseCurve::default(),
            identifier: None,
            gradient: GradientSource::default(),
        }
    }
}

/// Lazily rebuilt raster of a trace reference.
#[derive(Debug, Clone, Default)]
pub struct TraceCache {
    raster: Option<Rc<Raster>>,
    dirty: bool,
    renders: usize,
}

impl TraceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a re-render on the next refresh.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn raster(&self) -> Option<&Rc<Raster>> {
        self.raster.as_ref()
    }

    /// How many times the reference has been rendered.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Current raster, re-rendering when stale.
    pub fn refresh(&mut self, source: &dyn RasterSource) -> TraceResult<Rc<Raster>> {
        let stale = match &self.raster {
            Some(r) => self.dirty || source.needs_update(r.timestamp),
            None => true,
        };
        if stale {
            let raster = source.render().ok_or_else(|| {
                TraceError::ReferenceUnavailable("reference could not be rendered".to_string())
            })?;
            if raster.width() == 0 || raster.height() == 0 {
                return Err(TraceError::EmptyRaster {
                    width: raster.width(),
                    height: raster.height(),
                });
            }
            self.raster = Some(Rc::new(raster));
            self.dirty = false;
            self.renders += 1;
            debug!("Trace reference rasterised ({} renders)", self.renders);
        }
        self.raster
            .clone()
            .ok_or_else(|| TraceError::ReferenceUnavailable("no raster".to_string()))
    }
}

/// Outcome of a trace pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub sampled: usize,
    /// Points blanked for falling outside the reference.
    pub blanked: usize,
    /// Previously blanked points that are inside again.
    pub restored: usize,
}

/// Assign weights to every synced sample point of `lines` from `raster`.
pub fn trace_lines(
    lines: &mut [Line],
    raster: &Raster,
    settings: &TraceSettings,
    spacing: f64,
) -> TraceStats {
    let mut stats = TraceStats::default();
    for line in lines.iter_mut() {
        let ids: Vec<_> = line.point_ids().collect();
        for id in ids {
            let Some(point) = line.point_mut(id) else {
                continue;
            };
            stats.sampled += 1;
            match raster.sample(settings.transform.apply(point.p)) {
                Some(l) => {
                    point.weight = (settings.curve.eval(l) * spacing).max(0.0);
                    if point.trace_off {
                        point.trace_off = false;
                        stats.restored += 1;
                    }
                }
                None => {
                    point.weight = 0.0;
                    point.trace_off = true;
                    stats.blanked += 1;
                }
            }
        }
    }
    stats
}

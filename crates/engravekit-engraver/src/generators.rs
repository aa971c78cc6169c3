//! Line generators for the analytic field topologies.
//!
//! Every generator works in parametric space over the unit domain and
//! converts object-space spacing to parametric steps point by point through
//! the surface. Sampled paths are clipped to the domain, then jittered with
//! coherent noise and shaped by the group's line profile.

use std::f64::consts::{PI, TAU};

use engravekit_core::{lerp, smoothstep, Rect, Vec2, EPSILON};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::{DirectionSettings, FieldKind};
use crate::line::{Line, LinePoint};
use crate::noise::Perlin2D;
use crate::surface::Surface;

/// Hard cap on samples in a single generated line.
pub const MAX_LINE_POINTS: usize = 100_000;

const MIN_PARAM_STEP: f64 = 1e-5;

/// A sample produced by a generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedPoint {
    pub st: Vec2,
    pub weight: f64,
    /// Weight before profile shaping.
    pub base_weight: f64,
}

impl GeneratedPoint {
    fn lerp(&self, other: &GeneratedPoint, t: f64) -> GeneratedPoint {
        GeneratedPoint {
            st: self.st.lerp(other.st, t),
            weight: lerp(self.weight, other.weight, t),
            base_weight: lerp(self.base_weight, other.base_weight, t),
        }
    }
}

/// One line produced by a generator, ready to become a [`Line`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedLine {
    pub points: Vec<GeneratedPoint>,
    pub closed: bool,
}

impl GeneratedLine {
    pub fn from_path(path: Vec<Vec2>, weight: f64, closed: bool) -> Self {
        Self {
            points: path
                .into_iter()
                .map(|st| GeneratedPoint {
                    st,
                    weight,
                    base_weight: weight,
                })
                .collect(),
            closed,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_line(self) -> Line {
        let mut line = Line::new();
        for p in self.points {
            let mut point = LinePoint::new(p.st.x, p.st.y, p.weight);
            point.weight_orig = p.base_weight.max(0.0);
            line.push_point(point);
        }
        line.set_closed(self.closed);
        line
    }
}

/// Weight shaping along a line: optional truncation of head and tail plus
/// smooth fades.
///
/// `start`, `end`, the random ranges and both fades are fractions of the
/// line's arc length. `min_weight` is the weight factor at the very ends of
/// a fade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineProfile {
    pub enabled: bool,
    pub start: f64,
    pub end: f64,
    pub start_random: f64,
    pub end_random: f64,
    pub fade_in: f64,
    pub fade_out: f64,
    pub min_weight: f64,
}

impl Default for LineProfile {
    fn default() -> Self {
        Self {
            enabled: false,
            start: 0.0,
            end: 1.0,
            start_random: 0.0,
            end_random: 0.0,
            fade_in: 0.0,
            fade_out: 0.0,
            min_weight: 0.0,
        }
    }
}

impl LineProfile {
    pub fn normalize(&mut self) {
        let unit = |v: f64, fallback: f64| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        self.start = unit(self.start, 0.0);
        self.end = unit(self.end, 1.0);
        if self.end < self.start {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        self.start_random = unit(self.start_random, 0.0);
        self.end_random = unit(self.end_random, 0.0);
        self.fade_in = unit(self.fade_in, 0.0);
        self.fade_out = unit(self.fade_out, 0.0);
        self.min_weight = unit(self.min_weight, 0.0);
    }

    /// Truncate and re-weight a line. Returns `None` when nothing is left.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        line: GeneratedLine,
        surface: &dyn Surface,
        rng: &mut R,
    ) -> Option<GeneratedLine> {
        if !self.enabled || line.len() < 2 {
            return Some(line);
        }
        let mut cum = Vec::with_capacity(line.len());
        let mut total = 0.0;
        let mut prev = surface.point(line.points[0].st.x, line.points[0].st.y);
        for p in &line.points {
            let q = surface.point(p.st.x, p.st.y);
            total += q.distance(prev);
            cum.push(total);
            prev = q;
        }
        if total <= EPSILON {
            return Some(line);
        }

        let s0 = (self.start + self.start_random * rng.random::<f64>()).clamp(0.0, 1.0);
        let e0 = (self.end - self.end_random * rng.random::<f64>()).clamp(0.0, 1.0);
        if e0 - s0 <= EPSILON {
            return None;
        }
        let (a, b) = (s0 * total, e0 * total);

        let at = |d: f64| -> GeneratedPoint {
            let i = cum.partition_point(|c| *c < d).clamp(1, cum.len() - 1);
            let span = cum[i] - cum[i - 1];
            let f = if span > EPSILON {
                (d - cum[i - 1]) / span
            } else {
                0.0
            };
            line.points[i - 1].lerp(&line.points[i], f.clamp(0.0, 1.0))
        };

        let mut kept: Vec<(f64, GeneratedPoint)> = vec![(a, at(a))];
        for (c, p) in cum.iter().zip(&line.points) {
            if *c > a + EPSILON && *c < b - EPSILON {
                kept.push((*c, *p));
            }
        }
        kept.push((b, at(b)));

        let length = b - a;
        let points = kept
            .into_iter()
            .map(|(c, mut p)| {
                let f = (c - a) / length;
                let fin = if self.fade_in > EPSILON {
                    smoothstep(f / self.fade_in)
                } else {
                    1.0
                };
                let fout = if self.fade_out > EPSILON {
                    smoothstep((1.0 - f) / self.fade_out)
                } else {
                    1.0
                };
                p.weight *= lerp(self.min_weight, 1.0, fin.min(fout));
                p
            })
            .collect();

        let untouched = s0 <= EPSILON && e0 >= 1.0 - EPSILON;
        Some(GeneratedLine {
            points,
            closed: line.closed && untouched,
        })
    }
}

/// Everything a generator needs from its group.
pub struct FillContext<'a> {
    pub surface: &'a dyn Surface,
    pub bounds: Rect,
    /// Nominal line spacing in object units.
    pub spacing: f64,
    pub settings: &'a DirectionSettings,
}

impl<'a> FillContext<'a> {
    pub fn new(surface: &'a dyn Surface, spacing: f64, settings: &'a DirectionSettings) -> Self {
        Self {
            surface,
            bounds: Rect::UNIT,
            spacing,
            settings,
        }
    }

    /// Object-space distance between samples along a line.
    fn sample_distance(&self) -> f64 {
        self.spacing / self.settings.resolution.max(1.0)
    }

    fn weight(&self) -> f64 {
        (self.settings.default_weight * self.spacing).max(0.0)
    }

    fn param_step(&self, at: Vec2, dir: Vec2, distance: f64) -> f64 {
        let step = self.surface.param_step(at, dir, distance);
        if step.is_finite() {
            step.max(MIN_PARAM_STEP)
        } else {
            MIN_PARAM_STEP
        }
    }

    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.settings.seed)
    }

    /// Random sideways shift for one line, in parametric units.
    fn line_shift(&self, rng: &mut StdRng, param_spacing: f64) -> f64 {
        if self.settings.line_offset <= 0.0 {
            return 0.0;
        }
        (rng.random::<f64>() * 2.0 - 1.0) * self.settings.line_offset * param_spacing
    }
}

/// Fill with the generator matching the settings' field kind.
///
/// `Map` groups are grown rather than filled; here they fall back to linear.
pub fn fill(ctx: &FillContext<'_>) -> Vec<GeneratedLine> {
    match ctx.settings.kind {
        FieldKind::Linear | FieldKind::Map => fill_linear(ctx),
        FieldKind::Radial => fill_radial(ctx),
        FieldKind::Circular => fill_circular(ctx),
        FieldKind::Spiral => fill_spiral(ctx),
    }
}

/// Parallel lines along the settings' direction.
pub fn fill_linear(ctx: &FillContext<'_>) -> Vec<GeneratedLine> {
    let mut rng = ctx.rng();
    let dir = ctx.settings.direction.normalize_or(Vec2::X);
    let normal = dir.perp();
    let (lo, hi) = ctx
        .bounds
        .corners()
        .iter()
        .map(|c| c.dot(normal))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let center = ctx.bounds.center();
    let mut offset = lo + 0.5 * ctx.param_step(center, normal, ctx.spacing);
    let mut paths = Vec::new();
    while offset < hi - EPSILON {
        let base = normal * offset;
        let at = chord(&ctx.bounds, base, dir)
            .map(|(a, b)| base + dir * (0.5 * (a + b)))
            .unwrap_or(base);
        let sp = ctx.param_step(at, normal, ctx.spacing);
        let shifted = offset + ctx.line_shift(&mut rng, sp);
        let origin = normal * shifted;
        if let Some((a, b)) = chord(&ctx.bounds, origin, dir) {
            let mid = origin + dir * (0.5 * (a + b));
            let backward = grow_straight(ctx, mid, -dir);
            let forward = grow_straight(ctx, mid, dir);
            let mut path: Vec<Vec2> = backward.into_iter().rev().collect();
            path.push(mid);
            path.extend(forward);
            paths.push((path, false));
        }
        offset += sp;
    }
    finish(ctx, paths, &mut rng)
}

/// Rays out of the settings' position, about `pi / spacing` of them.
pub fn fill_radial(ctx: &FillContext<'_>) -> Vec<GeneratedLine> {
    let mut rng = ctx.rng();
    let center = ctx.settings.position;
    let sp = ctx.param_step(center, Vec2::X, ctx.spacing);
    let count = (PI / sp).round().clamp(1.0, 100_000.0) as usize;
    let reach = ctx.bounds.max_corner_distance(center);

    let mut paths = Vec::new();
    for k in 0..count {
        let dtheta = TAU / count as f64;
        let shift = ctx.line_shift(&mut rng, dtheta);
        let dir = Vec2::from_angle(k as f64 * dtheta + shift);
        let mut path = vec![center];
        let mut r = 0.0;
        while r <= reach && path.len() < MAX_LINE_POINTS {
            let at = center + dir * r;
            r += ctx.param_step(at, dir, ctx.sample_distance());
            path.push(center + dir * r);
        }
        paths.extend(clip_runs(&path, &ctx.bounds).into_iter().map(|run| (run, false)));
    }
    finish(ctx, paths, &mut rng)
}

/// Concentric rings around the settings' position.
///
/// The `start` and `end` parameters restrict rings to an arc, as fractions
/// of a full turn. Full rings lying entirely inside the domain are closed.
pub fn fill_circular(ctx: &FillContext<'_>) -> Vec<GeneratedLine> {
    let mut rng = ctx.rng();
    let center = ctx.settings.position;
    let sp = ctx.param_step(center, Vec2::X, ctx.spacing);
    let reach = ctx.bounds.max_corner_distance(center);
    let start = ctx.settings.param("start", 0.0).clamp(0.0, 1.0);
    let end = ctx.settings.param("end", 1.0).clamp(start, 1.0);
    let full = start <= EPSILON && end >= 1.0 - EPSILON;
    let (theta0, theta1) = (start * TAU, end * TAU);

    let mut paths = Vec::new();
    let mut k = 1;
    while k as f64 * sp <= reach {
        let r = (k as f64 * sp + ctx.line_shift(&mut rng, sp) * 0.5).max(0.25 * sp);
        k += 1;
        if theta1 - theta0 <= EPSILON {
            continue;
        }
        let mut path = Vec::new();
        let mut theta = theta0;
        while theta < theta1 && path.len() < MAX_LINE_POINTS {
            let p = center + Vec2::from_angle(theta) * r;
            path.push(p);
            let tangent = Vec2::from_angle(theta).perp();
            let step = ctx.param_step(p, tangent, ctx.sample_distance());
            theta += (step / r).clamp(1e-4, 0.5);
        }
        path.push(center + Vec2::from_angle(theta1) * r);

        let all_inside = path.iter().all(|p| ctx.bounds.contains(*p));
        if full && all_inside {
            paths.push((path, true));
            continue;
        }
        let mut runs = clip_runs(&path, &ctx.bounds);
        let wraps = full
            && runs.len() > 1
            && path.first().is_some_and(|p| ctx.bounds.contains(*p))
            && path.last().is_some_and(|p| ctx.bounds.contains(*p));
        if wraps {
            let first = runs.remove(0);
            if let Some(last) = runs.last_mut() {
                last.extend(first.into_iter().skip(1));
            }
        }
        paths.extend(runs.into_iter().map(|run| (run, false)));
    }
    finish(ctx, paths, &mut rng)
}

/// Archimedean spiral arms around the settings' position.
///
/// `arms` sets the number of interleaved arms and `spin` the winding sense.
/// Adjacent arms are one spacing apart.
pub fn fill_spiral(ctx: &FillContext<'_>) -> Vec<GeneratedLine> {
    let mut rng = ctx.rng();
    let center = ctx.settings.position;
    let sp = ctx.param_step(center, Vec2::X, ctx.spacing);
    let arms = ctx.settings.param("arms", 1.0).round().clamp(1.0, 1000.0) as usize;
    let spin = if ctx.settings.param("spin", 1.0) < 0.0 {
        -1.0
    } else {
        1.0
    };
    let pitch = ctx.settings.spiral_pitch(sp);
    let reach = ctx.bounds.max_corner_distance(center);
    let theta_max = reach / pitch + TAU;

    let mut paths = Vec::new();
    for arm in 0..arms {
        let phase = TAU * arm as f64 / arms as f64 + ctx.line_shift(&mut rng, TAU / arms as f64);
        let mut path = Vec::new();
        let mut theta: f64 = 0.0;
        while theta <= theta_max && path.len() < MAX_LINE_POINTS {
            let r = pitch * theta;
            let dir = Vec2::from_angle(spin * theta + phase);
            let p = center + dir * r;
            path.push(p);
            let step = ctx.param_step(p, dir.perp(), ctx.sample_distance());
            theta += (step / r.max(0.5 * sp)).min(0.5);
        }
        paths.extend(clip_runs(&path, &ctx.bounds).into_iter().map(|run| (run, false)));
    }
    finish(ctx, paths, &mut rng)
}

/// Jitter, weight and profile a batch of sampled paths.
fn finish(ctx: &FillContext<'_>, paths: Vec<(Vec<Vec2>, bool)>, rng: &mut StdRng) -> Vec<GeneratedLine> {
    let jitter = Jitter::new(ctx);
    let weight = ctx.weight();
    let lines: Vec<GeneratedLine> = paths
        .into_iter()
        .filter(|(path, _)| path.len() >= 2)
        .filter_map(|(path, closed)| {
            let path = jitter.apply(ctx, path, closed);
            let line = GeneratedLine::from_path(path, weight, closed);
            ctx.settings.profile.apply(line, ctx.surface, rng)
        })
        .filter(|line| line.len() >= 2)
        .collect();
    debug!(
        "Generated {} {} lines",
        lines.len(),
        ctx.settings.kind.name()
    );
    lines
}

/// Step from `from` along `dir` until leaving the bounds; the exit point is
/// the last sample. `from` itself is not included.
fn grow_straight(ctx: &FillContext<'_>, from: Vec2, dir: Vec2) -> Vec<Vec2> {
    let mut out = Vec::new();
    let mut p = from;
    while out.len() < MAX_LINE_POINTS {
        let step = ctx.param_step(p, dir, ctx.sample_distance());
        let next = p + dir * step;
        if !ctx.bounds.contains(next) {
            let exit = ctx.bounds.exit_point(p, next);
            if exit.distance(p) > EPSILON {
                out.push(exit);
            }
            break;
        }
        out.push(next);
        p = next;
    }
    out
}

/// Parameter interval where `origin + dir * l` lies inside `bounds`.
fn chord(bounds: &Rect, origin: Vec2, dir: Vec2) -> Option<(f64, f64)> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    for (o, d, min, max) in [
        (origin.x, dir.x, bounds.min.x, bounds.max.x),
        (origin.y, dir.y, bounds.min.y, bounds.max.y),
    ] {
        if d.abs() < EPSILON {
            if o < min || o > max {
                return None;
            }
        } else {
            let a = (min - o) / d;
            let b = (max - o) / d;
            lo = lo.max(a.min(b));
            hi = hi.min(a.max(b));
        }
    }
    (hi > lo + EPSILON).then_some((lo, hi))
}

/// Split a sampled path into the runs that lie inside `bounds`, adding the
/// boundary crossing at both ends of each run.
pub(crate) fn clip_runs(path: &[Vec2], bounds: &Rect) -> Vec<Vec<Vec2>> {
    let mut runs = Vec::new();
    let mut cur: Vec<Vec2> = Vec::new();
    let mut prev: Option<Vec2> = None;
    for &p in path {
        let inside = bounds.contains(p);
        match prev {
            Some(q) if inside && !bounds.contains(q) => {
                let entry = bounds.exit_point(p, q);
                if entry.distance(p) > EPSILON {
                    cur.push(entry);
                }
                cur.push(p);
            }
            Some(q) if !inside && bounds.contains(q) => {
                let exit = bounds.exit_point(q, p);
                if exit.distance(q) > EPSILON {
                    cur.push(exit);
                }
                runs.push(std::mem::take(&mut cur));
            }
            _ if inside => cur.push(p),
            _ => {}
        }
        prev = Some(p);
    }
    if !cur.is_empty() {
        runs.push(cur);
    }
    runs.retain(|r| r.len() >= 2);
    runs
}

/// Perpendicular offset from coherent noise.
struct Jitter {
    noise: Perlin2D,
}

impl Jitter {
    fn new(ctx: &FillContext<'_>) -> Self {
        Self {
            noise: Perlin2D::with_seed(ctx.settings.seed),
        }
    }

    fn apply(&self, ctx: &FillContext<'_>, path: Vec<Vec2>, closed: bool) -> Vec<Vec2> {
        let amount = ctx.settings.point_offset * ctx.spacing;
        if amount <= EPSILON || path.len() < 2 {
            return path;
        }
        let n = path.len();
        let mut out: Vec<Vec2> = (0..n)
            .map(|i| {
                let p = path[i];
                let before = path[i.saturating_sub(1)];
                let after = path[(i + 1).min(n - 1)];
                let normal = (after - before).normalize().perp();
                let feature = ctx.param_step(p, Vec2::X, ctx.spacing) * ctx.settings.noise_scale;
                let v = self.noise.sample(p.x / feature, p.y / feature);
                let shift = ctx.param_step(p, normal, amount * v.abs()) * v.signum();
                ctx.bounds.clamp(p + normal * shift)
            })
            .collect();
        if closed {
            out[n - 1] = out[0];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RectSurface;

    fn settings(kind: FieldKind) -> DirectionSettings {
        DirectionSettings::new(kind)
    }

    #[test]
    fn test_linear_fill_line_count() {
        let s = settings(FieldKind::Linear);
        let surface = RectSurface::unit();
        let lines = fill_linear(&FillContext::new(&surface, 0.1, &s));
        assert_eq!(lines.len(), 10);
        for line in &lines {
            let first = line.points.first().unwrap().st;
            let last = line.points.last().unwrap().st;
            assert!(first.x.abs() < 1e-9);
            assert!((last.x - 1.0).abs() < 1e-9);
            assert!((first.y - last.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_fill_diagonal_stays_in_domain() {
        let s = DirectionSettings {
            direction: Vec2::new(1.0, 1.0),
            ..settings(FieldKind::Linear)
        };
        let surface = RectSurface::unit();
        let lines = fill_linear(&FillContext::new(&surface, 0.1, &s));
        assert!(lines.len() >= 12);
        for line in &lines {
            assert!(line.points.iter().all(|p| Rect::UNIT.contains(p.st)));
        }
    }

    #[test]
    fn test_linear_fill_respects_object_spacing() {
        let s = settings(FieldKind::Linear);
        let surface = RectSurface::new(Vec2::ZERO, Vec2::new(1.0, 2.0));
        let lines = fill_linear(&FillContext::new(&surface, 0.1, &s));
        assert_eq!(lines.len(), 20);
    }

    #[test]
    fn test_radial_ray_count() {
        let s = settings(FieldKind::Radial);
        let surface = RectSurface::unit();
        let lines = fill_radial(&FillContext::new(&surface, 0.1, &s));
        assert_eq!(lines.len(), 31);
        for line in &lines {
            let end = line.points.last().unwrap().st;
            let on_edge = end.x.abs() < 1e-6
                || end.y.abs() < 1e-6
                || (end.x - 1.0).abs() < 1e-6
                || (end.y - 1.0).abs() < 1e-6;
            assert!(on_edge, "ray ended at {end:?}");
        }
    }

    #[test]
    fn test_circular_inner_rings_close() {
        let s = settings(FieldKind::Circular);
        let surface = RectSurface::unit();
        // rings of radius 0.12 .. 0.48 fit inside the domain
        let lines = fill_circular(&FillContext::new(&surface, 0.12, &s));
        let closed = lines.iter().filter(|l| l.closed).count();
        assert_eq!(closed, 4);
        for line in lines.iter().filter(|l| l.closed) {
            let a = line.points.first().unwrap().st;
            let b = line.points.last().unwrap().st;
            assert!(a.distance(b) < 1e-9);
        }
        assert!(lines.len() > closed);
    }

    #[test]
    fn test_circular_partial_arc_is_open() {
        let s = settings(FieldKind::Circular).with_param("end", 0.5);
        let surface = RectSurface::unit();
        let lines = fill_circular(&FillContext::new(&surface, 0.1, &s));
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| !l.closed));
    }

    #[test]
    fn test_spiral_arms() {
        let one = settings(FieldKind::Spiral);
        let three = settings(FieldKind::Spiral).with_param("arms", 3.0);
        let surface = RectSurface::unit();
        let a = fill_spiral(&FillContext::new(&surface, 0.1, &one));
        let b = fill_spiral(&FillContext::new(&surface, 0.1, &three));
        assert!(!a.is_empty());
        assert!(b.len() >= 3);
        for line in a.iter().chain(&b) {
            assert!(line.points.iter().all(|p| Rect::UNIT.contains(p.st)));
        }
    }

    #[test]
    fn test_profile_truncates_and_fades() {
        let profile = LineProfile {
            enabled: true,
            start: 0.25,
            end: 0.75,
            fade_in: 0.5,
            ..LineProfile::default()
        };
        let path: Vec<Vec2> = (0..=10).map(|i| Vec2::new(i as f64 / 10.0, 0.5)).collect();
        let line = GeneratedLine::from_path(path, 1.0, false);
        let mut rng = StdRng::seed_from_u64(0);
        let out = profile.apply(line, &RectSurface::unit(), &mut rng).unwrap();
        let first = out.points.first().unwrap();
        let last = out.points.last().unwrap();
        assert!((first.st.x - 0.25).abs() < 1e-9);
        assert!((last.st.x - 0.75).abs() < 1e-9);
        assert!(first.weight.abs() < 1e-9);
        assert!((last.weight - 1.0).abs() < 1e-9);
        assert!(out.points.iter().all(|p| p.base_weight == 1.0));
    }

    #[test]
    fn test_profile_empty_range_drops_line() {
        let profile = LineProfile {
            enabled: true,
            start: 0.5,
            end: 0.5,
            ..LineProfile::default()
        };
        let line = GeneratedLine::from_path(vec![Vec2::ZERO, Vec2::X], 1.0, false);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(profile.apply(line, &RectSurface::unit(), &mut rng).is_none());
    }

    #[test]
    fn test_jitter_is_seeded() {
        let s = DirectionSettings {
            point_offset: 0.3,
            seed: 9,
            ..settings(FieldKind::Linear)
        };
        let surface = RectSurface::unit();
        let a = fill_linear(&FillContext::new(&surface, 0.1, &s));
        let b = fill_linear(&FillContext::new(&surface, 0.1, &s));
        assert_eq!(a, b);
        let plain = fill_linear(&FillContext::new(&surface, 0.1, &settings(FieldKind::Linear)));
        assert_ne!(a, plain);
    }

    #[test]
    fn test_clip_runs_splits_outside_spans() {
        let path = vec![
            Vec2::new(0.5, 0.5),
            Vec2::new(1.5, 0.5),
            Vec2::new(0.5, 0.6),
            Vec2::new(0.4, 0.6),
        ];
        let runs = clip_runs(&path, &Rect::UNIT);
        assert_eq!(runs.len(), 2);
        assert!((runs[0][1].x - 1.0).abs() < 1e-9);
        assert!((runs[1][0].x - 1.0).abs() < 1e-9);
    }
}

//! Dash engine.
//!
//! Converts the weight signal along a line into cache-chain visibility:
//! solid where the weight is at or above `broken_threshold`, blank at or below
//! `zero_threshold`, and a periodic dash/gap pattern in between. The pattern is
//! laid out in dash units of `dash_length * spacing` object units. Each unit
//! gets its own metrics from the local weight, so dashes lengthen and thicken
//! as the weight approaches the solid threshold.
//!
//! Boundary nodes are patched into the cache chain in place. Every run starts
//! from a stripped baseline whose freed slots are recycled through the line's
//! arena free list.

use engravekit_core::{lerp, EPSILON};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::line::{CacheId, CacheKind, Line, PointId, PointState};

/// Numeric knobs of the dash engine.
///
/// Thresholds are weights in object-space units; `dash_length` is a multiple
/// of the group's nominal spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashSettings {
    pub zero_threshold: f64,
    pub broken_threshold: f64,
    pub dash_length: f64,
    /// Minimum solid fraction of a unit as the weight approaches zero.
    pub dash_density: f64,
    /// How much the dash stroke narrows toward the zero threshold.
    pub dash_taper: f64,
    /// Phase jitter of the gap within each unit.
    pub dash_randomness: f64,
    pub random_seed: u64,
}

impl Default for DashSettings {
    fn default() -> Self {
        Self {
            zero_threshold: 0.0,
            broken_threshold: 0.0,
            dash_length: 2.0,
            dash_density: 0.25,
            dash_taper: 0.5,
            dash_randomness: 0.0,
            random_seed: 0,
        }
    }
}

impl DashSettings {
    /// Settings with thresholds `zero..broken` and defaults elsewhere.
    pub fn with_thresholds(zero_threshold: f64, broken_threshold: f64) -> Self {
        Self {
            zero_threshold,
            broken_threshold,
            ..Self::default()
        }
    }

    /// Clamp every field into its valid range.
    ///
    /// An inverted threshold pair is resolved by raising `broken` to `zero`.
    pub fn normalized(&self) -> Self {
        let d = Self::default();
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let zero = finite(self.zero_threshold, d.zero_threshold).max(0.0);
        let broken = finite(self.broken_threshold, d.broken_threshold).max(zero);
        Self {
            zero_threshold: zero,
            broken_threshold: broken,
            dash_length: finite(self.dash_length, d.dash_length).max(0.01),
            dash_density: finite(self.dash_density, d.dash_density).clamp(0.0, 1.0),
            dash_taper: finite(self.dash_taper, d.dash_taper).clamp(0.0, 1.0),
            dash_randomness: finite(self.dash_randomness, d.dash_randomness).clamp(0.0, 1.0),
            random_seed: self.random_seed,
        }
    }

    /// No zero threshold and no dash band: every line is solid.
    pub fn is_disabled(&self) -> bool {
        self.zero_threshold == 0.0 && self.broken_threshold <= self.zero_threshold
    }

    fn band(&self) -> f64 {
        self.broken_threshold - self.zero_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Start,
    End,
    UnitEnd,
}

/// A visibility transition at `offset` object units into a dash unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashBoundary {
    pub offset: f64,
    pub kind: BoundaryKind,
}

/// Layout of one dash unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DashMetrics {
    /// Effective weight the unit was computed for.
    pub weight: f64,
    /// Taper-adjusted stroke width of the dashes.
    pub dash_weight: f64,
    pub dash_on_length: f64,
    pub gap_length: f64,
    pub gap_start: f64,
    pub unit_length: f64,
    /// Ordered transitions; the last is always `UnitEnd` at `unit_length`.
    pub boundaries: Vec<DashBoundary>,
}

/// Compute the layout of a dash unit for a weight inside the dash band.
pub fn establish_dash_metrics<R: Rng + ?Sized>(
    weight: f64,
    settings: &DashSettings,
    spacing: f64,
    rng: &mut R,
) -> DashMetrics {
    let band = settings.band();
    let a = if band > EPSILON {
        ((weight - settings.zero_threshold) / band).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let min_weight = settings.broken_threshold - settings.dash_taper * band;
    let dash_weight = lerp(min_weight, settings.broken_threshold, a);

    let unit = settings.dash_length * spacing;
    let on = unit * (settings.dash_density + (1.0 - settings.dash_density) * a);
    let gap = (unit - on).max(0.0);

    let jitter = settings.dash_randomness * rng.random::<f64>() * unit;
    let mut gap_start = if unit > EPSILON {
        (on + jitter).rem_euclid(unit)
    } else {
        0.0
    };
    if unit - gap_start <= EPSILON {
        gap_start = 0.0;
    }
    let gap_end = gap_start + gap;

    let b = |offset: f64, kind: BoundaryKind| DashBoundary { offset, kind };
    let boundaries = if gap <= EPSILON {
        vec![b(0.0, BoundaryKind::Start), b(unit, BoundaryKind::UnitEnd)]
    } else if on <= EPSILON {
        vec![b(0.0, BoundaryKind::End), b(unit, BoundaryKind::UnitEnd)]
    } else if gap_start <= EPSILON {
        vec![
            b(0.0, BoundaryKind::End),
            b(gap, BoundaryKind::Start),
            b(unit, BoundaryKind::UnitEnd),
        ]
    } else if (gap_end - unit).abs() <= EPSILON {
        vec![
            b(0.0, BoundaryKind::Start),
            b(gap_start, BoundaryKind::End),
            b(unit, BoundaryKind::UnitEnd),
        ]
    } else if gap_end < unit {
        vec![
            b(0.0, BoundaryKind::Start),
            b(gap_start, BoundaryKind::End),
            b(gap_end, BoundaryKind::Start),
            b(unit, BoundaryKind::UnitEnd),
        ]
    } else {
        vec![
            b(0.0, BoundaryKind::End),
            b(gap_end - unit, BoundaryKind::Start),
            b(gap_start, BoundaryKind::End),
            b(unit, BoundaryKind::UnitEnd),
        ]
    };

    DashMetrics {
        weight,
        dash_weight,
        dash_on_length: on,
        gap_length: gap,
        gap_start,
        unit_length: unit,
        boundaries,
    }
}

/// Outcome of one dash pass over a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashStats {
    /// Dash units established.
    pub units: usize,
    /// Boundary nodes inserted into the cache chain.
    pub inserted: usize,
}

impl std::ops::AddAssign for DashStats {
    fn add_assign(&mut self, rhs: Self) {
        self.units += rhs.units;
        self.inserted += rhs.inserted;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Blank,
    Dashed,
    Solid,
}

fn classify(weight: f64, settings: &DashSettings) -> Region {
    if weight <= settings.zero_threshold {
        Region::Blank
    } else if weight >= settings.broken_threshold {
        Region::Solid
    } else {
        Region::Dashed
    }
}

struct ActiveUnit {
    metrics: DashMetrics,
    /// Distance already consumed.
    pos: f64,
    /// Index of the next boundary to emit.
    next: usize,
}

/// Per-segment insertion cursor.
struct Segment {
    original: CacheId,
    cursor: CacheId,
    length: f64,
}

struct DashPass<'a, R: Rng + ?Sized> {
    line: &'a mut Line,
    settings: &'a DashSettings,
    spacing: f64,
    rng: &'a mut R,
    visible: bool,
    unit: Option<ActiveUnit>,
    stats: DashStats,
}

impl<R: Rng + ?Sized> DashPass<'_, R> {
    /// Record a visibility transition `d` object units into the segment.
    fn mark(&mut self, seg: &mut Segment, d: f64, visible: bool, kind: CacheKind) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        let state = if visible { PointState::On } else { PointState::Off };
        if d <= EPSILON {
            if let Some(node) = self.line.cache_node_mut(seg.original) {
                node.dashon = state;
            }
            return;
        }
        if d >= seg.length - EPSILON {
            // applied to the next original node
            return;
        }
        let bt = d / seg.length;
        if let Some(id) = self.line.insert_after(seg.cursor, bt, kind) {
            let dash_weight = self.unit.as_ref().map(|u| u.metrics.dash_weight);
            if let Some(node) = self.line.cache_node_mut(id) {
                node.dashon = state;
                if let Some(w) = dash_weight {
                    node.weight = w;
                }
            }
            seg.cursor = id;
            self.stats.inserted += 1;
        }
    }

    /// Set the dash state of a sample's original cache node.
    fn set_dashon(&mut self, id: PointId, visible: bool) {
        let state = if visible { PointState::On } else { PointState::Off };
        if let Some(node) = self
            .line
            .point(id)
            .and_then(|p| p.cache())
            .and_then(|c| self.line.cache_node_mut(c))
        {
            node.dashon = state;
        }
    }

    fn establish(&mut self, weight: f64) {
        let band = self.settings.band();
        let margin = band * 1e-3;
        let weight = weight.clamp(
            self.settings.zero_threshold + margin,
            self.settings.broken_threshold - margin,
        );
        let metrics = establish_dash_metrics(weight, self.settings, self.spacing, self.rng);
        self.unit = Some(ActiveUnit {
            metrics,
            pos: 0.0,
            next: 0,
        });
        self.stats.units += 1;
    }

    /// Lay dash units over `[d0, d1]` of the current segment.
    fn dash_piece(&mut self, seg: &mut Segment, d0: f64, d1: f64, wa: f64, wb: f64) {
        let unit_length = self.settings.dash_length * self.spacing;
        if unit_length <= EPSILON {
            self.unit = None;
            self.mark(seg, d0, true, CacheKind::BlockStart);
            return;
        }
        let length = seg.length;
        let weight_at = |d: f64| {
            if length > EPSILON {
                lerp(wa, wb, (d / length).clamp(0.0, 1.0))
            } else {
                wa
            }
        };

        let mut d = d0;
        while d1 - d > EPSILON {
            if self.unit.is_none() {
                let ahead = (d + 0.5 * unit_length).min(d1);
                self.establish(weight_at(ahead));
            }
            let Some(unit) = self.unit.as_ref() else {
                break;
            };
            let Some(boundary) = unit.metrics.boundaries.get(unit.next).copied() else {
                self.unit = None;
                continue;
            };
            let event = d + (boundary.offset - unit.pos);
            if event > d1 {
                if let Some(u) = self.unit.as_mut() {
                    u.pos += d1 - d;
                }
                break;
            }
            d = event.max(d);
            if let Some(u) = self.unit.as_mut() {
                u.pos = boundary.offset;
                u.next += 1;
            }
            match boundary.kind {
                BoundaryKind::Start => self.mark(seg, d, true, CacheKind::DashStart),
                BoundaryKind::End => self.mark(seg, d, false, CacheKind::DashEnd),
                BoundaryKind::UnitEnd => self.unit = None,
            }
        }
    }

    fn run_segment(&mut self, a: PointId, b: PointId) {
        let (Some(pa), Some(pb)) = (self.line.point(a), self.line.point(b)) else {
            return;
        };
        let (wa, wb, length) = (pa.weight, pb.weight, pa.segment_length());
        let Some(original) = pa.cache() else {
            return;
        };

        let visible = self.visible;
        if let Some(node) = self.line.cache_node_mut(original) {
            node.dashon = if visible { PointState::On } else { PointState::Off };
        }
        if length <= EPSILON {
            return;
        }

        let mut seg = Segment {
            original,
            cursor: original,
            length,
        };

        let mut cuts = vec![0.0];
        for th in [self.settings.zero_threshold, self.settings.broken_threshold] {
            if (wa - th) * (wb - th) < 0.0 {
                let u = (th - wa) / (wb - wa);
                if u > 0.0 && u < 1.0 {
                    cuts.push(u);
                }
            }
        }
        cuts.push(1.0);
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|x, y| (*x - *y).abs() <= EPSILON);

        for (i, w) in cuts.windows(2).enumerate() {
            let (u0, u1) = (w[0], w[1]);
            let mid = lerp(wa, wb, 0.5 * (u0 + u1));
            let (d0, d1) = (u0 * length, u1 * length);
            match classify(mid, self.settings) {
                Region::Solid => {
                    self.unit = None;
                    self.mark(&mut seg, d0, true, CacheKind::BlockStart);
                }
                Region::Blank => {
                    self.unit = None;
                    self.mark(&mut seg, d0, false, CacheKind::BlockEnd);
                }
                Region::Dashed => {
                    self.dash_piece(&mut seg, d0, d1, wa, wb);
                    if i == 0 {
                        if let Some(unit) = self.unit.as_ref() {
                            let w = unit.metrics.dash_weight;
                            if let Some(node) = self.line.cache_node_mut(original) {
                                node.weight = w;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Rebuild the dash pattern of one line.
///
/// Starts from a stripped baseline, so the result depends only on the
/// sample weights, the settings, the spacing and the generator state.
pub fn update_dash_cache<R: Rng + ?Sized>(
    line: &mut Line,
    settings: &DashSettings,
    spacing: f64,
    rng: &mut R,
) -> DashStats {
    let settings = settings.normalized();
    line.strip_dashes();

    if settings.is_disabled() || line.len() < 2 {
        apply_blockout(line);
        return DashStats::default();
    }

    let ids: Vec<PointId> = line.point_ids().collect();
    let weights: Vec<f64> = ids
        .iter()
        .map(|id| line.point(*id).map_or(0.0, |p| p.weight))
        .collect();
    let n = ids.len();

    // A closed ring is walked from a sample where dash units reset anyway, or
    // with units stretched to tile it, so no unit is cut at the seam.
    let mut spacing = spacing;
    let start = if line.is_closed() && n > 2 {
        match weights[..n - 1]
            .iter()
            .position(|w| classify(*w, &settings) != Region::Dashed)
        {
            Some(k) => k,
            None => {
                spacing = loop_spacing(line, &settings, spacing);
                0
            }
        }
    } else {
        0
    };
    let seam = ids[n - 1];

    let mut pass = DashPass {
        line: &mut *line,
        settings: &settings,
        spacing,
        rng,
        visible: classify(weights[start], &settings) != Region::Blank,
        unit: None,
        stats: DashStats::default(),
    };

    for i in (start..n - 1).chain(0..start) {
        pass.run_segment(ids[i], ids[i + 1]);
        if start > 0 && ids[i + 1] == seam {
            pass.set_dashon(seam, pass.visible);
        }
    }

    if start == 0 {
        let state = match classify(weights[n - 1], &settings) {
            Region::Blank => false,
            Region::Solid => true,
            Region::Dashed => pass.visible,
        };
        pass.set_dashon(seam, state);
    }

    let stats = pass.stats;
    apply_blockout(line);
    stats
}

/// Spacing at which a whole number of dash units spans a closed line.
fn loop_spacing(line: &Line, settings: &DashSettings, spacing: f64) -> f64 {
    let unit = settings.dash_length * spacing;
    let length = line.length();
    if unit <= EPSILON || length <= EPSILON {
        return spacing;
    }
    let count = (length / unit).round().max(1.0);
    spacing * length / (count * unit)
}

/// Force every span that starts at an `Off` sample to be hidden.
pub fn apply_blockout(line: &mut Line) {
    line.ensure_cache();
    let blocked: Vec<CacheId> = line
        .points()
        .filter(|p| p.is_blocked())
        .filter_map(|p| p.cache())
        .collect();
    for start in blocked {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let Some(node) = line.cache_node_mut(id) else {
                break;
            };
            if id != start && node.is_original() {
                break;
            }
            node.on = false;
            node.dashon = PointState::Off;
            cur = node.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RectSurface;
    use engravekit_core::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_with_weights(weights: &[f64], width: f64) -> Line {
        let n = weights.len();
        let mut line = Line::from_records(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| (i as f64 / (n - 1) as f64, 0.5, *w, PointState::On)),
        );
        line.sync(&RectSurface::new(Vec2::ZERO, Vec2::new(width, width)));
        line
    }

    /// A closed ring of `weights.len()` samples, starting at sample `first`.
    fn ring(weights: &[f64], first: usize) -> Line {
        let n = weights.len();
        let sample = |i: usize| {
            let i = (i + first) % n;
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            (0.5 + 0.4 * a.cos(), 0.5 + 0.4 * a.sin(), weights[i], PointState::On)
        };
        let mut line = Line::from_records((0..=n).map(sample));
        line.set_closed(true);
        line.sync(&RectSurface::unit());
        line
    }

    fn transitions(line: &Line) -> Vec<(Vec2, PointState)> {
        let mut out: Vec<_> = line
            .cache_nodes()
            .filter(|n| !n.is_original())
            .map(|n| (n.p, n.dashon))
            .collect();
        out.sort_by(|a, b| a.0.x.total_cmp(&b.0.x).then(a.0.y.total_cmp(&b.0.y)));
        out
    }

    fn steady() -> DashSettings {
        DashSettings {
            dash_length: 2.0,
            dash_randomness: 0.0,
            ..DashSettings::with_thresholds(0.1, 0.5)
        }
    }

    #[test]
    fn test_closed_ring_dashes_ignore_head_position() {
        let mut weights = vec![0.3; 24];
        weights[5] = 0.6;
        let settings = steady();

        let mut a = ring(&weights, 0);
        let mut b = ring(&weights, 9);
        update_dash_cache(&mut a, &settings, 0.07, &mut StdRng::seed_from_u64(3));
        update_dash_cache(&mut b, &settings, 0.07, &mut StdRng::seed_from_u64(3));

        let (ta, tb) = (transitions(&a), transitions(&b));
        assert!(!ta.is_empty());
        assert_eq!(ta.len(), tb.len());
        for (x, y) in ta.iter().zip(&tb) {
            assert!(x.0.distance(y.0) < 1e-6);
            assert_eq!(x.1, y.1);
        }
    }

    #[test]
    fn test_fully_dashed_ring_is_tiled_by_whole_units() {
        let settings = steady();
        let spacing = 0.17;
        let unit = settings.dash_length * spacing;

        let mut closed = ring(&[0.3; 24], 0);
        let fraction = (closed.length() / unit).fract();
        assert!(fraction > 0.2 && fraction < 0.45);
        let stats = update_dash_cache(&mut closed, &settings, spacing, &mut StdRng::seed_from_u64(1));
        assert_eq!(stats.units as f64, (closed.length() / unit).round());

        let mut open = ring(&[0.3; 24], 0);
        open.set_closed(false);
        let stats = update_dash_cache(&mut open, &settings, spacing, &mut StdRng::seed_from_u64(1));
        assert_eq!(stats.units as f64, (open.length() / unit).ceil());
    }

    #[test]
    fn test_normalize_inverted_thresholds() {
        let s = DashSettings::with_thresholds(0.4, 0.1).normalized();
        assert_eq!(s.broken_threshold, 0.4);
        let s = DashSettings {
            dash_density: 3.0,
            dash_length: f64::NAN,
            ..DashSettings::default()
        }
        .normalized();
        assert_eq!(s.dash_density, 1.0);
        assert_eq!(s.dash_length, 2.0);
    }

    #[test]
    fn test_disabled_settings() {
        assert!(DashSettings::default().is_disabled());
        assert!(!DashSettings::with_thresholds(0.0, 0.5).is_disabled());
        assert!(!DashSettings::with_thresholds(0.1, 0.1).is_disabled());
    }

    #[test]
    fn test_metrics_gap_at_end_without_randomness() {
        let s = DashSettings {
            dash_density: 0.0,
            ..DashSettings::with_thresholds(0.0, 1.0)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let m = establish_dash_metrics(0.5, &s, 1.0, &mut rng);
        assert!((m.dash_on_length - 1.0).abs() < 1e-12);
        assert!((m.gap_length - 1.0).abs() < 1e-12);
        let kinds: Vec<BoundaryKind> = m.boundaries.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BoundaryKind::Start, BoundaryKind::End, BoundaryKind::UnitEnd]
        );
    }

    #[test]
    fn test_metrics_taper() {
        let s = DashSettings {
            dash_taper: 1.0,
            ..DashSettings::with_thresholds(0.0, 1.0)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let m = establish_dash_metrics(0.25, &s, 1.0, &mut rng);
        assert!((m.dash_weight - 0.25).abs() < 1e-12);
        let s = DashSettings {
            dash_taper: 0.0,
            ..s
        };
        let m = establish_dash_metrics(0.25, &s, 1.0, &mut rng);
        assert!((m.dash_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_boundaries_are_ordered() {
        let s = DashSettings {
            dash_randomness: 1.0,
            ..DashSettings::with_thresholds(0.1, 0.9)
        };
        let mut rng = StdRng::seed_from_u64(42);
        for k in 1..50 {
            let w = 0.1 + 0.8 * k as f64 / 50.0;
            let m = establish_dash_metrics(w, &s, 0.5, &mut rng);
            assert!(m.boundaries.len() >= 2 && m.boundaries.len() <= 4);
            for pair in m.boundaries.windows(2) {
                assert!(pair[0].offset <= pair[1].offset);
            }
            let last = m.boundaries.last().unwrap();
            assert_eq!(last.kind, BoundaryKind::UnitEnd);
            assert!((last.offset - m.unit_length).abs() < 1e-12);
        }
    }

    #[test]
    fn test_solid_line_has_no_boundaries() {
        let mut line = line_with_weights(&[0.6, 0.8, 0.7], 1.0);
        let s = DashSettings::with_thresholds(0.1, 0.5);
        let stats = update_dash_cache(&mut line, &s, 0.1, &mut StdRng::seed_from_u64(0));
        assert_eq!(stats.inserted, 0);
        assert!(line.cache_nodes().all(|n| n.dashon == PointState::On));
    }

    #[test]
    fn test_zero_line_is_blank() {
        let mut line = line_with_weights(&[0.1, 0.1, 0.1, 0.1], 1.0);
        let s = DashSettings::with_thresholds(0.1, 0.5);
        update_dash_cache(&mut line, &s, 0.1, &mut StdRng::seed_from_u64(0));
        assert!(line.cache_nodes().all(|n| n.dashon == PointState::Off));
    }

    #[test]
    fn test_dashed_band_alternates() {
        let mut line = line_with_weights(&[0.3, 0.3], 1.0);
        let s = DashSettings {
            dash_density: 0.0,
            ..DashSettings::with_thresholds(0.1, 0.5)
        };
        let stats = update_dash_cache(&mut line, &s, 0.1, &mut StdRng::seed_from_u64(0));
        assert!(stats.units >= 4);
        assert!(stats.inserted > 4);
        let states: Vec<PointState> = line.cache_nodes().map(|n| n.dashon).collect();
        for pair in states.windows(2).take(states.len() - 2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rerun_recycles_cache_slots() {
        let mut line = line_with_weights(&[0.3, 0.2, 0.45], 1.0);
        let s = DashSettings::with_thresholds(0.1, 0.5);
        update_dash_cache(&mut line, &s, 0.05, &mut StdRng::seed_from_u64(3));
        let capacity = line.cache_capacity();
        let first: Vec<f64> = line.cache_nodes().map(|n| n.bt).collect();
        update_dash_cache(&mut line, &s, 0.05, &mut StdRng::seed_from_u64(3));
        let second: Vec<f64> = line.cache_nodes().map(|n| n.bt).collect();
        assert_eq!(first, second);
        assert_eq!(line.cache_capacity(), capacity);
    }

    #[test]
    fn test_blockout_overrides_dashes() {
        let mut line = line_with_weights(&[0.8, 0.8, 0.8], 1.0);
        let mid = line.point_ids().nth(1).unwrap();
        line.point_mut(mid).unwrap().on = PointState::Off;
        let s = DashSettings::with_thresholds(0.1, 0.5);
        update_dash_cache(&mut line, &s, 0.1, &mut StdRng::seed_from_u64(0));
        let c = line.point(mid).unwrap().cache().unwrap();
        let node = line.cache_node(c).unwrap();
        assert!(!node.on);
        assert_eq!(node.dashon, PointState::Off);
        let head = line.cache_node(line.cache_head().unwrap()).unwrap();
        assert!(head.is_visible());
    }
}

//! Point groups: lines sharing one generator configuration.

use std::rc::Rc;

use engravekit_core::{lerp, shared, smoothstep, Shared, Vec2, EPSILON};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::dash::{self, DashSettings, DashStats};
use crate::error::{EngraverResult, TraceError, TraceResult};
use crate::field::{DirectionField, DirectionSettings, FieldKind, LinesField, ScalarField};
use crate::generators::{self, FillContext};
use crate::growth::{GrowthParams, GrowthSettings, GrowthState, GrowthStatus};
use crate::line::{Line, PointId, PointState};
use crate::surface::Surface;
use crate::trace::{self, ImageSource, RasterSource, TraceCache, TraceKind, TraceSettings, TraceStats};

/// Default display color, RGBA.
pub const DEFAULT_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Location of one sample point in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRef {
    pub line: usize,
    pub point: PointId,
}

/// Outcome of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    pub lines: usize,
    pub status: GrowthStatus,
}

/// All lines produced by one generator configuration.
pub struct PointGroup {
    pub id: u64,
    pub name: String,
    pub active: bool,
    pub color: [f32; 4],
    /// Nominal line spacing in object units.
    pub spacing: f64,
    pub direction: DirectionSettings,
    pub trace: TraceSettings,
    dashes: Shared<DashSettings>,
    dash_owner: Option<u64>,
    lines: Vec<Line>,
    trace_source: Option<Rc<dyn RasterSource>>,
    trace_cache: TraceCache,
    direction_map: Option<Rc<dyn DirectionField>>,
    spacing_map: Option<Rc<dyn ScalarField>>,
    weight_map: Option<Rc<dyn ScalarField>>,
    growth: Option<GrowthState>,
}

impl std::fmt::Debug for PointGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointGroup")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("spacing", &self.spacing)
            .field("kind", &self.direction.kind)
            .field("lines", &self.lines.len())
            .field("dash_owner", &self.dash_owner)
            .finish()
    }
}

impl PointGroup {
    pub fn new(id: u64, name: impl Into<String>, spacing: f64) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            color: DEFAULT_COLOR,
            spacing: sanitize_spacing(spacing),
            direction: DirectionSettings::default(),
            trace: TraceSettings::default(),
            dashes: shared(DashSettings::default()),
            dash_owner: None,
            lines: Vec::new(),
            trace_source: None,
            trace_cache: TraceCache::new(),
            direction_map: None,
            spacing_map: None,
            weight_map: None,
            growth: None,
        }
    }

    // -------------------------------------------------------------------------
    // Lines
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable line access for host-side edits. Call [`PointGroup::sync`] and
    /// [`PointGroup::update_dash_cache`] afterwards.
    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = lines;
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }

    pub fn cache_node_count(&self) -> usize {
        self.lines.iter().map(Line::cache_len).sum()
    }

    pub fn dash_node_count(&self) -> usize {
        self.lines.iter().map(Line::inserted_node_count).sum()
    }

    /// Resolve dirty points against the surface.
    pub fn sync(&mut self, surface: &dyn Surface) {
        for line in &mut self.lines {
            line.sync(surface);
        }
    }

    // -------------------------------------------------------------------------
    // Dash settings and linking
    // -------------------------------------------------------------------------

    pub fn dashes(&self) -> &Shared<DashSettings> {
        &self.dashes
    }

    /// Snapshot of the current dash settings.
    pub fn dash_settings(&self) -> DashSettings {
        self.dashes.borrow().clone()
    }

    /// Replace the dash settings. Linked groups see the change.
    pub fn set_dash_settings(&mut self, settings: DashSettings) {
        *self.dashes.borrow_mut() = settings.normalized();
    }

    /// Group whose dash settings this group shares, if any.
    pub fn dash_owner(&self) -> Option<u64> {
        self.dash_owner
    }

    pub fn is_linked(&self) -> bool {
        self.dash_owner.is_some()
    }

    /// Share `owner`'s dash settings.
    pub fn link_dashes(&mut self, owner_id: u64, dashes: &Shared<DashSettings>) {
        self.dashes = Rc::clone(dashes);
        self.dash_owner = Some(owner_id);
    }

    /// Take a private copy of the current dash settings.
    ///
    /// An owner keeps its handle so the groups linked to it stay in step.
    pub fn unlink_dashes(&mut self) {
        if self.dash_owner.is_none() {
            return;
        }
        let copy = self.dash_settings();
        self.dashes = shared(copy);
        self.dash_owner = None;
    }

    // -------------------------------------------------------------------------
    // External fields and references
    // -------------------------------------------------------------------------

    pub fn set_direction_map(&mut self, map: Option<Rc<dyn DirectionField>>) {
        self.direction_map = map;
    }

    pub fn set_spacing_map(&mut self, map: Option<Rc<dyn ScalarField>>) {
        self.spacing_map = map;
    }

    pub fn set_weight_map(&mut self, map: Option<Rc<dyn ScalarField>>) {
        self.weight_map = map;
    }

    /// Attach the trace reference and drop any cached raster of the old one.
    pub fn set_trace_source(&mut self, source: Option<Rc<dyn RasterSource>>) {
        self.trace_source = source;
        self.trace_cache.invalidate();
    }

    pub fn invalidate_trace(&mut self) {
        self.trace_cache.invalidate();
    }

    pub fn trace_cache(&self) -> &TraceCache {
        &self.trace_cache
    }

    // -------------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------------

    /// Regenerate every line from the direction settings.
    ///
    /// `Map` groups grow along their direction map, or along their own
    /// current lines when no map is attached.
    pub fn fill(
        &mut self,
        surface: Rc<dyn Surface>,
        growth: &GrowthSettings,
    ) -> EngraverResult<FillReport> {
        self.growth = None;
        let status = if self.direction.kind == FieldKind::Map {
            self.begin_growth(Rc::clone(&surface), growth, None)?;
            self.continue_growth(usize::MAX);
            self.finish_growth(surface.as_ref())
                .unwrap_or(GrowthStatus::Complete)
        } else {
            let ctx = FillContext::new(surface.as_ref(), self.spacing, &self.direction);
            self.lines = generators::fill(&ctx)
                .into_iter()
                .map(|l| l.into_line())
                .collect();
            self.sync(surface.as_ref());
            self.update_dash_cache();
            GrowthStatus::Complete
        };
        info!(
            "Filled group {} '{}' with {} {} lines",
            self.id,
            self.name,
            self.lines.len(),
            self.direction.kind
        );
        Ok(FillReport {
            lines: self.lines.len(),
            status,
        })
    }

    /// Start a resumable growth run, replacing the current lines when it
    /// finishes.
    pub fn begin_growth(
        &mut self,
        surface: Rc<dyn Surface>,
        settings: &GrowthSettings,
        seeds: Option<&[Vec2]>,
    ) -> EngraverResult<()> {
        let field: Rc<dyn DirectionField> = match &self.direction_map {
            Some(map) => Rc::clone(map),
            None if !self.lines.is_empty() => Rc::new(LinesField::from_lines(&self.lines)),
            None => {
                warn!(
                    "Group {} has no direction map; growing along its analytic field",
                    self.id
                );
                Rc::from(self.direction.field(self.spacing))
            }
        };
        let params = GrowthParams {
            resolution: self.direction.resolution,
            settings: settings.clone(),
            ..GrowthParams::new(self.spacing, self.direction.default_weight * self.spacing)
        };
        let mut state = GrowthState::new(field, surface, params)?;
        if let Some(map) = &self.spacing_map {
            state = state.with_spacing_map(Rc::clone(map));
        }
        if let Some(map) = &self.weight_map {
            state = state.with_weight_map(Rc::clone(map));
        }
        match seeds {
            Some(seeds) => {
                for seed in seeds {
                    state.add_seed(*seed);
                }
            }
            None => {
                state.seed_border();
            }
        }
        self.growth = Some(state);
        Ok(())
    }

    /// Run up to `iterations` growth steps. Groups without a growth run
    /// report `Complete`.
    pub fn continue_growth(&mut self, iterations: usize) -> GrowthStatus {
        let Some(state) = self.growth.as_mut() else {
            return GrowthStatus::Complete;
        };
        for _ in 0..iterations {
            if state.step() != GrowthStatus::Running {
                break;
            }
        }
        state.status()
    }

    pub fn is_growing(&self) -> bool {
        self.growth.is_some()
    }

    /// Adopt the lines of the current growth run.
    pub fn finish_growth(&mut self, surface: &dyn Surface) -> Option<GrowthStatus> {
        let state = self.growth.take()?;
        let result = state.finish();
        let profile = self.direction.profile.clone();
        let mut rng = StdRng::seed_from_u64(self.direction.seed);
        self.lines = result
            .lines
            .into_iter()
            .filter_map(|l| profile.apply(l, surface, &mut rng))
            .map(|l| l.into_line())
            .collect();
        self.sync(surface);
        self.update_dash_cache();
        debug!(
            "Growth finished after {} iterations: {:?}",
            result.iterations, result.status
        );
        Some(result.status)
    }

    // -------------------------------------------------------------------------
    // Caches
    // -------------------------------------------------------------------------

    /// Rebuild the dash pattern of every line from one generator seeded with
    /// the dash settings' seed.
    pub fn update_dash_cache(&mut self) -> DashStats {
        let settings = self.dash_settings();
        let mut rng = StdRng::seed_from_u64(settings.random_seed);
        let mut stats = DashStats::default();
        for line in &mut self.lines {
            stats += dash::update_dash_cache(line, &settings, self.spacing, &mut rng);
        }
        debug!(
            "Group {}: {} dash units, {} boundary nodes",
            self.id, stats.units, stats.inserted
        );
        stats
    }

    pub fn strip_dashes(&mut self) {
        for line in &mut self.lines {
            line.strip_dashes();
        }
    }

    /// Add visual sample nodes so no rendered span exceeds `max_span`.
    pub fn refine_cache(&mut self, max_span: f64) -> usize {
        self.lines.iter_mut().map(|l| l.refine_cache(max_span)).sum()
    }

    // -------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------

    fn resolve_trace_source(&mut self) -> TraceResult<Rc<dyn RasterSource>> {
        if let Some(source) = &self.trace_source {
            return Ok(Rc::clone(source));
        }
        let source: Rc<dyn RasterSource> = match self.trace.kind {
            TraceKind::Gradient => Rc::new(self.trace.gradient.clone()),
            TraceKind::Image => {
                let path = self.trace.identifier.as_deref().ok_or_else(|| {
                    TraceError::ReferenceUnavailable("no image attached".to_string())
                })?;
                Rc::new(ImageSource::from_file(std::path::Path::new(path))?)
            }
            TraceKind::Current => {
                return Err(TraceError::ReferenceUnavailable(
                    "current weights have no reference".to_string(),
                ))
            }
        };
        self.trace_source = Some(Rc::clone(&source));
        Ok(source)
    }

    /// Re-weight every point from the trace reference, then re-dash.
    ///
    /// On error the weights are left as they were.
    pub fn trace(&mut self, surface: &dyn Surface) -> TraceResult<TraceStats> {
        if self.lines.is_empty() {
            return Err(TraceError::NoLines);
        }
        if self.trace.kind == TraceKind::Current {
            return Ok(TraceStats::default());
        }
        self.trace.transform.inverse()?;
        let source = self.resolve_trace_source()?;
        let raster = self.trace_cache.refresh(source.as_ref())?;
        self.sync(surface);
        let stats = trace::trace_lines(&mut self.lines, &raster, &self.trace, self.spacing);
        self.update_dash_cache();
        info!(
            "Traced group {}: {} points, {} blanked",
            self.id, stats.sampled, stats.blanked
        );
        Ok(stats)
    }

    // -------------------------------------------------------------------------
    // Point edits
    // -------------------------------------------------------------------------

    /// Sample points within `radius` object units of `center`.
    pub fn points_in_radius(&self, center: Vec2, radius: f64) -> Vec<(PointRef, f64)> {
        let mut found = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            for id in line.point_ids() {
                if let Some(p) = line.point(id) {
                    let d = p.p.distance(center);
                    if d <= radius {
                        found.push((
                            PointRef {
                                line: index,
                                point: id,
                            },
                            d,
                        ));
                    }
                }
            }
        }
        found
    }

    /// Scale weights near `center` by `factor`, fading to no change at
    /// `radius`. Returns the number of points touched.
    pub fn set_weight_in_radius(&mut self, center: Vec2, radius: f64, factor: f64) -> usize {
        if radius.is_nan() || radius <= EPSILON || !factor.is_finite() {
            return 0;
        }
        let hits = self.points_in_radius(center, radius);
        for (at, d) in &hits {
            let falloff = smoothstep(1.0 - d / radius);
            if let Some(p) = self.lines[at.line].point_mut(at.point) {
                p.weight = (p.weight * lerp(1.0, factor, falloff)).max(0.0);
            }
        }
        if !hits.is_empty() {
            self.update_dash_cache();
        }
        hits.len()
    }

    /// Switch points near `center` on or off.
    pub fn set_on_in_radius(&mut self, center: Vec2, radius: f64, on: bool) -> usize {
        let hits = self.points_in_radius(center, radius);
        let state = if on { PointState::On } else { PointState::Off };
        for (at, _) in &hits {
            if let Some(p) = self.lines[at.line].point_mut(at.point) {
                p.on = state;
            }
        }
        if !hits.is_empty() {
            self.update_dash_cache();
        }
        hits.len()
    }

    /// Move a point in object space and re-derive its parametric position.
    pub fn move_point(&mut self, at: PointRef, p: Vec2, surface: &dyn Surface) -> bool {
        let Some(line) = self.lines.get_mut(at.line) else {
            return false;
        };
        if !line.move_point(at.point, p) {
            return false;
        }
        line.sync(surface);
        self.update_dash_cache();
        true
    }

    /// Delete one point. Lines left with fewer than two points are removed.
    pub fn delete_point(&mut self, at: PointRef, surface: &dyn Surface) -> bool {
        let Some(line) = self.lines.get_mut(at.line) else {
            return false;
        };
        if line.remove_point(at.point).is_none() {
            return false;
        }
        line.set_closed(false);
        if line.len() < 2 {
            self.lines.remove(at.line);
        } else {
            line.update_bez_handles();
            line.sync(surface);
        }
        self.update_dash_cache();
        true
    }

    /// Restore every weight to its value before tracing and profiling.
    pub fn reset_weights(&mut self) {
        for line in &mut self.lines {
            let ids: Vec<PointId> = line.point_ids().collect();
            for id in ids {
                if let Some(p) = line.point_mut(id) {
                    p.weight = p.weight_orig;
                }
            }
        }
        self.update_dash_cache();
    }
}

fn sanitize_spacing(spacing: f64) -> f64 {
    if spacing.is_finite() && spacing > EPSILON {
        spacing
    } else {
        warn!("Invalid group spacing {}, using 0.1", spacing);
        0.1
    }
}

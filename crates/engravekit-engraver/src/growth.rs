//! Direction-field driven line growth.
//!
//! Lines are seeded on the border of the working bounds (or at caller
//! supplied points) and both ends are advanced one step per iteration along
//! the field. An end stops when it leaves the bounds, when the field has no
//! direction there, or when it comes closer than `least_spacing` spacings to
//! another line (a merge). Once nothing can grow, one fill-in seed is placed
//! per iteration wherever the domain is farther than `most_spacing` spacings
//! from every line.
//!
//! The state is resumable: a host can call [`GrowthState::step`] from its own
//! event loop and finish whenever it likes. Both ends use the same thresholds.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use engravekit_core::{BoxedIterator, Rect, Vec2, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GrowthError;
use crate::field::{DirectionField, ScalarField};
use crate::generators::{GeneratedLine, GeneratedPoint};
use crate::surface::Surface;

/// Limits and thresholds of a growth run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    pub max_iterations: usize,
    /// Merge distance, in spacings.
    pub least_spacing: f64,
    /// Fill-in distance, in spacings.
    pub most_spacing: f64,
    pub max_points_per_line: usize,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            least_spacing: 0.5,
            most_spacing: 1.2,
            max_points_per_line: 5_000,
        }
    }
}

impl GrowthSettings {
    pub fn normalized(&self) -> Self {
        let least = if self.least_spacing.is_finite() {
            self.least_spacing.clamp(0.05, 1.0)
        } else {
            0.5
        };
        let most = if self.most_spacing.is_finite() {
            self.most_spacing.max(least + 0.1)
        } else {
            1.2_f64.max(least + 0.1)
        };
        Self {
            max_iterations: self.max_iterations.max(1),
            least_spacing: least,
            most_spacing: most,
            max_points_per_line: self.max_points_per_line.max(2),
        }
    }
}

/// Progress of a growth run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStatus {
    Running,
    /// Nothing left to grow and the domain is covered.
    Complete,
    /// The iteration cap was hit; the lines grown so far remain usable.
    Incomplete { iterations: usize },
}

/// Geometry and nominal values of a growth run.
#[derive(Debug, Clone)]
pub struct GrowthParams {
    /// Working bounds in parametric space.
    pub bounds: Rect,
    /// Line spacing in object units.
    pub spacing: f64,
    /// Default weight in object units.
    pub weight: f64,
    /// Samples per spacing along a line.
    pub resolution: f64,
    pub settings: GrowthSettings,
}

impl GrowthParams {
    pub fn new(spacing: f64, weight: f64) -> Self {
        Self {
            bounds: Rect::UNIT,
            spacing,
            weight,
            resolution: 3.0,
            settings: GrowthSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tip {
    growing: bool,
    dir: Vec2,
    ordinal: i64,
}

#[derive(Debug, Clone)]
struct GrowingLine {
    points: VecDeque<GeneratedPoint>,
    head: Tip,
    tail: Tip,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    line: usize,
    ordinal: i64,
    at: Vec2,
}

/// Uniform hash grid over parametric space.
#[derive(Debug, Clone)]
struct SpatialGrid {
    cell: f64,
    cells: HashMap<(i64, i64), Vec<Entry>>,
}

impl SpatialGrid {
    fn new(cell: f64) -> Self {
        Self {
            cell: cell.max(1e-6),
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Vec2) -> (i64, i64) {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
        )
    }

    fn insert(&mut self, entry: Entry) {
        let key = self.key(entry.at);
        self.cells.entry(key).or_default().push(entry);
    }

    /// Distance to the nearest accepted entry within `radius`.
    fn nearest<F>(&self, p: Vec2, radius: f64, accept: F) -> Option<f64>
    where
        F: Fn(&Entry) -> bool,
    {
        let reach = (radius / self.cell).ceil() as i64;
        let (cx, cy) = self.key(p);
        let mut best: Option<f64> = None;
        for ix in cx - reach..=cx + reach {
            for iy in cy - reach..=cy + reach {
                let Some(entries) = self.cells.get(&(ix, iy)) else {
                    continue;
                };
                for e in entries.iter().filter(|e| accept(e)) {
                    let d = e.at.distance(p);
                    if d <= radius && best.is_none_or(|b| d < b) {
                        best = Some(d);
                    }
                }
            }
        }
        best
    }
}

/// Lines and final status of a finished run.
#[derive(Debug, Clone)]
pub struct GrowthResult {
    pub lines: Vec<GeneratedLine>,
    pub status: GrowthStatus,
    pub iterations: usize,
}

/// Resumable state of a growth run.
pub struct GrowthState {
    field: Rc<dyn DirectionField>,
    surface: Rc<dyn Surface>,
    spacing_map: Option<Rc<dyn ScalarField>>,
    weight_map: Option<Rc<dyn ScalarField>>,
    params: GrowthParams,
    lines: Vec<GrowingLine>,
    grid: SpatialGrid,
    iterations: usize,
    scan: usize,
    status: GrowthStatus,
}

impl std::fmt::Debug for GrowthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowthState")
            .field("lines", &self.lines.len())
            .field("iterations", &self.iterations)
            .field("status", &self.status)
            .finish()
    }
}

impl GrowthState {
    pub fn new(
        field: Rc<dyn DirectionField>,
        surface: Rc<dyn Surface>,
        mut params: GrowthParams,
    ) -> Result<Self, GrowthError> {
        params.bounds.validate()?;
        if !params.spacing.is_finite() || params.spacing <= EPSILON {
            return Err(GrowthError::InvalidSpacing(params.spacing));
        }
        params.settings = params.settings.normalized();
        params.resolution = if params.resolution.is_finite() {
            params.resolution.max(1.0)
        } else {
            3.0
        };
        params.weight = if params.weight.is_finite() {
            params.weight.max(0.0)
        } else {
            0.0
        };
        let center = params.bounds.center();
        let cell = surface.param_step(center, Vec2::X, params.spacing);
        Ok(Self {
            field,
            surface,
            spacing_map: None,
            weight_map: None,
            grid: SpatialGrid::new(cell),
            params,
            lines: Vec::new(),
            iterations: 0,
            scan: 0,
            status: GrowthStatus::Running,
        })
    }

    /// Spacing multiplier field.
    pub fn with_spacing_map(mut self, map: Rc<dyn ScalarField>) -> Self {
        self.spacing_map = Some(map);
        self
    }

    /// Weight multiplier field.
    pub fn with_weight_map(mut self, map: Rc<dyn ScalarField>) -> Self {
        self.weight_map = Some(map);
        self
    }

    pub fn status(&self) -> GrowthStatus {
        self.status
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Every grown point, line by line.
    pub fn points(&self) -> BoxedIterator<'_, Vec2> {
        Box::new(
            self.lines
                .iter()
                .flat_map(|l| l.points.iter().map(|p| p.st)),
        )
    }

    fn spacing_at(&self, p: Vec2) -> f64 {
        let base = self.params.spacing;
        match &self.spacing_map {
            Some(map) => {
                let v = map.value(p.x, p.y);
                if v.is_finite() {
                    base * v.max(0.05)
                } else {
                    base
                }
            }
            None => base,
        }
    }

    fn weight_at(&self, p: Vec2) -> f64 {
        let base = self.params.weight;
        match &self.weight_map {
            Some(map) => {
                let v = map.value(p.x, p.y);
                if v.is_finite() {
                    base * v.max(0.0)
                } else {
                    base
                }
            }
            None => base,
        }
    }

    /// Spacing at `p` across `dir`, in parametric units.
    fn param_spacing(&self, p: Vec2, dir: Vec2) -> f64 {
        let sp = self.surface.param_step(p, dir.perp(), self.spacing_at(p));
        if sp.is_finite() {
            sp.max(1e-6)
        } else {
            1e-6
        }
    }

    fn field_direction(&self, p: Vec2) -> Option<Vec2> {
        let d = self.field.direction(p.x, p.y);
        (d.is_finite() && d.length() > EPSILON).then(|| d.normalize())
    }

    fn point(&self, st: Vec2) -> GeneratedPoint {
        let weight = self.weight_at(st);
        GeneratedPoint {
            st,
            weight,
            base_weight: weight,
        }
    }

    /// Start a new line at `st` unless another line is already too close.
    pub fn add_seed(&mut self, st: Vec2) -> bool {
        if !self.params.bounds.contains(st) {
            return false;
        }
        let Some(dir) = self.field_direction(st) else {
            return false;
        };
        let least = self.params.settings.least_spacing * self.param_spacing(st, dir);
        if self.grid.nearest(st, least, |_| true).is_some() {
            return false;
        }
        let index = self.lines.len();
        let mut points = VecDeque::new();
        points.push_back(self.point(st));
        self.lines.push(GrowingLine {
            points,
            head: Tip {
                growing: true,
                dir: -dir,
                ordinal: 0,
            },
            tail: Tip {
                growing: true,
                dir,
                ordinal: 0,
            },
        });
        self.grid.insert(Entry {
            line: index,
            ordinal: 0,
            at: st,
        });
        if self.status != GrowthStatus::Running {
            self.status = GrowthStatus::Running;
        }
        true
    }

    /// Seed along every border edge where the field points into the bounds.
    pub fn seed_border(&mut self) -> usize {
        let b = self.params.bounds;
        let edges = [
            (b.min, Vec2::new(b.max.x, b.min.y), Vec2::Y),
            (Vec2::new(b.max.x, b.min.y), b.max, -Vec2::X),
            (Vec2::new(b.min.x, b.max.y), b.max, -Vec2::Y),
            (b.min, Vec2::new(b.min.x, b.max.y), Vec2::X),
        ];
        let mut seeded = 0;
        for (from, to, inward) in edges {
            let along = (to - from).normalize();
            let length = to.distance(from);
            let mut d = 0.5 * self.param_spacing(from, inward);
            while d < length {
                let p = from + along * d;
                let enters = self
                    .field_direction(p)
                    .is_some_and(|dir| dir.dot(inward) >= 0.5);
                if enters && self.add_seed(p) {
                    seeded += 1;
                }
                d += self.param_spacing(p, inward);
            }
        }
        debug!("Seeded {} growth lines on the border", seeded);
        seeded
    }

    /// Advance one end of one line. Returns whether it grew.
    fn grow_tip(&mut self, index: usize, tail: bool) -> bool {
        let line = &self.lines[index];
        let tip = if tail { line.tail } else { line.head };
        if !tip.growing {
            return false;
        }
        let from = if tail {
            line.points.back()
        } else {
            line.points.front()
        };
        let Some(from) = from.map(|p| p.st) else {
            return false;
        };

        let stop = |state: &mut Self| {
            let line = &mut state.lines[index];
            if tail {
                line.tail.growing = false;
            } else {
                line.head.growing = false;
            }
        };

        if self.lines[index].points.len() >= self.params.settings.max_points_per_line {
            stop(self);
            return false;
        }

        let Some(mut dir) = self.field_direction(from) else {
            stop(self);
            return false;
        };
        if dir.dot(tip.dir) < 0.0 {
            dir = -dir;
        }

        let sp = self.param_spacing(from, dir);
        let step_distance = self.spacing_at(from) / self.params.resolution;
        let step = self.surface.param_step(from, dir, step_distance).max(1e-6);
        let next = from + dir * step;

        if !self.params.bounds.contains(next) {
            let exit = self.params.bounds.exit_point(from, next);
            if exit.distance(from) > EPSILON {
                self.push(index, tail, exit, dir);
            }
            stop(self);
            return true;
        }

        let least = self.params.settings.least_spacing * sp;
        let own_window = (least / step).ceil() as i64 + 2;
        let ordinal = tip.ordinal;
        let blocked = self
            .grid
            .nearest(next, least, |e| {
                e.line != index || (e.ordinal - ordinal).abs() > own_window
            })
            .is_some();
        if blocked {
            stop(self);
            return false;
        }

        self.push(index, tail, next, dir);
        true
    }

    fn push(&mut self, index: usize, tail: bool, st: Vec2, dir: Vec2) {
        let point = self.point(st);
        let line = &mut self.lines[index];
        let ordinal = if tail {
            line.tail.ordinal += 1;
            line.tail.dir = dir;
            line.points.push_back(point);
            line.tail.ordinal
        } else {
            line.head.ordinal -= 1;
            line.head.dir = dir;
            line.points.push_front(point);
            line.head.ordinal
        };
        self.grid.insert(Entry {
            line: index,
            ordinal,
            at: st,
        });
    }

    /// Place one fill-in seed at the first scan position that is farther
    /// than `most_spacing` from every line.
    fn fill_in(&mut self) -> bool {
        let b = self.params.bounds;
        let cell = 0.5 * self.param_spacing(b.center(), Vec2::X);
        let nx = (b.width() / cell).ceil().max(1.0) as usize;
        let ny = (b.height() / cell).ceil().max(1.0) as usize;
        let (cw, ch) = (b.width() / nx as f64, b.height() / ny as f64);
        while self.scan < nx * ny {
            let (i, j) = (self.scan % nx, self.scan / nx);
            self.scan += 1;
            let p = b.min + Vec2::new((i as f64 + 0.5) * cw, (j as f64 + 0.5) * ch);
            let Some(dir) = self.field_direction(p) else {
                continue;
            };
            let most = self.params.settings.most_spacing * self.param_spacing(p, dir);
            if self.grid.nearest(p, most, |_| true).is_none() && self.add_seed(p) {
                return true;
            }
        }
        false
    }

    /// Run one iteration.
    pub fn step(&mut self) -> GrowthStatus {
        if self.status != GrowthStatus::Running {
            return self.status;
        }
        if self.iterations >= self.params.settings.max_iterations {
            warn!(
                "Growth stopped after {} iterations with {} lines",
                self.iterations,
                self.lines.len()
            );
            self.status = GrowthStatus::Incomplete {
                iterations: self.iterations,
            };
            return self.status;
        }
        self.iterations += 1;

        let mut grew = false;
        for index in 0..self.lines.len() {
            grew |= self.grow_tip(index, true);
            grew |= self.grow_tip(index, false);
        }
        if !grew && !self.fill_in() {
            self.status = GrowthStatus::Complete;
        }
        self.status
    }

    /// Iterate until the run completes or hits its cap.
    pub fn run(&mut self) -> GrowthStatus {
        while self.step() == GrowthStatus::Running {}
        self.status
    }

    /// Hand over the grown lines; lines with fewer than two points are dropped.
    pub fn finish(self) -> GrowthResult {
        let lines = self
            .lines
            .into_iter()
            .filter(|l| l.points.len() >= 2)
            .map(|l| GeneratedLine {
                points: l.points.into_iter().collect(),
                closed: false,
            })
            .collect();
        GrowthResult {
            lines,
            status: self.status,
            iterations: self.iterations,
        }
    }
}

/// Grow lines over `params.bounds` from border seeds, or from `seeds` when
/// given, until complete or capped.
pub fn grow_lines(
    field: Rc<dyn DirectionField>,
    surface: Rc<dyn Surface>,
    params: GrowthParams,
    seeds: Option<&[Vec2]>,
) -> Result<GrowthResult, GrowthError> {
    let mut state = GrowthState::new(field, surface, params)?;
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
    state.run();
    Ok(state.finish())
}

//! A pattern: the surface plus every point group engraved on it.

use std::fmt;
use std::rc::Rc;

use engravekit_settings::Config;
use tracing::{debug, info, warn};

use crate::dash::{DashSettings, DashStats};
use crate::error::{EngraverError, EngraverResult};
use crate::field::{DirectionSettings, FieldKind};
use crate::group::{FillReport, PointGroup};
use crate::growth::GrowthSettings;
use crate::surface::{PatchSurface, Surface};
use crate::trace::{ResponseCurve, TraceKind, TraceSettings, TraceStats};

/// Settings new groups are created with.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefaults {
    pub spacing: f64,
    pub direction: DirectionSettings,
    pub dashes: DashSettings,
    pub trace: TraceSettings,
}

impl Default for GroupDefaults {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl GroupDefaults {
    pub fn from_config(config: &Config) -> Self {
        let g = &config.generator;
        let mut direction = DirectionSettings {
            kind: FieldKind::from(g.kind.clone()),
            default_weight: g.default_weight,
            resolution: g.resolution,
            noise_scale: g.noise_scale,
            ..DirectionSettings::default()
        };
        direction.normalize();

        let d = &config.dashes;
        let dashes = DashSettings {
            zero_threshold: d.zero_threshold,
            broken_threshold: d.broken_threshold,
            dash_length: d.dash_length,
            dash_density: d.dash_density,
            dash_taper: d.dash_taper,
            dash_randomness: d.dash_randomness,
            random_seed: 0,
        }
        .normalized();

        let kind = match config.trace.kind.trim().to_ascii_lowercase().as_str() {
            "image" => TraceKind::Image,
            "gradient" => TraceKind::Gradient,
            "current" => TraceKind::Current,
            other => {
                warn!("Unknown trace kind '{}', using current", other);
                TraceKind::Current
            }
        };
        let trace = TraceSettings {
            kind,
            curve: ResponseCurve::new(config.trace.curve.clone()),
            ..TraceSettings::default()
        };

        Self {
            spacing: g.spacing,
            direction,
            dashes,
            trace,
        }
    }
}

fn growth_from_config(config: &Config) -> GrowthSettings {
    let g = &config.growth;
    GrowthSettings {
        max_iterations: g.max_iterations,
        least_spacing: g.least_spacing,
        most_spacing: g.most_spacing,
        max_points_per_line: g.max_points_per_line,
    }
    .normalized()
}

/// Totals over every group of a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternStats {
    pub groups: usize,
    pub lines: usize,
    pub points: usize,
    pub cache_nodes: usize,
    pub dash_nodes: usize,
}

impl fmt::Display for PatternStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} groups, {} lines, {} points, {} cache nodes ({} dash)",
            self.groups, self.lines, self.points, self.cache_nodes, self.dash_nodes
        )
    }
}

/// The surface and its point groups.
#[derive(Debug)]
pub struct Pattern {
    pub name: String,
    pub surface: PatchSurface,
    pub growth: GrowthSettings,
    defaults: GroupDefaults,
    groups: Vec<PointGroup>,
    next_id: u64,
}

impl Pattern {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &Config::default())
    }

    /// Empty pattern whose groups start from `config`'s defaults.
    pub fn with_config(name: impl Into<String>, config: &Config) -> Self {
        Self {
            name: name.into(),
            surface: PatchSurface::default(),
            growth: growth_from_config(config),
            defaults: GroupDefaults::from_config(config),
            groups: Vec::new(),
            next_id: 1,
        }
    }

    pub fn defaults(&self) -> &GroupDefaults {
        &self.defaults
    }

    pub fn surface_rc(&self) -> Rc<dyn Surface> {
        Rc::new(self.surface)
    }

    // -------------------------------------------------------------------------
    // Groups
    // -------------------------------------------------------------------------

    /// Create an empty group from the defaults and return its id.
    pub fn add_group(&mut self, name: impl Into<String>) -> u64 {
        let id = self.next_id;
        let mut group = PointGroup::new(id, name, self.defaults.spacing);
        group.direction = self.defaults.direction.clone();
        group.trace = self.defaults.trace.clone();
        group.set_dash_settings(self.defaults.dashes.clone());
        self.insert_group(group);
        id
    }

    /// Add a fully built group, keeping ids unique.
    pub fn insert_group(&mut self, mut group: PointGroup) -> u64 {
        if self.groups.iter().any(|g| g.id == group.id) {
            let id = self.next_id;
            warn!("Group id {} already in use, reassigned to {}", group.id, id);
            group.id = id;
        }
        self.next_id = self.next_id.max(group.id + 1);
        let id = group.id;
        self.groups.push(group);
        id
    }

    /// Remove a group. Groups sharing its dash settings keep a copy.
    pub fn remove_group(&mut self, id: u64) -> EngraverResult<PointGroup> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(EngraverError::UnknownGroup(id))?;
        let group = self.groups.remove(index);
        for other in &mut self.groups {
            if other.dash_owner() == Some(id) {
                other.unlink_dashes();
            }
        }
        Ok(group)
    }

    pub fn groups(&self) -> &[PointGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut PointGroup> {
        self.groups.iter_mut()
    }

    pub fn group(&self, id: u64) -> EngraverResult<&PointGroup> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(EngraverError::UnknownGroup(id))
    }

    pub fn group_mut(&mut self, id: u64) -> EngraverResult<&mut PointGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(EngraverError::UnknownGroup(id))
    }

    // -------------------------------------------------------------------------
    // Generation and caches
    // -------------------------------------------------------------------------

    pub fn fill_group(&mut self, id: u64) -> EngraverResult<FillReport> {
        let surface = self.surface_rc();
        let growth = self.growth.clone();
        self.group_mut(id)?.fill(surface, &growth)
    }

    /// Refill every active group.
    pub fn fill_all(&mut self) -> EngraverResult<Vec<FillReport>> {
        if self.groups.is_empty() {
            return Err(EngraverError::EmptyPattern(self.name.clone()));
        }
        let surface = self.surface_rc();
        let growth = self.growth.clone();
        let mut reports = Vec::new();
        for group in self.groups.iter_mut().filter(|g| g.active) {
            reports.push(group.fill(Rc::clone(&surface), &growth)?);
        }
        info!("Filled {} groups of '{}'", reports.len(), self.name);
        Ok(reports)
    }

    /// Resync every point and rebuild every dash cache.
    pub fn update_all_dashes(&mut self) -> DashStats {
        let surface = self.surface;
        let mut stats = DashStats::default();
        for group in &mut self.groups {
            group.sync(&surface);
            stats += group.update_dash_cache();
        }
        stats
    }

    pub fn refine_all(&mut self, max_span: f64) -> usize {
        self.groups.iter_mut().map(|g| g.refine_cache(max_span)).sum()
    }

    pub fn trace_group(&mut self, id: u64) -> EngraverResult<TraceStats> {
        let surface = self.surface;
        Ok(self.group_mut(id)?.trace(&surface)?)
    }

    // -------------------------------------------------------------------------
    // Linked dash settings
    // -------------------------------------------------------------------------

    /// Make `linked` share the dash settings of `owner`.
    ///
    /// Links always point at a root owner, so linking to a linked group
    /// shares that group's owner instead. Groups linked to `linked` follow.
    pub fn link_dashes(&mut self, owner: u64, linked: u64) -> EngraverResult<()> {
        self.group(linked)?;
        let root = self.group(owner)?.dash_owner().unwrap_or(owner);
        if root == linked {
            warn!("Group {} cannot share its own dash settings", linked);
            return Ok(());
        }
        let dashes = Rc::clone(self.group(root)?.dashes());
        for group in &mut self.groups {
            if group.id == linked || group.dash_owner() == Some(linked) {
                group.link_dashes(root, &dashes);
                group.update_dash_cache();
            }
        }
        Ok(())
    }

    /// Give a linked group its own copy of the shared dash settings.
    ///
    /// Unlinking an owner does nothing; its dependents keep sharing with it.
    pub fn unlink_dashes(&mut self, id: u64) -> EngraverResult<()> {
        let group = self.group_mut(id)?;
        if !group.is_linked() {
            debug!("Group {} owns its dash settings, nothing to unlink", id);
            return Ok(());
        }
        group.unlink_dashes();
        Ok(())
    }

    /// Replace a group's dash settings and re-dash every group sharing them.
    pub fn set_dash_settings(&mut self, id: u64, settings: DashSettings) -> EngraverResult<()> {
        let group = self.group_mut(id)?;
        let root = group.dash_owner().unwrap_or(id);
        group.set_dash_settings(settings);
        for group in &mut self.groups {
            if group.id == root || group.dash_owner() == Some(root) {
                group.update_dash_cache();
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    pub fn stats(&self) -> PatternStats {
        self.groups
            .iter()
            .fold(PatternStats::default(), |mut acc, g| {
                acc.groups += 1;
                acc.lines += g.line_count();
                acc.points += g.point_count();
                acc.cache_nodes += g.cache_node_count();
                acc.dash_nodes += g.dash_node_count();
                acc
            })
    }
}

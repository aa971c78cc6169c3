//! Serialization and deserialization for pattern files.
//!
//! Pattern files are JSON. Only the sample chains and the settings are
//! stored; cache chains are rebuilt on load.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use engravekit_settings::Config;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::dash::DashSettings;
use crate::error::{EngraverError, EngraverResult};
use crate::field::DirectionSettings;
use crate::group::{PointGroup, DEFAULT_COLOR};
use crate::line::{Line, PointState};
use crate::pattern::Pattern;
use crate::surface::PatchSurface;
use crate::trace::TraceSettings;

/// Pattern file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete pattern file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFile {
    pub version: String,
    pub metadata: PatternMetadata,
    #[serde(default)]
    pub surface: PatchSurface,
    #[serde(default)]
    pub groups: Vec<GroupData>,
}

/// Pattern metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

/// One sample: `(s, t, weight, state)`.
pub type PointRecord = (f64, f64, f64, PointState);

/// Serialized line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineData {
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub points: Vec<PointRecord>,
    /// Indices of points a trace pass blanked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace_off: Vec<usize>,
}

fn default_true() -> bool {
    true
}

fn default_color() -> [f32; 4] {
    DEFAULT_COLOR
}

fn default_spacing() -> f64 {
    0.1
}

/// Serialized point group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupData {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Informational; `dash_link` decides.
    #[serde(default)]
    pub linked: bool,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default)]
    pub dashes: DashSettings,
    /// Id of the group whose dash settings this one shares.
    #[serde(default)]
    pub dash_link: Option<u64>,
    #[serde(default)]
    pub direction: DirectionSettings,
    #[serde(default)]
    pub trace: TraceSettings,
    #[serde(default)]
    pub lines: Vec<LineData>,
}

impl GroupData {
    pub fn from_group(group: &PointGroup) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            active: group.active,
            linked: group.is_linked(),
            color: group.color,
            spacing: group.spacing,
            dashes: group.dash_settings(),
            dash_link: group.dash_owner(),
            direction: group.direction.clone(),
            trace: group.trace.clone(),
            lines: group
                .lines()
                .iter()
                .map(|line| LineData {
                    closed: line.is_closed(),
                    points: line.records(),
                    trace_off: line
                        .points()
                        .enumerate()
                        .filter(|(_, p)| p.trace_off)
                        .map(|(i, _)| i)
                        .collect(),
                })
                .collect(),
        }
    }

    /// Repair values a hand-edited or older file may carry.
    pub fn normalize(&mut self) {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            warn!(
                "Group {}: invalid spacing {}, using {}",
                self.id,
                self.spacing,
                default_spacing()
            );
            self.spacing = default_spacing();
        }
        self.dashes = self.dashes.normalized();
        self.direction.normalize();
        self.trace.curve.normalize();
        if self.dash_link == Some(self.id) {
            self.dash_link = None;
        }
        for line in &mut self.lines {
            let blanked: HashSet<usize> = line.trace_off.drain(..).collect();
            let records = std::mem::take(&mut line.points);
            for (i, record) in records.into_iter().enumerate() {
                let (s, t, w, _) = record;
                if s.is_finite() && t.is_finite() && !w.is_nan() {
                    if blanked.contains(&i) {
                        line.trace_off.push(line.points.len());
                    }
                    line.points.push(record);
                }
            }
        }
        let before = self.lines.len();
        self.lines.retain(|line| line.points.len() >= 2);
        if self.lines.len() != before {
            debug!(
                "Group {}: dropped {} degenerate lines",
                self.id,
                before - self.lines.len()
            );
        }
    }

    fn to_group(&self) -> PointGroup {
        let mut group = PointGroup::new(self.id, self.name.clone(), self.spacing);
        group.active = self.active;
        group.color = self.color;
        group.direction = self.direction.clone();
        group.trace = self.trace.clone();
        group.set_dash_settings(self.dashes.clone());
        group.set_lines(
            self.lines
                .iter()
                .map(|data| {
                    let mut line = Line::from_records(data.points.iter().copied());
                    line.set_closed(data.closed);
                    let ids: Vec<_> = line.point_ids().collect();
                    for &i in &data.trace_off {
                        if let Some(point) = ids.get(i).and_then(|&id| line.point_mut(id)) {
                            point.trace_off = true;
                        }
                    }
                    line
                })
                .collect(),
        );
        group
    }
}

impl PatternFile {
    /// Create a new empty pattern file
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: PatternMetadata {
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            surface: PatchSurface::default(),
            groups: Vec::new(),
        }
    }

    /// Snapshot a pattern.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let mut file = Self::new(pattern.name.clone());
        file.surface = pattern.surface;
        file.groups = pattern.groups().iter().map(GroupData::from_group).collect();
        file
    }

    /// Repair every group; a repeated group id goes to a fresh one.
    ///
    /// Links naming a repeated id resolve to the first group that carries it.
    pub fn normalize(&mut self) {
        let mut next = self
            .groups
            .iter()
            .map(|g| g.id)
            .max()
            .map_or(1, |id| id.saturating_add(1));
        let mut seen = HashSet::new();
        for group in &mut self.groups {
            if !seen.insert(group.id) {
                warn!("Duplicate group id {}, renumbered to {}", group.id, next);
                group.id = next;
                seen.insert(next);
                next = next.saturating_add(1);
            }
            group.normalize();
        }
    }

    /// Build the pattern: groups, links, synced samples and fresh caches.
    pub fn into_pattern(mut self, config: &Config) -> Pattern {
        self.normalize();
        let mut pattern = Pattern::with_config(self.metadata.name.clone(), config);
        pattern.surface = self.surface;

        let mut ids = HashMap::new();
        for data in &self.groups {
            let id = pattern.insert_group(data.to_group());
            ids.insert(data.id, id);
        }

        for data in &self.groups {
            let Some(owner) = data.dash_link else {
                continue;
            };
            let (Some(&linked), Some(&owner_id)) = (ids.get(&data.id), ids.get(&owner)) else {
                warn!(
                    "Group {} links to missing group {}, keeping its own dash settings",
                    data.id, owner
                );
                continue;
            };
            if let Err(e) = pattern.link_dashes(owner_id, linked) {
                warn!("Failed to link group {} to {}: {}", data.id, owner, e);
            }
        }

        let stats = pattern.update_all_dashes();
        debug!(
            "Loaded pattern '{}': {} groups, {} dash nodes",
            pattern.name,
            pattern.groups().len(),
            stats.inserted
        );
        pattern
    }

    /// Parse pattern JSON, rejecting unknown major versions.
    pub fn from_json(content: &str) -> EngraverResult<Self> {
        let file: PatternFile = serde_json::from_str(content)?;
        let major = FILE_FORMAT_VERSION.split('.').next().unwrap_or("1");
        if file.version.split('.').next() != Some(major) {
            return Err(EngraverError::InvalidFile(format!(
                "unsupported version {}",
                file.version
            )));
        }
        Ok(file)
    }

    /// Save pattern to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize pattern")?;

        std::fs::write(path.as_ref(), json).context("Failed to write pattern file")?;

        Ok(())
    }

    /// Load pattern from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read pattern file")?;

        let mut file = Self::from_json(&content).context("Failed to parse pattern file")?;

        // Update modified timestamp
        file.metadata.modified = Utc::now();

        Ok(file)
    }
}

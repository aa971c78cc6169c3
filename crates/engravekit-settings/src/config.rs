//! Configuration for EngraveKit
//!
//! Provides the defaults new point groups start from, with file handling and
//! validation. Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Generator defaults (spacing, weight, resolution, field kind)
//! - Dash defaults (thresholds, dash shape)
//! - Growth limits (iteration cap, spacing multipliers)
//! - Trace defaults (response curve, trace kind)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the platform configuration directory.
pub const APP_DIR: &str = "engravekit";

/// File name of the per-user configuration.
pub const CONFIG_FILE: &str = "config.toml";

/// Line generator defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorDefaults {
    /// Line spacing in object units
    pub spacing: f64,
    /// Default weight as a fraction of the spacing
    pub default_weight: f64,
    /// Samples per spacing along a line
    pub resolution: f64,
    /// Jitter noise frequency
    pub noise_scale: f64,
    /// Field kind name ("linear", "radial", "circular", "spiral", "map")
    pub kind: String,
}

impl Default for GeneratorDefaults {
    fn default() -> Self {
        Self {
            spacing: 0.05,
            default_weight: 0.5,
            resolution: 3.0,
            noise_scale: 1.0,
            kind: "linear".to_string(),
        }
    }
}

/// Dash engine defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashDefaults {
    /// Weight at or below which a line is not drawn
    pub zero_threshold: f64,
    /// Weight at or above which a line is solid
    pub broken_threshold: f64,
    /// Dash unit length as a multiple of the spacing
    pub dash_length: f64,
    pub dash_density: f64,
    pub dash_taper: f64,
    pub dash_randomness: f64,
}

impl Default for DashDefaults {
    fn default() -> Self {
        Self {
            zero_threshold: 0.0,
            broken_threshold: 0.0,
            dash_length: 2.0,
            dash_density: 0.25,
            dash_taper: 0.5,
            dash_randomness: 0.0,
        }
    }
}

/// Growth limits for grown (direction map) groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthDefaults {
    /// Iteration cap of one growth run
    pub max_iterations: usize,
    /// A tip stops closer than this multiple of the spacing to another line
    pub least_spacing: f64,
    /// New seeds are placed this multiple of the spacing away
    pub most_spacing: f64,
    pub max_points_per_line: usize,
}

impl Default for GrowthDefaults {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            least_spacing: 0.5,
            most_spacing: 1.2,
            max_points_per_line: 5_000,
        }
    }
}

/// Trace defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceDefaults {
    /// Trace kind name ("current", "image", "gradient")
    pub kind: String,
    /// Response curve control points, `(luminance, weight fraction)`
    pub curve: Vec<(f64, f64)>,
}

impl Default for TraceDefaults {
    fn default() -> Self {
        Self {
            kind: "current".to_string(),
            curve: vec![(0.0, 1.0), (1.0, 0.0)],
        }
    }
}

/// Complete configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorDefaults,
    pub dashes: DashDefaults,
    pub growth: GrowthDefaults,
    pub trace: TraceDefaults,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the per-user config, or defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = |key: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::out_of_range(key, v))
            }
        };
        let unit = |key: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::out_of_range(key, v))
            }
        };

        // Generator
        positive("generator.spacing", self.generator.spacing)?;
        positive("generator.noise_scale", self.generator.noise_scale)?;
        if !(self.generator.resolution >= 1.0) {
            return Err(ConfigError::out_of_range(
                "generator.resolution",
                self.generator.resolution,
            ));
        }
        if !(self.generator.default_weight >= 0.0) {
            return Err(ConfigError::out_of_range(
                "generator.default_weight",
                self.generator.default_weight,
            ));
        }

        // Dashes
        let d = &self.dashes;
        if !(d.zero_threshold >= 0.0) {
            return Err(ConfigError::out_of_range(
                "dashes.zero_threshold",
                d.zero_threshold,
            ));
        }
        if !(d.broken_threshold >= d.zero_threshold) {
            return Err(ConfigError::out_of_range(
                "dashes.broken_threshold",
                d.broken_threshold,
            ));
        }
        positive("dashes.dash_length", d.dash_length)?;
        unit("dashes.dash_density", d.dash_density)?;
        unit("dashes.dash_taper", d.dash_taper)?;
        unit("dashes.dash_randomness", d.dash_randomness)?;

        // Growth
        let g = &self.growth;
        if g.max_iterations == 0 {
            return Err(ConfigError::out_of_range("growth.max_iterations", 0));
        }
        if g.max_points_per_line < 2 {
            return Err(ConfigError::out_of_range(
                "growth.max_points_per_line",
                g.max_points_per_line,
            ));
        }
        positive("growth.least_spacing", g.least_spacing)?;
        if !(g.most_spacing >= g.least_spacing) {
            return Err(ConfigError::out_of_range(
                "growth.most_spacing",
                g.most_spacing,
            ));
        }

        // Trace
        if self.trace.curve.len() < 2 {
            return Err(ConfigError::out_of_range(
                "trace.curve",
                format!("{} points", self.trace.curve.len()),
            ));
        }
        for (x, y) in &self.trace.curve {
            unit("trace.curve", *x)?;
            unit("trace.curve", *y)?;
        }

        Ok(())
    }
}

/// Location of the per-user config file.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
}

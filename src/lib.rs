//! # EngraveKit
//!
//! An engraving line-pattern engine. A pattern is a parametric surface
//! covered by point groups; each group fills the surface with lines
//! (linear, radial, circular, spiral, or grown along a direction map), and
//! every line carries per-point stroke weights that the dash engine turns
//! into solid, dashed or blank spans.
//!
//! ## Architecture
//!
//! EngraveKit is organized as a workspace with multiple crates:
//!
//! 1. **engravekit-core** - Geometry, shared-ownership aliases, errors
//! 2. **engravekit-settings** - Default configuration, JSON/TOML persistence
//! 3. **engravekit-engraver** - Lines, dash caches, generators, growth, tracing
//! 4. **engravekit** - Command line front end that integrates all crates

use std::path::Path;

use anyhow::Context;
use tracing::info;

pub use engravekit_core::{Affine2, GeometryError, Rect, Vec2};
pub use engravekit_engraver::{
    DashSettings, DirectionSettings, EngraverError, FieldKind, GrowthSettings, GrowthStatus,
    Line, LinePoint, PatchSurface, Pattern, PatternFile, PatternStats, PointGroup, PointState,
    TraceKind, TraceSettings,
};
pub use engravekit_settings::{default_config_path, Config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so statistics on stdout stay clean
/// - RUST_LOG environment variable support, `info` otherwise
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(())
}

/// Load the configuration named on the command line, or the per-user one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match default_config_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            Err(e) => {
                info!("{}; using default configuration", e);
                Ok(Config::default())
            }
        },
    }
}

/// Load (or create) a pattern, rebuild its caches and report statistics.
///
/// A missing file yields a pattern with one default group. New and
/// regenerated patterns are filled and written back to `path`.
pub fn process_pattern(
    path: &Path,
    config: &Config,
    regenerate: bool,
) -> anyhow::Result<PatternStats> {
    let created = !path.exists();
    let mut pattern = if created {
        info!("{} not found, creating a default pattern", path.display());
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pattern".to_string());
        let mut pattern = Pattern::with_config(name, config);
        pattern.add_group("default");
        pattern
    } else {
        PatternFile::load_from_file(path)?.into_pattern(config)
    };

    if created || regenerate {
        pattern.fill_all().context("Failed to fill pattern")?;
        PatternFile::from_pattern(&pattern).save_to_file(path)?;
        info!("Saved {}", path.display());
    }

    Ok(pattern.stats())
}

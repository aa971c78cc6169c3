//! # EngraveKit Engraver
//!
//! Generates engraving line patterns over a parametric surface and keeps
//! the per-line render caches that turn variable stroke weights into solid,
//! dashed or blank spans.
//!
//! ## Core Components
//!
//! ### Lines
//! - **Sample chain**: ordered `LinePoint`s in parametric `(s, t)` space
//! - **Cache chain**: render nodes between samples, rebuilt from the samples
//! - **Dash engine**: dash boundaries where the weight falls into the
//!   broken band, plus blockout of switched-off samples
//!
//! ### Generation
//! - **Generators**: linear, radial, circular and spiral fills
//! - **GrowLines**: streamline growth along an arbitrary direction field
//! - **Direction fields**: analytic fields, normal maps, existing lines
//!
//! ### Tracing
//! - **Raster sources**: images and gradients, cached by modification stamp
//! - **Response curve**: luminance to weight mapping
//!
//! ## Architecture
//!
//! ```text
//! Pattern (surface + groups)
//!   └── PointGroup (settings, linked dash settings)
//!         └── Line (sample chain + cache chain arena)
//! ```

pub mod dash;
pub mod error;
pub mod field;
pub mod generators;
pub mod group;
pub mod growth;
pub mod line;
pub mod noise;
pub mod pattern;
pub mod serialization;
pub mod surface;
pub mod trace;

pub use dash::{
    apply_blockout, establish_dash_metrics, update_dash_cache, BoundaryKind, DashBoundary,
    DashMetrics, DashSettings, DashStats,
};
pub use error::{EngraverError, EngraverResult, GrowthError, TraceError, TraceResult};
pub use field::{
    CircularField, DirectionField, DirectionSettings, FieldKind, LinearField, LinesField,
    LumaField, NormalMapField, RadialField, ScalarField, SpiralField,
};
pub use generators::{
    fill, fill_circular, fill_linear, fill_radial, fill_spiral, FillContext, GeneratedLine,
    GeneratedPoint, LineProfile,
};
pub use group::{FillReport, PointGroup, PointRef};
pub use growth::{
    grow_lines, GrowthParams, GrowthResult, GrowthSettings, GrowthState, GrowthStatus,
};
pub use line::{
    CacheId, CacheKind, CacheNode, Line, LinePoint, PointId, PointState, SyncState,
};
pub use noise::Perlin2D;
pub use pattern::{GroupDefaults, Pattern, PatternStats};
pub use serialization::{GroupData, LineData, PatternFile, PatternMetadata, FILE_FORMAT_VERSION};
pub use surface::{PatchSurface, QuadSurface, RectSurface, Surface};
pub use trace::{
    trace_lines, GradientShape, GradientSource, ImageSource, Raster, RasterSource,
    ResponseCurve, TraceCache, TraceKind, TraceSettings, TraceStats,
};

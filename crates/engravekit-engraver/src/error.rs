//! Error types for the engraver crate.
//!
//! This module provides structured error types for pattern management,
//! trace sampling and line growth.

use engravekit_core::GeometryError;
use std::io;
use thiserror::Error;

/// Errors that can occur during pattern operations.
#[derive(Error, Debug)]
pub enum EngraverError {
    /// No group with the given id exists in the pattern.
    #[error("Unknown group: {0}")]
    UnknownGroup(u64),

    /// The operation needs at least one line or group.
    #[error("Pattern is empty: {0}")]
    EmptyPattern(String),

    /// A pattern file could not be interpreted at all.
    #[error("Invalid pattern file: {0}")]
    InvalidFile(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A trace pass failed.
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// A growth run could not be started.
    #[error("Growth error: {0}")]
    Growth(#[from] GrowthError),
}

/// Errors reported by the trace sampler.
///
/// None of these are fatal to a group: weights stay at their current values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// No reference is attached, or it could not be rendered.
    #[error("Trace reference unavailable: {0}")]
    ReferenceUnavailable(String),

    /// The reference rendered to a zero-sized raster.
    #[error("Trace reference rendered an empty raster ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    /// The group has no lines to trace.
    #[error("Nothing to trace: group has no lines")]
    NoLines,

    /// The reference transform cannot be used.
    #[error("Trace transform error: {0}")]
    Transform(#[from] GeometryError),

    /// Image loading failed.
    #[error("Image error: {0}")]
    Image(String),
}

/// Errors that prevent a growth run from starting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrowthError {
    /// The working bounds have no area.
    #[error("Degenerate growth bounds: {0}")]
    DegenerateBounds(#[from] GeometryError),

    /// Spacing must be positive and finite.
    #[error("Invalid growth spacing: {0}")]
    InvalidSpacing(f64),
}

/// Result type alias for pattern operations.
pub type EngraverResult<T> = Result<T, EngraverError>;

/// Result type alias for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engraver_error_display() {
        let err = EngraverError::UnknownGroup(7);
        assert_eq!(err.to_string(), "Unknown group: 7");

        let err = EngraverError::InvalidFile("missing groups".to_string());
        assert_eq!(err.to_string(), "Invalid pattern file: missing groups");
    }

    #[test]
    fn test_trace_error_display() {
        let err = TraceError::EmptyRaster {
            width: 0,
            height: 4,
        };
        assert_eq!(
            err.to_string(),
            "Trace reference rendered an empty raster (0x4)"
        );
        assert_eq!(
            TraceError::NoLines.to_string(),
            "Nothing to trace: group has no lines"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: EngraverError = TraceError::NoLines.into();
        assert!(matches!(err, EngraverError::Trace(_)));

        let err: EngraverError = GrowthError::InvalidSpacing(0.0).into();
        assert!(matches!(err, EngraverError::Growth(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: EngraverError = io_err.into();
        assert!(matches!(err, EngraverError::Io(_)));
    }
}

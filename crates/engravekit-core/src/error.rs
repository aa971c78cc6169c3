//! Error handling for EngraveKit
//!
//! Provides the error types shared across the workspace:
//! - Geometry errors (degenerate input that cannot be repaired)
//! - A unified `Error` for callers that do not care about the layer
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised only when a degenerate input cannot be substituted with a safe
/// default. Most geometric degeneracies are repaired in place instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A transform has no inverse
    #[error("Transform is not invertible (determinant {determinant})")]
    SingularTransform {
        /// The determinant of the linear part.
        determinant: f64,
    },

    /// A rectangle with zero or negative extent
    #[error("Degenerate bounds: {width} x {height}")]
    DegenerateBounds {
        /// Width of the rectangle.
        width: f64,
        /// Height of the rectangle.
        height: f64,
    },

    /// A value was NaN or infinite where a finite value is required
    #[error("Non-finite value for {name}")]
    NonFinite {
        /// Name of the offending quantity.
        name: String,
    },
}

/// Main error type for EngraveKit
///
/// A unified error type that can represent any error from the shared layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

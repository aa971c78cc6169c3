//! # EngraveKit Core
//!
//! Core types and utilities shared by the EngraveKit crates.
//! Provides 2D geometry primitives, shared-ownership aliases used for
//! linked settings, and the common error types.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, GeometryError, Result};

pub use geometry::{lerp, segment_distance, smoothstep, Affine2, Rect, Vec2, EPSILON};

pub use types::{shared, BoxedIterator, Shared};

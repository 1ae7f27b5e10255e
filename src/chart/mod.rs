//! Chart module - turns raw chart points into timed frequency control points
//!
//! This module provides:
//! - Point type and input validation
//! - Exponential smoothing of values
//! - Duration fitting with decimation
//! - Value to frequency scaling

pub mod fitting;
mod point;
pub mod scaling;
pub mod smoothing;

pub use fitting::{fit, FittedSeries};
pub use point::{split, validate, GraphPoint, SanityError};
pub use scaling::scale;
pub use smoothing::smooth;

//! Chart points and the up-front sanity checks applied to them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that reject a chart before any audio is produced
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityError {
    #[error("No points were supplied")]
    InputEmpty,

    #[error("At least two points are needed to form a sweep")]
    InputTooShort,

    /// Raised for negative timestamps and for timestamps that go backwards.
    #[error("Timestamps must be non-negative and in ascending order")]
    NegativeTimestamp,
}

/// A single chart point: where it sits in time and what value it carries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct GraphPoint {
    pub relative_time: f64,
    pub value: f64,
}

impl GraphPoint {
    pub fn new(relative_time: f64, value: f64) -> Self {
        Self {
            relative_time,
            value,
        }
    }
}

impl From<(f64, f64)> for GraphPoint {
    fn from((relative_time, value): (f64, f64)) -> Self {
        Self::new(relative_time, value)
    }
}

impl From<GraphPoint> for (f64, f64) {
    fn from(point: GraphPoint) -> Self {
        (point.relative_time, point.value)
    }
}

/// Cheap structural checks run before the pipeline starts.
///
/// Ordering is not checked here; the duration fitter reports out-of-order
/// timestamps when it finds a negative segment.
pub fn validate(points: &[GraphPoint]) -> Result<(), SanityError> {
    match points.len() {
        0 => return Err(SanityError::InputEmpty),
        1 => return Err(SanityError::InputTooShort),
        _ => {}
    }

    if points.iter().any(|p| p.relative_time < 0.0) {
        return Err(SanityError::NegativeTimestamp);
    }

    Ok(())
}

/// Split points into parallel time and value arrays
pub fn split(points: &[GraphPoint]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.relative_time, p.value)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(f64, f64)]) -> Vec<GraphPoint> {
        raw.iter().copied().map(GraphPoint::from).collect()
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(validate(&[]), Err(SanityError::InputEmpty));
    }

    #[test]
    fn test_single_point_rejected() {
        assert_eq!(
            validate(&points(&[(1.0, 1.0)])),
            Err(SanityError::InputTooShort)
        );
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        assert_eq!(
            validate(&points(&[(0.0, 1.0), (-1.0, 2.0)])),
            Err(SanityError::NegativeTimestamp)
        );
    }

    #[test]
    fn test_unordered_input_passes_validation() {
        // Caught later by the fitter
        assert!(validate(&points(&[(10.0, 10.0), (5.0, 30.0), (20.0, 20.0)])).is_ok());
    }

    #[test]
    fn test_points_deserialize_from_pairs() {
        let parsed: Vec<GraphPoint> = serde_json::from_str("[[0, 1.5], [2.0, -3]]").unwrap();
        assert_eq!(parsed, points(&[(0.0, 1.5), (2.0, -3.0)]));
    }
}

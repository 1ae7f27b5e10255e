//! Linear mapping of chart values onto the audible frequency band.

/// Spans narrower than this are treated as flat.
pub const DEGENERATE_RANGE: f64 = 0.003;

/// Map `values` linearly into `[min, max]`.
///
/// A flat series (span below [`DEGENERATE_RANGE`]) is scaled as if its range
/// were `[0, 1]`, which pins every value to `min`.
pub fn scale(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    let (lowest, span) = match bounds(values) {
        Some((lowest, highest)) if highest - lowest >= DEGENERATE_RANGE => {
            (lowest, highest - lowest)
        }
        Some(_) => {
            log::debug!("Flat value range, mapping every point to {} Hz", min);
            return vec![min; values.len()];
        }
        None => return Vec::new(),
    };

    let factor = (max - min) / span;
    values.iter().map(|v| (v - lowest) * factor + min).collect()
}

/// Smallest and largest element, or `None` for an empty slice
pub(crate) fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

//! Exponential moving average over chart values.
//!
//! The filter is causal, so the smoothed curve lags the raw one slightly.
//! In exchange, single-point spikes no longer turn into audible chirps.

/// Lowest alpha accepted; anything smaller would freeze the curve.
pub const MIN_ALPHA: f64 = 0.0001;

/// Smooth `values` with the given alpha, clamped to `[MIN_ALPHA, 1]`.
///
/// `alpha == 1` returns the input unchanged.
pub fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = alpha.clamp(MIN_ALPHA, 1.0);
    let mut output = Vec::with_capacity(values.len());

    let mut previous = match values.first() {
        Some(&first) => first,
        None => return output,
    };
    output.push(previous);

    for &value in &values[1..] {
        previous += alpha * (value - previous);
        output.push(previous);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_kept() {
        let out = smooth(&[4.0, 0.0, 0.0], 0.5);
        assert_eq!(out, vec![4.0, 2.0, 1.0]);
    }

    #[test]
    fn test_alpha_one_is_identity() {
        let values = [1.0, -3.0, 7.5, 2.0];
        assert_eq!(smooth(&values, 1.0), values.to_vec());
    }

    #[test]
    fn test_alpha_is_clamped() {
        let values = [0.0, 10.0];
        assert_eq!(smooth(&values, 5.0), vec![0.0, 10.0]);

        let out = smooth(&values, 0.0);
        assert!((out[1] - 10.0 * MIN_ALPHA).abs() < 1e-12);
    }

    #[test]
    fn test_spike_is_damped() {
        let out = smooth(&[0.0, 0.0, 100.0, 0.0, 0.0], 0.35);
        assert_eq!(out.len(), 5);
        assert!(out[2] < 50.0);
        assert!(out[3] < out[2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(smooth(&[], 0.35).is_empty());
    }
}

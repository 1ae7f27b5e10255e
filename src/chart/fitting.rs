//! Duration fitting - choose how long the sweep plays and where each point lands
//!
//! Timestamps are rescaled into `[0, D]`. Every segment between two adjacent
//! points must last at least [`MIN_SEGMENT_DURATION`], otherwise the listener
//! cannot hear it. When the segments do not fit, `D` grows; once it would
//! pass the policy's ceiling, the series is decimated instead.
//!
//! ## Termination
//!
//! Each round either grows `D` by at least [`MINIMAL_ENLARGEMENT`] (bounded
//! by the ceiling) or roughly halves the point count (bounded below by two
//! points). Once `D` has saturated, only decimation remains. The loop also
//! carries an explicit iteration limit derived from both bounds.

use crate::cancel::CancellationToken;
use crate::config::DurationPolicy;

use super::point::SanityError;
use super::scaling::{bounds, DEGENERATE_RANGE};

/// Shortest segment a listener can still make out, in seconds
pub const MIN_SEGMENT_DURATION: f64 = 0.035;

/// Slack allowed when comparing durations
pub const TOLERANCE: f64 = 0.005;

/// Smallest step by which the duration grows per round
pub const MINIMAL_ENLARGEMENT: f64 = 0.03;

/// Number of neighbouring points merged into one during decimation
pub const DECIMATION_LEVEL: usize = 2;

/// Control points whose timestamps now live in `[0, duration]`
#[derive(Debug, Clone, PartialEq)]
pub struct FittedSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    /// Chosen playback duration in seconds
    pub duration: f64,
    /// How many decimation passes were applied
    pub decimations: usize,
}

impl FittedSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Result of walking the segments of a rescaled series
#[derive(Debug, Clone, Copy)]
struct SegmentSurvey {
    /// Total duration needed if every short segment were stretched
    suggested: f64,
    shortest: f64,
}

/// Fit `times`/`values` into the duration allowed by `policy`.
///
/// `times` and `values` must have equal length of at least two. A raised
/// `cancel` flag ends fitting early with the most recent rescaling.
pub fn fit(
    times: &[f64],
    values: &[f64],
    policy: DurationPolicy,
    cancel: &CancellationToken,
) -> Result<FittedSeries, SanityError> {
    fit_until(times, values, policy, || cancel.is_cancelled())
}

/// [`fit`] with the cancellation check supplied as a closure, polled once
/// per round and once per segment.
fn fit_until(
    times: &[f64],
    values: &[f64],
    policy: DurationPolicy,
    mut should_stop: impl FnMut() -> bool,
) -> Result<FittedSeries, SanityError> {
    debug_assert_eq!(times.len(), values.len());

    let maximum = policy.maximum();
    let mut requested = policy.requested();
    let mut times = times.to_vec();
    let mut values = values.to_vec();
    let mut decimations = 0;
    let limit = iteration_limit(maximum, times.len());

    let mut iteration = 0;
    loop {
        let duration = requested.min(maximum);
        let scaled = rescale(&times, duration);

        let accept = move |scaled: Vec<f64>, values: Vec<f64>| FittedSeries {
            times: scaled,
            values,
            duration,
            decimations,
        };

        if should_stop() {
            log::debug!("Duration fitting cancelled after {} rounds", iteration);
            return Ok(accept(scaled, values));
        }

        let survey = match survey_segments(&scaled, &mut should_stop)? {
            Some(survey) => survey,
            None => return Ok(accept(scaled, values)),
        };

        log::debug!(
            "Fit round {}: {} points over {:.3}s, shortest segment {:.4}s, suggested {:.3}s",
            iteration,
            scaled.len(),
            duration,
            survey.shortest,
            survey.suggested
        );

        if survey.suggested <= duration + TOLERANCE {
            log::info!(
                "Fitted {} points into {:.3}s after {} decimation(s)",
                scaled.len(),
                duration,
                decimations
            );
            return Ok(accept(scaled, values));
        }

        if iteration >= limit {
            log::warn!(
                "Duration fitting did not settle after {} rounds, keeping {:.3}s",
                iteration,
                duration
            );
            return Ok(accept(scaled, values));
        }

        let enlarged = duration + (survey.suggested - duration).max(MINIMAL_ENLARGEMENT);

        if enlarged > maximum {
            if times.len().div_ceil(DECIMATION_LEVEL) < 2 {
                log::warn!(
                    "Cannot decimate below two points, keeping segments of {:.4}s",
                    survey.shortest
                );
                return Ok(accept(scaled, values));
            }

            let (fewer_times, fewer_values) = decimate(&times, &values, DECIMATION_LEVEL);
            log::debug!(
                "Needed {:.3}s but ceiling is {:.3}s, decimated {} -> {} points",
                enlarged,
                maximum,
                times.len(),
                fewer_times.len()
            );
            times = fewer_times;
            values = fewer_values;
            decimations += 1;
        }

        requested = enlarged;
        iteration += 1;
    }
}

/// Linearly map `times` into `[0, duration]`.
///
/// A span below [`DEGENERATE_RANGE`] is treated as a unit span so equal
/// timestamps do not divide by zero.
pub fn rescale(times: &[f64], duration: f64) -> Vec<f64> {
    let Some((lowest, highest)) = bounds(times) else {
        return Vec::new();
    };

    let span = highest - lowest;
    let span = if span < DEGENERATE_RANGE { 1.0 } else { span };
    let factor = duration / span;

    times.iter().map(|t| (t - lowest) * factor).collect()
}

/// Average consecutive chunks of `level` points into one.
///
/// The final chunk may be shorter and is averaged over what it holds.
pub fn decimate(times: &[f64], values: &[f64], level: usize) -> (Vec<f64>, Vec<f64>) {
    let level = level.max(1);
    let mean = |chunk: &[f64]| chunk.iter().sum::<f64>() / chunk.len() as f64;

    let times = times.chunks(level).map(mean).collect();
    let values = values.chunks(level).map(mean).collect();
    (times, values)
}

/// Sum segment durations, stretching any that are too short to hear.
///
/// A segment of zero or negative length means the input was not strictly
/// ascending. Returns `Ok(None)` if stopped mid-walk.
fn survey_segments(
    times: &[f64],
    should_stop: &mut impl FnMut() -> bool,
) -> Result<Option<SegmentSurvey>, SanityError> {
    let mut suggested = 0.0;
    let mut shortest = f64::INFINITY;

    for pair in times.windows(2) {
        if should_stop() {
            return Ok(None);
        }

        let segment = pair[1] - pair[0];
        if segment <= 0.0 {
            log::warn!(
                "Timestamps not ascending ({:.4}s -> {:.4}s)",
                pair[0],
                pair[1]
            );
            return Err(SanityError::NegativeTimestamp);
        }

        shortest = shortest.min(segment);
        suggested += if segment + TOLERANCE < MIN_SEGMENT_DURATION {
            MIN_SEGMENT_DURATION
        } else {
            segment
        };
    }

    Ok(Some(SegmentSurvey {
        suggested,
        shortest,
    }))
}

/// Upper bound on fitting rounds: enlargement steps up to the ceiling plus
/// one decimation per halving of the point count.
fn iteration_limit(maximum: f64, points: usize) -> usize {
    let enlargements = (maximum.max(0.0) / MINIMAL_ENLARGEMENT).ceil() as usize;
    let halvings = usize::BITS - points.leading_zeros();
    enlargements
        .saturating_add(halvings as usize)
        .saturating_add(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(count: usize, span: f64) -> (Vec<f64>, Vec<f64>) {
        let step = span / (count - 1) as f64;
        let times = (0..count).map(|i| i as f64 * step).collect();
        let values = (0..count).map(|i| i as f64).collect();
        (times, values)
    }

    fn run(times: &[f64], policy: DurationPolicy) -> Result<FittedSeries, SanityError> {
        let values: Vec<f64> = (0..times.len()).map(|i| i as f64).collect();
        fit(times, &values, policy, &CancellationToken::new())
    }

    #[test]
    fn test_short_policy_fits_without_decimation() {
        let fitted = run(&[0.0, 5.0, 10.0], DurationPolicy::Short).unwrap();
        assert!((fitted.duration - 2.0).abs() < 1e-9);
        assert_eq!(fitted.times, vec![0.0, 1.0, 2.0]);
        assert_eq!(fitted.decimations, 0);
    }

    #[test]
    fn test_recommended_policy_uses_requested_duration() {
        let fitted = run(&[0.0, 5.0, 10.0], DurationPolicy::Recommended).unwrap();
        assert!((fitted.duration - 3.0).abs() < 1e-9);
        assert_eq!(fitted.len(), 3);
    }

    #[test]
    fn test_dense_series_is_decimated() {
        let (times, values) = linear(2001, 200.0);
        let fitted = fit(
            &times,
            &values,
            DurationPolicy::Recommended,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(fitted.len(), 126);
        assert_eq!(fitted.decimations, 4);
        assert!((fitted.duration - 10.0).abs() < 0.1);

        let shortest = fitted
            .times
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);
        assert!(shortest + TOLERANCE >= MIN_SEGMENT_DURATION);
    }

    #[test]
    fn test_moderate_series_grows_duration() {
        // 150 segments need 5.25s, more than requested but below the ceiling
        let (times, _) = linear(151, 30.0);
        let fitted = run(&times, DurationPolicy::Recommended).unwrap();
        assert_eq!(fitted.decimations, 0);
        assert!(fitted.duration > 3.0);
        assert!(fitted.duration <= 10.0);
        assert!(fitted.duration >= 150.0 * (MIN_SEGMENT_DURATION - TOLERANCE));
    }

    #[test]
    fn test_duration_never_exceeds_ceiling() {
        let (times, _) = linear(5000, 10.0);
        for policy in [
            DurationPolicy::Short,
            DurationPolicy::Recommended,
            DurationPolicy::Long,
            DurationPolicy::Exactly(4.0),
        ] {
            let fitted = run(&times, policy).unwrap();
            assert!(fitted.duration <= policy.maximum() + 0.1, "{:?}", policy);
            assert_eq!(fitted.times[0], 0.0);
        }
    }

    #[test]
    fn test_policy_ordering() {
        let (times, _) = linear(400, 40.0);
        let short = run(&times, DurationPolicy::Short).unwrap().duration;
        let recommended = run(&times, DurationPolicy::Recommended).unwrap().duration;
        let long = run(&times, DurationPolicy::Long).unwrap().duration;
        assert!(short <= recommended);
        assert!(recommended <= long);
    }

    #[test]
    fn test_equal_timestamps_rejected() {
        assert_eq!(
            run(&[10.0, 10.0], DurationPolicy::Recommended),
            Err(SanityError::NegativeTimestamp)
        );
    }

    #[test]
    fn test_interior_duplicate_timestamp_rejected() {
        let result = fit(
            &[0.0, 5.0, 5.0, 10.0],
            &[1.0, 2.0, 3.0, 4.0],
            DurationPolicy::Recommended,
            &CancellationToken::new(),
        );
        assert_eq!(result, Err(SanityError::NegativeTimestamp));
    }

    #[test]
    fn test_huge_exact_duration_is_bounded() {
        let fitted = run(&[0.0, 1.0], DurationPolicy::Exactly(1e21)).unwrap();
        assert!(fitted.duration.is_finite());
        assert!(fitted.duration <= DurationPolicy::Exactly(f64::INFINITY).maximum());
    }

    #[test]
    fn test_iteration_limit_saturates() {
        assert_eq!(iteration_limit(f64::MAX, usize::MAX), usize::MAX);
    }

    #[test]
    fn test_non_monotonic_input_fails() {
        assert_eq!(
            run(&[10.0, 5.0, 20.0], DurationPolicy::Recommended),
            Err(SanityError::NegativeTimestamp)
        );
    }

    #[test]
    fn test_two_points_are_never_decimated() {
        let fitted = run(&[0.0, 1.0], DurationPolicy::Exactly(0.01)).unwrap();
        assert_eq!(fitted.len(), 2);
    }

    #[test]
    fn test_cancelled_fit_returns_rescaled_input() {
        let (times, values) = linear(2001, 200.0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let fitted = fit(&times, &values, DurationPolicy::Recommended, &cancel).unwrap();
        assert_eq!(fitted.len(), 2001);
        assert_eq!(fitted.decimations, 0);
    }

    #[test]
    fn test_fit_stopped_between_rounds_keeps_progress() {
        let (times, values) = linear(2001, 200.0);
        // Let the first round finish: one check per round plus one per segment
        let mut checks = 0;
        let fitted = fit_until(&times, &values, DurationPolicy::Recommended, || {
            checks += 1;
            checks > 1 + 2000
        })
        .unwrap();

        assert_eq!(fitted.decimations, 1);
        assert_eq!(fitted.len(), 1001);
        assert!((fitted.duration - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rescale_maps_to_range() {
        assert_eq!(rescale(&[2.0, 4.0, 6.0], 1.0), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_decimate_averages_chunks() {
        let (times, values) = decimate(&[0.0, 1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0, 9.0], 2);
        assert_eq!(times, vec![0.5, 2.5, 4.0]);
        assert_eq!(values, vec![3.0, 7.0, 9.0]);
    }
}

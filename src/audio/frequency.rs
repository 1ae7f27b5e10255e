//! Dense per-sample frequency track from sparse control points
//!
//! Each segment between two control points is expanded into
//! `floor(duration * sample_rate)` samples that ramp linearly from the start
//! frequency to the end frequency. The first sample of a segment is already
//! one step past its start, so the value exactly at a control point is
//! emitted once, as the last sample of the segment before it.
//!
//! Segments shorter than one sample contribute nothing.

use crate::cancel::CancellationToken;

/// Number of samples a segment expands to
#[inline]
fn samples_in_segment(start: f64, end: f64, sample_rate: u32) -> usize {
    ((end - start) * sample_rate as f64).floor().max(0.0) as usize
}

/// Total track length for the given control point times
pub fn track_len(times: &[f64], sample_rate: u32) -> usize {
    times
        .windows(2)
        .map(|w| samples_in_segment(w[0], w[1], sample_rate))
        .sum()
}

/// Expand `(times[i], frequencies[i])` into one frequency per sample.
///
/// Stops between segments when `cancel` is raised and returns what was
/// produced so far.
pub fn generate(
    times: &[f64],
    frequencies: &[f64],
    sample_rate: u32,
    cancel: &CancellationToken,
) -> Vec<f64> {
    generate_until(times, frequencies, sample_rate, || cancel.is_cancelled())
}

/// [`generate`] with the cancellation check supplied as a closure, polled
/// once before each segment.
fn generate_until(
    times: &[f64],
    frequencies: &[f64],
    sample_rate: u32,
    mut should_stop: impl FnMut() -> bool,
) -> Vec<f64> {
    debug_assert_eq!(times.len(), frequencies.len());

    let mut track = Vec::with_capacity(track_len(times, sample_rate));

    for (t, f) in times.windows(2).zip(frequencies.windows(2)) {
        if should_stop() {
            log::debug!("Frequency generation cancelled at {} samples", track.len());
            break;
        }

        let count = samples_in_segment(t[0], t[1], sample_rate);
        if count == 0 {
            continue;
        }

        let step = (f[1] - f[0]) / count as f64;
        let mut frequency = f[0];
        for _ in 0..count {
            frequency += step;
            track.push(frequency);
        }
    }

    track
}

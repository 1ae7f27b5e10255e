//! Phase-continuous sine synthesis
//!
//! The oscillator keeps one running phase for the whole buffer. Each sample
//! is taken at the current phase before it advances, so a frequency change
//! never restarts the wave and segment joins stay click-free.

use std::f64::consts::TAU;

/// Peak amplitude at a volume factor of 1
pub const BASE_AMPLITUDE: f64 = 0.5;

/// Render one sine sample per entry of `frequencies`.
///
/// Output lies within `±volume * BASE_AMPLITUDE`.
pub fn synthesize(frequencies: &[f64], sample_rate: u32, volume: f64) -> Vec<f32> {
    let amplitude = volume * BASE_AMPLITUDE;
    let increment = TAU / sample_rate as f64;
    let mut phase = 0.0_f64;

    frequencies
        .iter()
        .map(|&frequency| {
            let sample = (amplitude * phase.sin()) as f32;
            // Wrap to keep precision on long sweeps
            phase = (phase + increment * frequency) % TAU;
            sample
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero_phase() {
        let samples = synthesize(&[440.0; 8], 44100, 1.0);
        assert_eq!(samples[0], 0.0);
        assert!(samples[1] > 0.0);
    }

    #[test]
    fn test_quarter_period() {
        // 1 Hz at 4 samples/s steps a quarter turn per sample
        let samples = synthesize(&[1.0; 4], 4, 2.0);
        let expected = [0.0, 1.0, 0.0, -1.0];
        for (s, e) in samples.iter().zip(expected) {
            assert!((s - e).abs() < 1e-6, "{} vs {}", s, e);
        }
    }

    #[test]
    fn test_amplitude_bounded_by_volume() {
        let frequencies: Vec<f64> = (0..44100).map(|i| 150.0 + i as f64 * 0.05).collect();
        let samples = synthesize(&frequencies, 44100, 1.5);
        let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.75 + 1e-6);
        assert!(peak > 0.7);
    }

    #[test]
    fn test_silent_at_zero_volume() {
        let samples = synthesize(&[440.0; 100], 44100, 0.0);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_phase_continuity_across_segments() {
        let sample_rate = 44100;
        let mut frequencies = vec![300.0; 2000];
        frequencies.extend(std::iter::repeat(300.0).take(2000));
        frequencies.extend((0..2000).map(|i| 300.0 + i as f64 * 0.5));

        let volume = 1.0;
        let samples = synthesize(&frequencies, sample_rate, volume);
        let max_f = frequencies.iter().cloned().fold(0.0, f64::max);
        let max_step = volume * BASE_AMPLITUDE * TAU * max_f / sample_rate as f64;

        for pair in samples.windows(2) {
            assert!(((pair[1] - pair[0]) as f64).abs() <= max_step + 1e-6);
        }
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::smoothing::MIN_ALPHA;

/// Sample rate every sweep is rendered at
pub const SAMPLE_RATE: u32 = 44100;

/// Bounds applied to [`DurationPolicy::Exactly`], in seconds
pub const EXACT_DURATION_RANGE: (f64, f64) = (0.01, 300.0);

/// How long the sweep may play.
///
/// Each policy has a requested duration the fitter starts from and a
/// ceiling it never exceeds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    Short,
    #[default]
    Recommended,
    Long,
    /// Play for exactly this many seconds, kept within [`EXACT_DURATION_RANGE`]
    Exactly(f64),
}

impl DurationPolicy {
    fn exact_seconds(seconds: f64) -> f64 {
        let (min, max) = EXACT_DURATION_RANGE;
        if seconds.is_nan() {
            log::warn!("Exact duration is not a number, using {}s", Self::Recommended.requested());
            return Self::Recommended.requested();
        }
        seconds.clamp(min, max)
    }

    /// Duration the fitter starts from, in seconds
    pub fn requested(&self) -> f64 {
        match self {
            Self::Short => 2.0,
            Self::Recommended => 3.0,
            Self::Long => 5.0,
            Self::Exactly(seconds) => Self::exact_seconds(*seconds),
        }
    }

    /// Ceiling on the final duration, in seconds
    pub fn maximum(&self) -> f64 {
        match self {
            Self::Short => 3.0,
            Self::Recommended => 10.0,
            Self::Long => 20.0,
            Self::Exactly(seconds) => Self::exact_seconds(*seconds),
        }
    }
}

/// Whether chart values are smoothed before they become frequencies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingPolicy {
    None,
    #[default]
    Default,
    /// Custom alpha, clamped to `[0.0001, 1]`
    Custom(f64),
}

impl SmoothingPolicy {
    pub const DEFAULT_ALPHA: f64 = 0.35;

    /// Alpha for the moving average, or `None` when smoothing is off
    pub fn alpha(&self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Default => Some(Self::DEFAULT_ALPHA),
            Self::Custom(alpha) => Some(alpha.clamp(MIN_ALPHA, 1.0)),
        }
    }
}

/// Settings applied to every sweep.
///
/// Fields use `#[serde(default)]` so that a partial JSON file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudiographConfig {
    /// Frequency of the lowest chart value, in Hz
    pub min_frequency: f64,
    /// Frequency of the highest chart value, in Hz
    pub max_frequency: f64,
    pub playing_duration: DurationPolicy,
    pub smoothing: SmoothingPolicy,
    /// Volume multiplier, clamped to `[0, 2]` when read
    pub volume_correction_factor: f64,
}

impl Default for AudiographConfig {
    fn default() -> Self {
        Self {
            min_frequency: 150.0,
            max_frequency: 2600.0,
            playing_duration: DurationPolicy::default(),
            smoothing: SmoothingPolicy::default(),
            volume_correction_factor: 1.0,
        }
    }
}

impl AudiographConfig {
    /// Load a config file, falling back to defaults on any error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Effective volume multiplier
    pub fn volume(&self) -> f64 {
        self.volume_correction_factor.clamp(0.0, 2.0)
    }
}

//! The sweep pipeline and the player that drives it
//!
//! A render runs, in order: validation, smoothing, duration fitting,
//! frequency scaling, frequency track generation, sine synthesis and tail
//! trimming. Every stage takes its input by value or slice and returns a new
//! array; nothing is shared between invocations.

use std::sync::Arc;
use std::thread;

use crate::audio::{generate, synthesize, trim_tail, CpalSink, PlaybackSink};
use crate::cancel::CancellationToken;
use crate::chart::{fit, scale, smooth, split, validate, GraphPoint, SanityError};
use crate::config::{AudiographConfig, SAMPLE_RATE};

/// A fitted control point: when it sounds and at which pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub time: f64,
    pub frequency: f64,
}

/// Result of one render, ready for a playback sink
#[derive(Debug, Clone)]
pub struct Sweep {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Duration chosen by the fitter, in seconds
    pub duration: f64,
    pub control_points: Vec<ControlPoint>,
}

impl Sweep {
    /// Length of the rendered audio in seconds
    pub fn playing_time(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Run the whole pipeline synchronously.
///
/// A raised `cancel` yields a shortened (possibly empty) sweep, not an error.
pub fn render(
    config: &AudiographConfig,
    points: &[GraphPoint],
    cancel: &CancellationToken,
) -> Result<Sweep, SanityError> {
    validate(points)?;

    let (times, values) = split(points);
    let values = match config.smoothing.alpha() {
        Some(alpha) => smooth(&values, alpha),
        None => values,
    };

    let fitted = fit(&times, &values, config.playing_duration, cancel)?;
    let frequencies = scale(&fitted.values, config.min_frequency, config.max_frequency);

    let track = generate(&fitted.times, &frequencies, SAMPLE_RATE, cancel);
    let mut samples = synthesize(&track, SAMPLE_RATE, config.volume());
    trim_tail(&mut samples);

    log::debug!(
        "Rendered {} points into {} samples ({:.3}s requested)",
        points.len(),
        samples.len(),
        fitted.duration
    );

    let control_points = fitted
        .times
        .iter()
        .zip(frequencies)
        .map(|(&time, frequency)| ControlPoint { time, frequency })
        .collect();

    Ok(Sweep {
        samples,
        sample_rate: SAMPLE_RATE,
        duration: fitted.duration,
        control_points,
    })
}

/// Renders charts on a worker thread and hands the sweeps to a sink
pub struct Audiograph {
    config: AudiographConfig,

    sink: Arc<dyn PlaybackSink>,

    /// Token of the most recent `play` call
    cancel: CancellationToken,

    /// Render thread of the most recent `play` call
    worker: Option<thread::JoinHandle<()>>,
}

impl Audiograph {
    pub fn new(config: AudiographConfig, sink: Arc<dyn PlaybackSink>) -> Self {
        Self {
            config,
            sink,
            cancel: CancellationToken::new(),
            worker: None,
        }
    }

    /// Player that sounds through the default output device
    pub fn with_default_output(config: AudiographConfig) -> Self {
        Self::new(config, Arc::new(CpalSink::new()))
    }

    pub fn config(&self) -> &AudiographConfig {
        &self.config
    }

    /// Changes apply from the next `render` or `play` call on.
    pub fn config_mut(&mut self) -> &mut AudiographConfig {
        &mut self.config
    }

    /// Token of the current sweep, for code that wants to cancel it later
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Render with the current config without playing
    pub fn render(
        &self,
        points: &[GraphPoint],
        cancel: &CancellationToken,
    ) -> Result<Sweep, SanityError> {
        render(&self.config, points, cancel)
    }

    /// Render `points` in the background and play the result.
    ///
    /// Any sweep still rendering or playing is stopped first. Invalid input
    /// is rejected right away: `completion(false)` runs and the error is
    /// returned. A failure found later while fitting also ends in
    /// `completion(false)`.
    pub fn play(
        &mut self,
        points: Vec<GraphPoint>,
        completion: impl FnOnce(bool) + Send + 'static,
    ) -> Result<(), SanityError> {
        if let Err(e) = validate(&points) {
            log::warn!("Rejected chart: {}", e);
            completion(false);
            return Err(e);
        }

        self.stop();

        let cancel = CancellationToken::new();
        self.cancel = cancel.clone();
        let config = self.config.clone();
        let sink = Arc::clone(&self.sink);

        self.worker = Some(thread::spawn(move || {
            match render(&config, &points, &cancel) {
                Ok(sweep) => sink.play(sweep.samples, sweep.sample_rate, Box::new(completion)),
                Err(e) => {
                    log::error!("Render error: {}", e);
                    completion(false);
                }
            }
        }));

        Ok(())
    }

    /// Cancel the current render and silence the sink. Safe to call twice.
    pub fn stop(&mut self) {
        self.cancel.cancel();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        self.sink.stop();
    }
}

impl Drop for Audiograph {
    fn drop(&mut self) {
        self.stop();
    }
}

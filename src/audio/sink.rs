//! Playback sinks - where finished sweeps go to be heard
//!
//! The pipeline only produces samples. A [`PlaybackSink`] owns the device,
//! plays one buffer at a time and reports back through a completion.
//!
//! [`CpalSink`] plays through the default output device. The samples are
//! loaded into a `ringbuf` SPSC buffer whose consumer lives in the cpal
//! callback, so the real-time thread never takes a lock. cpal streams are
//! not `Send` on every platform, so each sweep's stream is built, played and
//! dropped on its own thread. Devices that cannot run at the render rate get
//! the sweep resampled to their default rate with `rubato`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};
use rubato::{FftFixedIn, Resampler};
use thiserror::Error;

use super::postprocess::trim_tail;

/// Called once when playback ends: `true` if the whole sweep was played
pub type Completion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Consumer of finished sample buffers
pub trait PlaybackSink: Send + Sync {
    /// Start playing `samples`, replacing whatever is currently playing.
    fn play(&self, samples: Vec<f32>, sample_rate: u32, completion: Completion);

    /// Stop the current sweep. Its completion receives `false`.
    fn stop(&self);
}

/// Errors that can occur while opening the output device
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("No output device available")]
    NoDevice,

    #[error("Failed to get output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to list output configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("Failed to create resampler: {0}")]
    ResamplerSetup(#[from] rubato::ResamplerConstructionError),

    #[error("Resampling failed: {0}")]
    Resample(#[from] rubato::ResampleError),

    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// How often the playback thread checks for stop or drain
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time given to the device to flush its last buffer after the ring drains
const FLUSH_DELAY: Duration = Duration::from_millis(50);

/// Frames handed to the resampler per call
const RESAMPLE_CHUNK: usize = 1024;

/// Sink that plays through the default cpal output device
#[derive(Default)]
pub struct CpalSink {
    /// Stop flag of the sweep currently playing
    stop_flag: Mutex<Option<Arc<AtomicBool>>>,

    /// Playback thread handle
    thread_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CpalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackSink for CpalSink {
    fn play(&self, samples: Vec<f32>, sample_rate: u32, completion: Completion) {
        self.stop();

        let stopped = Arc::new(AtomicBool::new(false));
        *self.stop_flag.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::clone(&stopped));

        let handle = thread::spawn(move || {
            let success = match play_blocking(samples, sample_rate, &stopped) {
                Ok(finished) => finished,
                Err(e) => {
                    log::error!("Playback error: {}", e);
                    false
                }
            };
            completion(success);
        });

        *self
            .thread_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn stop(&self) {
        if let Some(flag) = self
            .stop_flag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            flag.store(true, Ordering::Relaxed);
        }

        let handle = self
            .thread_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Play `samples` on the default device and block until they drained.
///
/// Returns `Ok(false)` if `stopped` was raised first.
fn play_blocking(
    samples: Vec<f32>,
    sample_rate: u32,
    stopped: &AtomicBool,
) -> Result<bool, SinkError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(SinkError::NoDevice)?;
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let wanted = cpal::SampleRate(sample_rate);
    let supported = device.supported_output_configs()?.find(|range| {
        range.sample_format() == cpal::SampleFormat::F32
            && range.min_sample_rate() <= wanted
            && wanted <= range.max_sample_rate()
    });

    let (channels, output_rate, samples) = match supported {
        Some(range) => (range.channels(), sample_rate, samples),
        None => {
            let default_config = device.default_output_config()?;
            let output_rate = default_config.sample_rate().0;
            log::warn!(
                "{} does not support {} Hz output, resampling to {} Hz",
                device_name,
                sample_rate,
                output_rate
            );
            let resampled = resample(&samples, sample_rate, output_rate)?;
            (default_config.channels(), output_rate, resampled)
        }
    };

    let config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(output_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let rb = HeapRb::<f32>::new(samples.len().max(1));
    let (mut prod, mut cons) = rb.split();
    prod.push_slice(&samples);

    let drained = Arc::new(AtomicBool::new(false));
    let drained_cb = Arc::clone(&drained);
    let channels = channels as usize;

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Mono sweep, same sample on every channel
            for frame in data.chunks_mut(channels) {
                let sample = cons.try_pop().unwrap_or_else(|| {
                    drained_cb.store(true, Ordering::Relaxed);
                    0.0
                });
                frame.fill(sample);
            }
        },
        |err| log::error!("Audio output error: {}", err),
        None,
    )?;

    stream.play()?;
    log::info!(
        "Playing {} samples at {} Hz on {}",
        samples.len(),
        output_rate,
        device_name
    );

    loop {
        if stopped.load(Ordering::Relaxed) {
            log::info!("Playback stopped");
            return Ok(false);
        }
        if drained.load(Ordering::Relaxed) {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    thread::sleep(FLUSH_DELAY);
    log::debug!("Playback finished");
    Ok(true)
}

/// Convert a mono sweep from `from` Hz to `to` Hz.
///
/// The tail is trimmed again afterwards so the resampled sweep still ends on
/// a zero.
fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, SinkError> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)?;
    let mut output = Vec::with_capacity(samples.len() / from as usize * to as usize + RESAMPLE_CHUNK);

    for chunk in samples.chunks(RESAMPLE_CHUNK) {
        let mut block = chunk.to_vec();
        block.resize(RESAMPLE_CHUNK, 0.0);
        let resampled = resampler.process(&[block], None)?;
        output.extend_from_slice(&resampled[0]);
    }

    trim_tail(&mut output);
    Ok(output)
}

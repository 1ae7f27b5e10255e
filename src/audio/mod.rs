//! Audio module - handles the sample domain of a sweep
//!
//! This module provides:
//! - Per-sample frequency track generation
//! - Phase-continuous sine synthesis
//! - Click-free tail trimming
//! - Playback sinks (cpal output)

pub mod frequency;
mod postprocess;
mod sink;
mod synth;

pub use frequency::generate;
pub use postprocess::trim_tail;
pub use sink::{Completion, CpalSink, PlaybackSink, SinkError};
pub use synth::{synthesize, BASE_AMPLITUDE};

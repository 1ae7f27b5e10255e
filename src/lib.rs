//! audiograph - Line Chart Sonification
//!
//! Turns a chart, given as `(time, value)` points, into a sine sweep whose
//! pitch follows the curve. Low values sound low, high values sound high,
//! and the whole chart plays within a bounded duration.
//!
//! ```no_run
//! use audiograph::{Audiograph, AudiographConfig, GraphPoint};
//!
//! let mut audiograph = Audiograph::with_default_output(AudiographConfig::default());
//! let chart = vec![
//!     GraphPoint::new(0.0, 1.0),
//!     GraphPoint::new(5.0, 2.0),
//!     GraphPoint::new(10.0, 3.0),
//! ];
//! audiograph
//!     .play(chart, |finished| println!("done: {}", finished))
//!     .expect("valid chart");
//! ```

pub mod audio;
pub mod cancel;
pub mod chart;
pub mod config;
mod sweep;

pub use audio::{Completion, CpalSink, PlaybackSink, SinkError};
pub use cancel::CancellationToken;
pub use chart::{GraphPoint, SanityError};
pub use config::{AudiographConfig, DurationPolicy, SmoothingPolicy, SAMPLE_RATE};
pub use sweep::{render, Audiograph, ControlPoint, Sweep};

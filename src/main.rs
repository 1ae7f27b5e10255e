//! audiograph - play a chart as a tone sweep
//!
//! Reads a JSON array of `[time, value]` pairs (or uses a built-in demo
//! curve), renders it and plays it on the default output device.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use thiserror::Error;

use audiograph::{
    Audiograph, AudiographConfig, CancellationToken, DurationPolicy, GraphPoint, SanityError,
    SmoothingPolicy,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "audiograph")]
#[command(about = "Listen to a line chart as a frequency sweep", long_about = None)]
struct Args {
    /// JSON file with an array of [time, value] pairs
    #[arg(long, value_name = "FILE")]
    points: Option<PathBuf>,

    /// JSON config file; command line flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// short, recommended, long or a number of seconds
    #[arg(long, value_name = "POLICY")]
    duration: Option<String>,

    /// none, default or a custom alpha
    #[arg(long, value_name = "POLICY")]
    smoothing: Option<String>,

    /// Volume correction factor (0 - 2)
    #[arg(long)]
    volume: Option<f64>,

    /// Frequency of the lowest value in Hz
    #[arg(long)]
    min_frequency: Option<f64>,

    /// Frequency of the highest value in Hz
    #[arg(long)]
    max_frequency: Option<f64>,

    /// Render and report, without playing
    #[arg(long)]
    dry_run: bool,
}

/// Errors the demo can end with
#[derive(Error, Debug)]
enum DemoError {
    #[error("Failed to read points: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse points: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid chart: {0}")]
    Sanity(#[from] SanityError),

    #[error("Unknown {kind} policy '{value}'")]
    Policy { kind: &'static str, value: String },

    #[error("Playback did not finish")]
    Playback,
}

impl Args {
    /// Config file values with command line overrides applied
    fn build_config(&self) -> Result<AudiographConfig, DemoError> {
        let mut config = match &self.config {
            Some(path) => AudiographConfig::load(path),
            None => AudiographConfig::default(),
        };

        if let Some(duration) = &self.duration {
            config.playing_duration = parse_duration(duration)?;
        }
        if let Some(smoothing) = &self.smoothing {
            config.smoothing = parse_smoothing(smoothing)?;
        }
        if let Some(volume) = self.volume {
            config.volume_correction_factor = volume;
        }
        if let Some(min) = self.min_frequency {
            config.min_frequency = min;
        }
        if let Some(max) = self.max_frequency {
            config.max_frequency = max;
        }

        Ok(config)
    }

    fn load_points(&self) -> Result<Vec<GraphPoint>, DemoError> {
        match &self.points {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                let points: Vec<GraphPoint> = serde_json::from_str(&contents)?;
                log::info!("Loaded {} points from {}", points.len(), path.display());
                Ok(points)
            }
            None => Ok(demo_chart()),
        }
    }
}

fn parse_duration(value: &str) -> Result<DurationPolicy, DemoError> {
    match value.to_lowercase().as_str() {
        "short" => Ok(DurationPolicy::Short),
        "recommended" => Ok(DurationPolicy::Recommended),
        "long" => Ok(DurationPolicy::Long),
        other => match other.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                Ok(DurationPolicy::Exactly(seconds))
            }
            _ => Err(DemoError::Policy {
                kind: "duration",
                value: value.to_string(),
            }),
        },
    }
}

fn parse_smoothing(value: &str) -> Result<SmoothingPolicy, DemoError> {
    match value.to_lowercase().as_str() {
        "none" => Ok(SmoothingPolicy::None),
        "default" => Ok(SmoothingPolicy::Default),
        other => other
            .parse()
            .map(SmoothingPolicy::Custom)
            .map_err(|_| DemoError::Policy {
                kind: "smoothing",
                value: value.to_string(),
            }),
    }
}

/// A damped wave with a rising trend
fn demo_chart() -> Vec<GraphPoint> {
    (0..200)
        .map(|i| {
            let t = i as f64 * 0.5;
            GraphPoint::new(t, t * 0.05 + (t * 0.3).sin() * (-t * 0.02).exp())
        })
        .collect()
}

fn run(args: &Args) -> Result<(), DemoError> {
    let config = args.build_config()?;
    let points = args.load_points()?;
    log::debug!("Config: {:?}", config);

    if args.dry_run {
        let sweep = audiograph::render(&config, &points, &CancellationToken::new())?;
        log::info!(
            "{} points -> {} control points, {} samples ({:.2}s)",
            points.len(),
            sweep.control_points.len(),
            sweep.samples.len(),
            sweep.playing_time()
        );
        return Ok(());
    }

    let mut audiograph = Audiograph::with_default_output(config);
    let (tx, rx) = mpsc::channel();
    audiograph.play(points, move |finished| {
        let _ = tx.send(finished);
    })?;

    match rx.recv() {
        Ok(true) => Ok(()),
        _ => Err(DemoError::Playback),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting audiograph");

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

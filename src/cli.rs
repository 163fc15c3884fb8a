//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use moodmesh::params::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "moodmesh")]
#[command(about = "Audio-reactive creature mesh driven by authored mood plans", long_about = None)]
pub struct Args {
    /// WAV file to analyze (virtual clock, runs as fast as possible)
    #[arg(long, value_name = "WAV", conflicts_with = "mic")]
    pub file: Option<PathBuf>,

    /// Listen to the default microphone in real time
    #[arg(long)]
    pub mic: bool,

    /// Stop after this many seconds (mic default: 30)
    #[arg(long, value_name = "SECONDS")]
    pub seconds: Option<f64>,

    /// Tick rate
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: f64,

    /// File answering plan authoring requests
    #[arg(long, value_name = "JSON")]
    pub plan: Option<PathBuf>,

    /// File answering world target requests
    #[arg(long, value_name = "JSON")]
    pub target: Option<PathBuf>,

    /// Mood hint passed to authors
    #[arg(long, value_name = "MOOD")]
    pub mood_hint: Option<String>,

    /// UI language reported to target authoring
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Write the recorded timeline as JSON
    #[arg(long, value_name = "PATH")]
    pub timeline_out: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. info, moodmesh=debug)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Sphere latitude rings; longitude segments follow at 1.5x
    #[arg(long, value_name = "RINGS")]
    pub resolution: Option<usize>,

    /// After an accepted plan, play the file again with the plan active
    #[arg(long, requires = "file")]
    pub replay: bool,
}

impl Args {
    /// Load the config file (if any) and apply command-line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(hint) = &self.mood_hint {
            config.session.mood_hint = Some(hint.clone());
        }
        if let Some(language) = &self.language {
            config.session.ui_language = language.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if let Some(rings) = self.resolution {
            config.deform.rings = rings;
            config.deform.segments = rings + rings / 2;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Seconds per tick
    pub fn tick_seconds(&self) -> Result<f64> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("--fps must be positive, got {}", self.fps);
        }
        Ok(1.0 / self.fps)
    }
}

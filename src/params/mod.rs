//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (seconds, Hz, mesh units, etc.)
//! - Documented ranges and meanings
//! - `Default` values that reproduce the stock look
//!
//! Every struct deserializes from TOML with all fields optional, so a config
//! file only needs to name what it overrides.

mod audio;
mod deform;
mod session;
mod transition;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Re-export all types
pub use audio::{FeatureConfig, TimelineConfig};
pub use deform::{DeformParams, MotionTimeScales, PaletteConfig};
pub use session::{LogConfig, SessionConfig};
pub use transition::{BlendWeights, TransitionTiming};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub features: FeatureConfig,
    pub timeline: TimelineConfig,
    pub blend: BlendWeights,
    pub transition: TransitionTiming,
    pub deform: DeformParams,
    pub palette: PaletteConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

impl Config {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        self.timeline.validate()?;
        self.transition.validate()?;
        self.deform.validate()?;
        self.palette.validate()?;
        self.session.validate()?;
        Ok(())
    }
}

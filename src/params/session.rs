//! Session lifecycle and logging configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Session-level behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Issue a plan request with the full timeline when the session stops
    pub plan_on_stop: bool,

    /// Session time between periodic target requests (seconds, 0 = off)
    pub target_interval_s: f64,

    /// Free-text mood hint forwarded to both authoring boundaries
    pub mood_hint: Option<String>,

    /// Language tag forwarded with target requests
    pub ui_language: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            plan_on_stop: true,
            target_interval_s: 30.0,
            mood_hint: None,
            ui_language: "en".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_interval_s < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "target interval must be >= 0, got {}",
                self.target_interval_s
            )));
        }
        Ok(())
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level directive (overridden by RUST_LOG)
    pub level: String,

    /// Colorize console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

//! Error types for capture, authoring, and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Audio capture failures. Fatal to the session that hit them.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// No input device available
    #[error("No audio input device found")]
    NoDevice,

    /// Device refused to report or accept a configuration
    #[error("Audio device config error: {0}")]
    DeviceConfig(String),

    /// Stream could not be built or started
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// Sample format the capture path cannot convert
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Microphone capture was compiled out
    #[error("Microphone capture is not enabled in this build")]
    MicDisabled,

    /// WAV file could not be opened or decoded
    #[error("Audio file error: {0}")]
    File(#[from] hound::Error),
}

/// Failures at the plan/target authoring boundary
#[derive(Error, Debug)]
pub enum AuthoringError {
    /// Authoring service could not be reached or failed to answer
    #[error("Authoring transport error: {0}")]
    Transport(String),

    /// Response was not usable even after the lenient repair pass
    #[error("Malformed authoring response: {0}")]
    Malformed(String),

    /// Response parsed but carried nothing acceptable
    #[error("Authoring response rejected: {0}")]
    Rejected(String),
}

/// Configuration failures
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is outside what the pipeline can run with
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Authoring(#[from] AuthoringError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn check_interval(interval_s: f64) -> std::result::Result<(), ConfigError> {
        if interval_s < 0.0 {
            return Err(ConfigError::Invalid("negative interval".into()));
        }
        Ok(())
    }

    fn start(interval_s: f64) -> Result<()> {
        check_interval(interval_s)?;
        Err(CaptureError::NoDevice.into())
    }

    #[test]
    fn test_crate_error_is_transparent() {
        let err = start(-1.0).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
        assert_eq!(err.to_string(), "Invalid config: negative interval");

        let err = start(1.0).unwrap_err();
        assert!(matches!(err, Error::Capture(CaptureError::NoDevice)));
        assert_eq!(err.to_string(), "No audio input device found");

        let err = Error::from(AuthoringError::Rejected("no sections".into()));
        assert_eq!(err.to_string(), "Authoring response rejected: no sections");
    }
}

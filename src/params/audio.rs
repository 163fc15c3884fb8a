//! Audio analysis and timeline recording configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Feature extraction configuration with frequency band edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// FFT window size in samples (must be power of 2)
    pub fft_size: usize,

    /// Gain applied to raw RMS before clamping (dimensionless)
    pub rms_gain: f32,

    /// Upper edge of the bass band (Hz); the band starts at DC
    pub bass_cutoff_hz: f32,

    /// Lower edge of the treble band (Hz); also the top of the mid band
    pub treble_low_hz: f32,

    /// Upper edge of the treble band (Hz)
    pub treble_high_hz: f32,

    /// Floor for frequency-domain magnitudes (dB)
    pub min_decibels: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            rms_gain: 2.0,
            bass_cutoff_hz: 250.0,
            treble_low_hz: 4000.0,
            treble_high_hz: 20000.0,
            min_decibels: -100.0,
        }
    }
}

impl FeatureConfig {
    /// Validate configuration (FFT size must be power of 2, band edges ordered)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::Invalid(format!(
                "FFT size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if !(0.0 < self.bass_cutoff_hz
            && self.bass_cutoff_hz <= self.treble_low_hz
            && self.treble_low_hz < self.treble_high_hz)
        {
            return Err(ConfigError::Invalid(format!(
                "band edges must satisfy 0 < bass ({}) <= treble_low ({}) < treble_high ({})",
                self.bass_cutoff_hz, self.treble_low_hz, self.treble_high_hz
            )));
        }
        Ok(())
    }
}

/// Timeline recording cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Minimum spacing between recorded frames (seconds)
    pub interval_s: f64,

    /// Bass level above which a rising edge counts as an onset (0-1)
    pub onset_threshold: f32,

    /// Onsets needed before a tempo estimate is reported
    pub min_onsets_for_bpm: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            interval_s: 0.5,
            onset_threshold: 0.35,
            min_onsets_for_bpm: 8,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.interval_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "timeline interval must be > 0, got {}",
                self.interval_s
            )));
        }
        Ok(())
    }
}

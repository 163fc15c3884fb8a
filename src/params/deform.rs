//! Creature mesh deformation parameters and palette animation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Time-scale constants per motion-style bucket (noise units per second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTimeScales {
    pub slow: f32,
    pub default: f32,
    pub intense: f32,
}

impl Default for MotionTimeScales {
    fn default() -> Self {
        Self {
            slow: 0.25,
            default: 0.6,
            intense: 1.4,
        }
    }
}

/// Procedural deformation of the creature sphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformParams {
    /// Latitude bands of the UV sphere
    pub rings: usize,

    /// Longitude segments of the UV sphere
    pub segments: usize,

    /// Resting radius (mesh units)
    pub base_radius: f32,

    /// Radius gained per unit of blended bass
    pub bass_gain: f32,

    /// Treble multiplier on the noise displacement
    pub treble_gain: f32,

    /// Spatial frequency of the primary noise (cycles per unit normal)
    pub noise_scale: f32,

    /// Noise amplitude with pure audio-reactive behavior
    pub amplitude: f32,

    /// Noise amplitude once an authored plan is active
    pub amplitude_authored: f32,

    /// Time-scale multiplier once an authored plan is active
    pub time_scale_authored_boost: f32,

    /// Per-bucket noise time scales
    pub time_scales: MotionTimeScales,

    /// Spatial frequency of the texture-spike noise
    pub spike_noise_scale: f32,

    /// Texture-spike height per unit of authored spike amount
    pub spike_texture_gain: f32,

    /// Height of the resting polar bump (mesh units)
    pub bump_height: f32,

    /// Extra bump height per unit of authored spike amount
    pub bump_spike_gain: f32,

    /// Exponent that localizes the bump (larger = sharper)
    pub sharpness: f32,

    /// Bump direction (normalized at use)
    pub spike_direction: [f32; 3],

    /// Pointer pull radius (mesh units)
    pub pointer_radius: f32,

    /// Pointer pull gain before world attraction strength
    pub pointer_gain: f32,

    /// Sideways sway offset per unit of world sway amount
    pub sway_gain: f32,

    /// Noise seed
    pub noise_seed: u32,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            rings: 64,
            segments: 96,
            base_radius: 1.0,
            bass_gain: 0.35,
            treble_gain: 1.0,
            noise_scale: 1.6,
            amplitude: 0.18,
            amplitude_authored: 0.3,
            time_scale_authored_boost: 1.5,
            time_scales: MotionTimeScales::default(),
            spike_noise_scale: 6.0,
            spike_texture_gain: 0.12,
            bump_height: 0.25,
            bump_spike_gain: 0.5,
            sharpness: 300.0,
            spike_direction: [0.0, 1.0, 0.0],
            pointer_radius: 1.5,
            pointer_gain: 0.3,
            sway_gain: 0.15,
            noise_seed: 42,
        }
    }
}

impl DeformParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rings < 3 || self.segments < 3 {
            return Err(ConfigError::Invalid(format!(
                "sphere needs >= 3 rings and >= 3 segments, got {}x{}",
                self.rings, self.segments
            )));
        }
        if !(self.base_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base radius must be > 0, got {}",
                self.base_radius
            )));
        }
        let [x, y, z] = self.spike_direction;
        if x == 0.0 && y == 0.0 && z == 0.0 {
            return Err(ConfigError::Invalid(
                "spike direction must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Palette cross-fade behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Time to fade from one palette color to the next (seconds)
    pub period_s: f32,

    /// Brightness multiplier for single-color palettes
    pub single_color_brightness: f32,

    /// Fade back to the world base color when a palette goes away (seconds)
    pub release_s: f32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            period_s: 6.0,
            single_color_brightness: 1.2,
            release_s: 2.0,
        }
    }
}

impl PaletteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.period_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "palette period must be > 0, got {}",
                self.period_s
            )));
        }
        Ok(())
    }
}

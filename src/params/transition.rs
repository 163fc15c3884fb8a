//! Blend weights and transition timing policy.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed weighting between live audio and authored intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    /// Audio weight while an authored plan is active
    pub audio_with_plan: f32,

    /// Authored weight while an authored plan is active
    pub authored_with_plan: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            audio_with_plan: 0.1,
            authored_with_plan: 0.9,
        }
    }
}

/// Duration policy for world transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTiming {
    /// Multiplier on the requested duration when settling from wild to calm
    pub settle_multiplier: f32,

    /// Settle duration clamp (seconds)
    pub settle_min_s: f32,
    pub settle_max_s: f32,

    /// Background duration = foreground duration * this
    pub background_lag: f32,

    /// Minimum duration for slow-moving background fields (seconds)
    pub slow_field_floor_s: f32,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            settle_multiplier: 1.5,
            settle_min_s: 12.0,
            settle_max_s: 20.0,
            background_lag: 1.2,
            slow_field_floor_s: 8.0,
        }
    }
}

impl TransitionTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_min_s > self.settle_max_s {
            return Err(ConfigError::Invalid(format!(
                "settle clamp is inverted: {} > {}",
                self.settle_min_s, self.settle_max_s
            )));
        }
        if self.background_lag < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "background lag must be >= 1, got {}",
                self.background_lag
            )));
        }
        Ok(())
    }
}

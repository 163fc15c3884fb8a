//! Authored intent: time-indexed mood sections over a track.
//!
//! Plans arrive as JSON from the plan-authoring boundary, pass through
//! [`accept_plan`] (strict parse, one lenient repair pass, clamping, coverage
//! repair) and are then immutable. A newer plan replaces an older one
//! wholesale.

mod motion;
mod resolver;
mod validate;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

// Re-export public types
pub use motion::MotionStyle;
pub use resolver::{AuthoredParams, IntentResolver, IntentSource};
pub use validate::{accept_plan, normalize_plan};

/// One authored stretch of the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSection {
    pub name: String,
    /// Seconds
    pub start_time: f64,
    /// Seconds
    pub end_time: f64,
    /// [0, 1]
    pub energy: f32,
    /// [0, 1]
    pub tension: f32,
    /// Free-text style tag, resolved through [`MotionStyle::from_tag`]
    pub motion_style: String,
    /// [0, 1]
    pub spike_amount: f32,
    /// [0, 1]
    pub noise_amount: f32,
    pub color_palette: Vec<Rgb>,
}

/// Plan-level defaults used outside every section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalIntent {
    pub base_energy: f32,
    pub base_tension: f32,
    pub color_palette: Vec<Rgb>,
}

impl Default for GlobalIntent {
    fn default() -> Self {
        Self {
            base_energy: 0.5,
            base_tension: 0.5,
            color_palette: Vec::new(),
        }
    }
}

/// Externally authored sequence of sections plus global defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationPlan {
    pub overall_mood: String,
    pub global: GlobalIntent,
    pub sections: Vec<AnimationSection>,
}

//! Mix live audio features with authored intent.

use crate::audio::AudioFeatures;
use crate::params::BlendWeights;
use crate::plan::{AuthoredParams, MotionStyle};
use crate::world::WorldState;

/// Per-tick deformation drivers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendedParams {
    /// Bass blended with section energy, [0, 1]
    pub bass: f32,
    /// Treble blended with section tension, [0, 1]
    pub treble: f32,
    pub spike_amount: f32,
    pub noise_amount: f32,
    pub motion_style: MotionStyle,
    /// Radial breathing, `pulseAmount * bass`
    pub pulse: f32,
    /// Whether authored intent contributed
    pub authored: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterBlender {
    weights: BlendWeights,
}

impl ParameterBlender {
    pub fn new(weights: BlendWeights) -> Self {
        Self { weights }
    }

    pub fn blend(
        &self,
        features: &AudioFeatures,
        authored: Option<&AuthoredParams<'_>>,
        world: &WorldState,
    ) -> BlendedParams {
        let (bass, treble, spike_amount, noise_amount, motion_style) = match authored {
            Some(intent) => {
                let w_a = self.weights.audio_with_plan;
                let w_p = self.weights.authored_with_plan;
                (
                    features.bass * w_a + intent.energy * w_p,
                    features.treble * w_a + intent.tension * w_p,
                    intent.spike_amount,
                    intent.noise_amount,
                    intent.motion_style,
                )
            }
            None => (features.bass, features.treble, 0.0, 1.0, MotionStyle::Default),
        };
        let bass = bass.clamp(0.0, 1.0);

        BlendedParams {
            bass,
            treble: treble.clamp(0.0, 1.0),
            spike_amount,
            noise_amount,
            motion_style,
            pulse: world.mesh.pulse_amount * bass,
            authored: authored.is_some(),
        }
    }
}

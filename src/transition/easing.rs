use std::f32::consts::PI;

/// Easing curve applied to normalized tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Default mood drift
    #[default]
    InOutCubic,
    /// Slow settle, used when calming down from a wild state
    InOutSine,
    /// Snappy attack toward wild states
    OutQuart,
}

impl Easing {
    /// Map progress `t` in [0, 1] onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

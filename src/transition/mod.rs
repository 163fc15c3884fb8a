//! Tween-based transitions between world targets.

mod easing;
mod engine;
mod palette;
mod tween;

pub use easing::Easing;
pub use engine::{MoodShift, Subscriber, SurfaceColorSource, TransitionEngine, TransitionPlan};
pub use palette::PaletteDriver;
pub use tween::Tween;

//! Drives the surface color from the active authored palette.

use tracing::debug;

use super::{Easing, SurfaceColorSource, TransitionEngine};
use crate::color::Rgb;
use crate::params::PaletteConfig;
use crate::world::{FieldPath, FieldValue};

/// Smallest remaining segment time worth a tween (seconds)
const MIN_FADE_S: f32 = 1e-3;

/// Palette cross-fade expressed as `steer` calls on the surface color
///
/// A single color is applied at once with a brightness boost. Longer
/// palettes fade from color `k` to `k + 1` over each period, where the
/// period index comes from session elapsed time. When the palette goes away
/// the surface fades back to the mesh base color.
#[derive(Debug, Clone)]
pub struct PaletteDriver {
    config: PaletteConfig,
    colors: Vec<Rgb>,
    segment: Option<u64>,
}

impl PaletteDriver {
    pub fn new(config: PaletteConfig) -> Self {
        Self {
            config,
            colors: Vec::new(),
            segment: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn update(&mut self, palette: &[Rgb], elapsed_s: f64, engine: &mut TransitionEngine) {
        if palette.is_empty() {
            if self.is_active() {
                self.release(engine);
            }
            return;
        }

        if self.colors != palette {
            debug!("Palette changed to {} colors", palette.len());
            self.colors = palette.to_vec();
            self.segment = None;
            engine.set_surface_source(SurfaceColorSource::Steered);
        }

        if let [only] = self.colors.as_slice() {
            if self.segment.is_none() {
                let color = only.scale(self.config.single_color_brightness).clamped();
                engine.steer(FieldPath::SurfaceColor, FieldValue::Color(color), 0.0, Easing::Linear);
                self.segment = Some(0);
            }
            return;
        }

        let period = f64::from(self.config.period_s);
        let elapsed = elapsed_s.max(0.0);
        let segment = (elapsed / period).floor() as u64;
        let remaining = (period - elapsed.rem_euclid(period)) as f32;
        let next = self.colors[((segment + 1) % self.colors.len() as u64) as usize];
        let value = FieldValue::Color(next);

        // Re-steer on a new segment, or when a transition cancelled our fade
        let interrupted = !engine.is_animating(FieldPath::SurfaceColor)
            && engine.state().get(FieldPath::SurfaceColor) != value;
        if (self.segment != Some(segment) || interrupted) && remaining > MIN_FADE_S {
            engine.steer(FieldPath::SurfaceColor, value, remaining, Easing::Linear);
            self.segment = Some(segment);
        }
    }

    fn release(&mut self, engine: &mut TransitionEngine) {
        debug!("Palette released, fading to base color");
        self.colors.clear();
        self.segment = None;
        engine.set_surface_source(SurfaceColorSource::BaseColor);
        let base = FieldValue::Color(engine.state().mesh.base_color);
        engine.steer(FieldPath::SurfaceColor, base, self.config.release_s, Easing::InOutSine);
    }
}

use super::Easing;
use crate::world::FieldValue;

/// One in-flight interpolation of a single field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: FieldValue,
    to: FieldValue,
    elapsed: f32,
    /// Seconds
    duration: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: FieldValue, to: FieldValue, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Advance by `dt` seconds and return the current value
    pub fn step(&mut self, dt: f32) -> FieldValue {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> FieldValue {
        if self.is_finished() {
            return self.to;
        }
        let progress = self.elapsed / self.duration;
        self.from.lerp(self.to, self.easing.apply(progress))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> FieldValue {
        self.to
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }
}

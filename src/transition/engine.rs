//! Owns the live world state and every in-flight tween.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::{Easing, Tween};
use crate::params::TransitionTiming;
use crate::world::{
    BackgroundField, FieldPath, FieldValue, MeshField, Mood, WorldState, WorldTarget,
};

/// Callback receiving a consistent snapshot after every change
pub type Subscriber = Box<dyn FnMut(&WorldState) + Send>;

/// How the mood moved between the current state and a new target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodShift {
    /// Wild to calm: stretched and eased gently
    Settle,
    /// Toward wild: requested length, snappy attack
    Excite,
    /// Anything else
    Drift,
}

/// Who decides the displayed surface color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceColorSource {
    /// Follows the mesh base color through transitions
    #[default]
    BaseColor,
    /// Steered externally, e.g. by a palette cross-fade
    Steered,
}

/// Timing chosen for one `transition_to` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPlan {
    pub shift: MoodShift,
    pub easing: Easing,
    /// Mesh field duration (seconds)
    pub mesh_seconds: f32,
    /// Background field duration (seconds)
    pub background_seconds: f32,
    /// Fog density and bloom intensity duration (seconds)
    pub slow_seconds: f32,
}

pub struct TransitionEngine {
    state: WorldState,
    tweens: BTreeMap<FieldPath, Tween>,
    timing: TransitionTiming,
    surface_source: SurfaceColorSource,
    subscribers: Vec<Subscriber>,
}

impl TransitionEngine {
    pub fn new(initial: WorldState, timing: TransitionTiming) -> Self {
        Self {
            state: initial,
            tweens: BTreeMap::new(),
            timing,
            surface_source: SurfaceColorSource::BaseColor,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn surface_source(&self) -> SurfaceColorSource {
        self.surface_source
    }

    pub fn set_surface_source(&mut self, source: SurfaceColorSource) {
        self.surface_source = source;
    }

    /// Choose durations and easing for a move from the current mood
    pub fn plan_for(&self, target: &WorldTarget) -> TransitionPlan {
        let requested = target.transition_seconds;
        let (shift, easing, mesh_seconds) = if self.state.mood == Mood::Wild && target.mood == Mood::Calm {
            let stretched = (requested * self.timing.settle_multiplier)
                .clamp(self.timing.settle_min_s, self.timing.settle_max_s);
            (MoodShift::Settle, Easing::InOutSine, stretched)
        } else if target.mood == Mood::Wild {
            (MoodShift::Excite, Easing::OutQuart, requested)
        } else {
            (MoodShift::Drift, Easing::InOutCubic, requested)
        };
        let background_seconds = mesh_seconds * self.timing.background_lag;
        TransitionPlan {
            shift,
            easing,
            mesh_seconds,
            background_seconds,
            slow_seconds: background_seconds.max(self.timing.slow_field_floor_s),
        }
    }

    /// Cancel everything in flight and start moving toward `target`
    ///
    /// The target is clamped first. Render mode, mood and background style
    /// are written immediately; every other field gets exactly one tween.
    pub fn transition_to(&mut self, target: &WorldTarget) -> TransitionPlan {
        let target = target.clamped();
        let plan = self.plan_for(&target);
        self.kill_all();

        debug!(
            "Transition {:?} -> {:?} ({:?}): mesh {:.1}s, background {:.1}s, slow {:.1}s",
            self.state.mood,
            target.mood,
            plan.shift,
            plan.mesh_seconds,
            plan.background_seconds,
            plan.slow_seconds
        );

        for field in MeshField::ALL {
            self.start_tween(FieldPath::Mesh(field), target.mesh.get(field), plan.mesh_seconds, plan.easing);
        }
        for field in BackgroundField::ALL {
            let seconds = if field.is_slow() {
                plan.slow_seconds
            } else {
                plan.background_seconds
            };
            self.start_tween(FieldPath::Background(field), target.background.get(field), seconds, plan.easing);
        }
        if self.surface_source == SurfaceColorSource::BaseColor {
            self.start_tween(
                FieldPath::SurfaceColor,
                FieldValue::Color(target.mesh.base_color),
                plan.mesh_seconds,
                plan.easing,
            );
        }

        self.state.render_mode = target.render_mode;
        self.state.mood = target.mood;
        self.state.background.bg_style = target.background.bg_style;
        self.publish();

        plan
    }

    /// Retarget one field, cancelling only that field's tween
    ///
    /// A non-positive duration writes the value immediately.
    pub fn steer(&mut self, path: FieldPath, value: FieldValue, seconds: f32, easing: Easing) {
        self.tweens.remove(&path);
        if seconds > 0.0 {
            self.start_tween(path, value, seconds, easing);
        } else {
            self.state.set(path, value);
            self.publish();
        }
    }

    /// Cancel every tween, leaving values where they are
    pub fn kill_all(&mut self) {
        if !self.tweens.is_empty() {
            trace!("Cancelling {} tweens", self.tweens.len());
        }
        self.tweens.clear();
    }

    /// Step every tween by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if self.tweens.is_empty() || dt <= 0.0 {
            return;
        }
        for (path, tween) in self.tweens.iter_mut() {
            self.state.set(*path, tween.step(dt));
        }
        self.tweens.retain(|_, tween| !tween.is_finished());
        self.publish();
    }

    pub fn is_animating(&self, path: FieldPath) -> bool {
        self.tweens.contains_key(&path)
    }

    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn tween(&self, path: FieldPath) -> Option<&Tween> {
        self.tweens.get(&path)
    }

    fn start_tween(&mut self, path: FieldPath, to: FieldValue, seconds: f32, easing: Easing) {
        let from = self.state.get(path);
        self.tweens.insert(path, Tween::new(from, to, seconds, easing));
    }

    fn publish(&mut self) {
        self.state.revision += 1;
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::world::RenderMode;
    use std::sync::{Arc, Mutex};

    fn engine_in(mood: Mood) -> TransitionEngine {
        let mut state = WorldState::default();
        state.mood = mood;
        TransitionEngine::new(state, TransitionTiming::default())
    }

    fn target(mood: Mood, seconds: f32) -> WorldTarget {
        WorldTarget {
            mood,
            transition_seconds: seconds,
            ..WorldTarget::default()
        }
    }

    #[test]
    fn test_wild_to_calm_is_stretched() {
        let engine = engine_in(Mood::Wild);
        let plan = engine.plan_for(&target(Mood::Calm, 5.0));
        assert_eq!(plan.shift, MoodShift::Settle);
        assert_eq!(plan.easing, Easing::InOutSine);
        assert_eq!(plan.mesh_seconds, 12.0);

        let plan = engine.plan_for(&target(Mood::Calm, 15.0));
        assert_eq!(plan.mesh_seconds, 20.0);

        let plan = engine.plan_for(&target(Mood::Calm, 10.0));
        assert_eq!(plan.mesh_seconds, 15.0);
    }

    #[test]
    fn test_toward_wild_is_snappy() {
        let engine = engine_in(Mood::Calm);
        let plan = engine.plan_for(&target(Mood::Wild, 6.0));
        assert_eq!(plan.shift, MoodShift::Excite);
        assert_eq!(plan.easing, Easing::OutQuart);
        assert_eq!(plan.mesh_seconds, 6.0);
    }

    #[test]
    fn test_background_lags_and_slow_fields_floor() {
        let mut engine = engine_in(Mood::Neutral);
        let plan = engine.transition_to(&target(Mood::Dreamy, 5.0));
        assert_eq!(plan.shift, MoodShift::Drift);
        assert_eq!(plan.mesh_seconds, 5.0);
        assert!((plan.background_seconds - 6.0).abs() < 1e-5);
        assert_eq!(plan.slow_seconds, 8.0);

        let duration = |path| engine.tween(path).map(Tween::duration);
        assert_eq!(duration(FieldPath::Mesh(MeshField::Roughness)), Some(5.0));
        assert_eq!(
            duration(FieldPath::Background(BackgroundField::FogDensity)),
            Some(8.0)
        );
        assert_eq!(
            duration(FieldPath::Background(BackgroundField::BloomIntensity)),
            Some(8.0)
        );
        let vignette = duration(FieldPath::Background(BackgroundField::Vignette)).unwrap();
        assert!((vignette - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_long_background_beats_floor() {
        let engine = engine_in(Mood::Neutral);
        let plan = engine.plan_for(&target(Mood::Tense, 10.0));
        assert!((plan.slow_seconds - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_second_transition_replaces_first() {
        let mut engine = engine_in(Mood::Neutral);
        let mut first = target(Mood::Dreamy, 10.0);
        first.mesh.saturation = 0.1;
        let mut second = target(Mood::Tense, 10.0);
        second.mesh.saturation = 0.9;

        engine.transition_to(&first);
        engine.advance(1.0);
        engine.transition_to(&second);

        let expected = MeshField::ALL.len() + BackgroundField::ALL.len() + 1;
        assert_eq!(engine.active_tweens(), expected);
        let path = FieldPath::Mesh(MeshField::Saturation);
        assert_eq!(engine.tween(path).map(Tween::target), Some(FieldValue::Scalar(0.9)));

        engine.advance(30.0);
        assert_eq!(engine.state().mesh.saturation, 0.9);
        assert_eq!(engine.active_tweens(), 0);
    }

    #[test]
    fn test_kill_all_keeps_current_values() {
        let mut engine = engine_in(Mood::Neutral);
        let mut t = target(Mood::Calm, 10.0);
        t.mesh.metalness = 0.0;
        engine.transition_to(&t);
        engine.advance(5.0);
        let mid = engine.state().mesh.metalness;
        assert!(mid > 0.0 && mid < crate::world::MeshParams::default().metalness);

        engine.kill_all();
        engine.advance(5.0);
        assert_eq!(engine.state().mesh.metalness, mid);
        assert_eq!(engine.active_tweens(), 0);
    }

    #[test]
    fn test_discrete_fields_written_immediately() {
        let mut engine = engine_in(Mood::Neutral);
        let mut t = target(Mood::Wild, 10.0);
        t.render_mode = RenderMode::Reduced;
        t.background.bg_style = crate::world::BackgroundStyle::Void;
        engine.transition_to(&t);
        assert_eq!(engine.state().mood, Mood::Wild);
        assert_eq!(engine.state().render_mode, RenderMode::Reduced);
        assert_eq!(engine.state().background.bg_style, crate::world::BackgroundStyle::Void);
    }

    #[test]
    fn test_target_clamped_before_tweening() {
        let mut engine = engine_in(Mood::Neutral);
        let mut t = target(Mood::Calm, 1.0);
        t.mesh.deform_scale = 50.0;
        let plan = engine.transition_to(&t);
        assert_eq!(plan.mesh_seconds, 5.0);
        engine.advance(100.0);
        assert_eq!(engine.state().mesh.deform_scale, 5.0);
    }

    #[test]
    fn test_subscribers_see_every_revision() {
        let mut engine = engine_in(Mood::Neutral);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.subscribe(Box::new(move |state| sink.lock().unwrap().push(state.revision)));

        engine.transition_to(&target(Mood::Dreamy, 5.0));
        engine.advance(1.0);
        engine.advance(1.0);

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![1, 2, 3]);
        assert_eq!(engine.state().revision, 3);
    }

    #[test]
    fn test_idle_advance_does_not_bump_revision() {
        let mut engine = engine_in(Mood::Neutral);
        engine.advance(1.0);
        assert_eq!(engine.state().revision, 0);
    }

    #[test]
    fn test_steer_cancels_only_that_field() {
        let mut engine = engine_in(Mood::Neutral);
        engine.transition_to(&target(Mood::Dreamy, 10.0));
        let before = engine.active_tweens();

        engine.steer(FieldPath::SurfaceColor, FieldValue::Color(Rgb::WHITE), 2.0, Easing::Linear);
        assert_eq!(engine.active_tweens(), before);
        assert_eq!(
            engine.tween(FieldPath::SurfaceColor).map(Tween::easing),
            Some(Easing::Linear)
        );

        engine.steer(FieldPath::SurfaceColor, FieldValue::Color(Rgb::BLACK), 0.0, Easing::Linear);
        assert!(!engine.is_animating(FieldPath::SurfaceColor));
        assert_eq!(engine.state().surface_color, Rgb::BLACK);
        assert!(engine.is_animating(FieldPath::Mesh(MeshField::Saturation)));
    }

    #[test]
    fn test_steered_surface_color_left_alone() {
        let mut engine = engine_in(Mood::Neutral);
        engine.set_surface_source(SurfaceColorSource::Steered);
        engine.transition_to(&target(Mood::Dreamy, 5.0));
        assert!(!engine.is_animating(FieldPath::SurfaceColor));
    }
}

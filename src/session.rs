//! One listening session: the per-tick pipeline and its lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::audio::{AnalysisBuffer, AudioFeatures, FeatureExtractor};
use crate::authoring::{
    Accepted, AuthoringDesk, AuthoringKind, PlanAuthor, PlanRequest, TargetAuthor,
};
use crate::blend::{BlendedParams, ParameterBlender};
use crate::color::Rgb;
use crate::deform::{Deformer, Pointer, Vertex};
use crate::error::ConfigError;
use crate::params::Config;
use crate::plan::{normalize_plan, AnimationPlan, IntentResolver};
use crate::timeline::{
    AudioTimeline, FeatureAccumulator, FeatureSummary, PlaybackClock, SourceKind, TimelineRecorder,
};
use crate::transition::{PaletteDriver, Subscriber, TransitionEngine};
use crate::world::{WorldState, WorldTarget};

/// Authors wired into a session; either may be absent
#[derive(Clone, Default)]
pub struct SessionAuthors {
    pub plan: Option<Arc<dyn PlanAuthor>>,
    pub target: Option<Arc<dyn TargetAuthor>>,
}

/// Everything one tick needs from the outside
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub analysis: &'a AnalysisBuffer,
    pub clock: PlaybackClock,
    /// Seconds since the previous tick
    pub dt_s: f64,
    pub pointer: Option<Pointer>,
}

/// What the renderer consumes after a tick
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
    pub surface_color: Rgb,
    pub world: &'a WorldState,
    pub features: AudioFeatures,
    pub blended: BlendedParams,
}

pub struct Session {
    config: Config,
    source: SourceKind,
    media_duration: Option<f64>,
    extractor: FeatureExtractor,
    recorder: TimelineRecorder,
    accumulator: FeatureAccumulator,
    resolver: IntentResolver,
    blender: ParameterBlender,
    engine: TransitionEngine,
    palette: PaletteDriver,
    deformer: Deformer,
    desk: AuthoringDesk,
    plan: Option<AnimationPlan>,
    elapsed_s: f64,
    last_target_request_s: f64,
    stopped: bool,
}

impl Session {
    /// Validate `config` and start a session for `source`
    ///
    /// `media_duration` is the track length for file sessions.
    pub fn start(
        config: Config,
        source: SourceKind,
        media_duration: Option<f64>,
        authors: SessionAuthors,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Session started: {:?} source, duration {:?}, plan author {}, target author {}",
            source,
            media_duration,
            authors.plan.is_some(),
            authors.target.is_some()
        );

        Ok(Self {
            extractor: FeatureExtractor::new(config.features.clone()),
            recorder: TimelineRecorder::new(&config.timeline, source),
            accumulator: FeatureAccumulator::new(),
            resolver: IntentResolver,
            blender: ParameterBlender::new(config.blend.clone()),
            engine: TransitionEngine::new(WorldState::default(), config.transition.clone()),
            palette: PaletteDriver::new(config.palette.clone()),
            deformer: Deformer::new(config.deform.clone()),
            desk: AuthoringDesk::new(authors.plan, authors.target),
            plan: None,
            elapsed_s: 0.0,
            last_target_request_s: 0.0,
            stopped: false,
            source,
            media_duration,
            config,
        })
    }

    /// Run one frame of the pipeline
    ///
    /// Never fails: authoring problems are logged and the previous plan and
    /// world stay in effect.
    pub fn tick(&mut self, input: TickInput<'_>) -> Frame<'_> {
        for accepted in self.desk.poll() {
            self.apply(accepted);
        }

        let dt = if input.dt_s.is_finite() { input.dt_s.max(0.0) } else { 0.0 };
        self.elapsed_s += dt;

        let features = self.extractor.extract(input.analysis);
        if !self.stopped {
            self.recorder.record(&input.clock, &features);
            self.accumulator.push(&features);
            self.maybe_request_target();
        }

        let t = input.clock.current_time();
        let authored = self.resolver.resolve(self.plan.as_ref(), t);
        let palette = authored.as_ref().map_or(&[][..], |a| a.palette);
        self.palette.update(palette, self.elapsed_s, &mut self.engine);
        self.engine.advance(dt as f32);

        let blended = self.blender.blend(&features, authored.as_ref(), self.engine.state());
        trace!(
            "t={:.2}s bass'={:.2} treble'={:.2} authored={}",
            t,
            blended.bass,
            blended.treble,
            blended.authored
        );

        self.deformer.update(
            &blended,
            self.engine.state(),
            self.elapsed_s,
            input.pointer.as_ref(),
        );
        let world = self.engine.state();
        Frame {
            vertices: self.deformer.vertices(),
            indices: self.deformer.indices(),
            surface_color: world.surface_color,
            world,
            features,
            blended,
        }
    }

    /// Materialize the timeline and, if enabled, request a plan from it
    ///
    /// Calling it again returns the same timeline without a new request.
    pub fn stop(&mut self) -> AudioTimeline {
        let duration = match self.source {
            SourceKind::File => self.media_duration,
            SourceKind::Mic => Some(self.elapsed_s),
        };
        let timeline = self.recorder.snapshot(duration);
        if self.stopped {
            return timeline;
        }
        self.stopped = true;

        info!(
            "Session stopped after {:.1}s: {} timeline frames",
            self.elapsed_s,
            timeline.frames.len()
        );
        if !self.config.session.plan_on_stop {
            debug!("Plan requests on stop are disabled");
        } else if !self.desk.has_plan_author() {
            debug!("No plan author, skipping terminal plan request");
        } else {
            self.desk.request_plan(PlanRequest {
                timeline: timeline.clone(),
                mood_hint: self.config.session.mood_hint.clone(),
            });
        }
        timeline
    }

    /// Start over from the top of the track, keeping plan and world
    pub fn replay(&mut self) {
        info!("Replaying session with plan: {}", self.plan.is_some());
        self.recorder = TimelineRecorder::new(&self.config.timeline, self.source);
        self.accumulator = FeatureAccumulator::new();
        self.elapsed_s = 0.0;
        self.last_target_request_s = 0.0;
        self.stopped = false;
    }

    /// Ask for a new world target from the features collected so far
    pub fn request_target(&mut self) -> Option<u64> {
        let summary = self.feature_summary();
        self.last_target_request_s = self.elapsed_s;
        self.desk.request_target(summary)
    }

    /// Block until pending authoring settles, applying whatever is accepted
    pub fn await_authoring(&mut self, timeout: Duration) -> usize {
        let accepted = self.desk.wait_idle(timeout);
        let count = accepted.len();
        for accepted in accepted {
            self.apply(accepted);
        }
        count
    }

    /// Install a plan directly, with the usual clamping and coverage repair
    pub fn adopt_plan(&mut self, plan: AnimationPlan) {
        self.apply(Accepted::Plan(normalize_plan(plan, self.media_duration)));
    }

    /// Start a transition directly
    pub fn adopt_target(&mut self, target: WorldTarget) {
        self.apply(Accepted::Target(target));
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.engine.subscribe(subscriber);
    }

    pub fn feature_summary(&self) -> FeatureSummary {
        self.accumulator.summarize(
            self.elapsed_s,
            self.config.session.mood_hint.clone(),
            &self.config.session.ui_language,
        )
    }

    pub fn plan(&self) -> Option<&AnimationPlan> {
        self.plan.as_ref()
    }

    pub fn world(&self) -> &WorldState {
        self.engine.state()
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    pub fn timeline(&self) -> &TimelineRecorder {
        &self.recorder
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn authoring_in_progress(&self, kind: AuthoringKind) -> bool {
        self.desk.in_progress(kind)
    }

    pub fn authoring_error(&self, kind: AuthoringKind) -> Option<&str> {
        self.desk.last_error(kind)
    }

    fn maybe_request_target(&mut self) {
        let interval = self.config.session.target_interval_s;
        if interval <= 0.0 || !self.desk.has_target_author() {
            return;
        }
        if self.elapsed_s - self.last_target_request_s >= interval {
            self.request_target();
        }
    }

    fn apply(&mut self, accepted: Accepted) {
        match accepted {
            Accepted::Plan(plan) => {
                info!(
                    "Plan active: '{}' with {} sections",
                    plan.overall_mood,
                    plan.sections.len()
                );
                self.plan = Some(plan);
            }
            Accepted::Target(target) => {
                self.engine.transition_to(&target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AnimationSection, GlobalIntent};

    fn small_config() -> Config {
        let mut config = Config::default();
        config.deform.rings = 8;
        config.deform.segments = 12;
        config
    }

    fn silent() -> AnalysisBuffer {
        AnalysisBuffer::silent(1024, 44_100)
    }

    fn media(position_s: f64) -> PlaybackClock {
        PlaybackClock::Media { position_s }
    }

    #[test]
    fn test_ticks_record_at_cadence() {
        let mut session =
            Session::start(small_config(), SourceKind::File, Some(3.0), SessionAuthors::default())
                .unwrap();
        let buffer = silent();
        for i in 0..=30 {
            session.tick(TickInput {
                analysis: &buffer,
                clock: media(i as f64 / 10.0),
                dt_s: 0.1,
                pointer: None,
            });
        }
        let timeline = session.stop();
        let times: Vec<f64> = timeline.frames.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert!(times.windows(2).all(|w| w[1] - w[0] >= 0.5 - 1e-9));
        assert_eq!(timeline.track_info.duration, Some(3.0));
    }

    #[test]
    fn test_mic_duration_is_elapsed() {
        let mut session =
            Session::start(small_config(), SourceKind::Mic, None, SessionAuthors::default())
                .unwrap();
        let buffer = silent();
        for i in 0..10 {
            session.tick(TickInput {
                analysis: &buffer,
                clock: PlaybackClock::Live {
                    now_s: 100.0 + i as f64 * 0.25,
                    session_start_s: 100.0,
                },
                dt_s: 0.25,
                pointer: None,
            });
        }
        let timeline = session.stop();
        assert_eq!(timeline.track_info.duration, Some(2.5));
        assert_eq!(timeline.track_info.source, SourceKind::Mic);
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut config = small_config();
        config.features.fft_size = 1000;
        assert!(Session::start(config, SourceKind::File, None, SessionAuthors::default()).is_err());
    }

    #[test]
    fn test_adopted_plan_drives_surface_color() {
        let mut session =
            Session::start(small_config(), SourceKind::File, Some(10.0), SessionAuthors::default())
                .unwrap();
        session.adopt_plan(AnimationPlan {
            overall_mood: "test".into(),
            global: GlobalIntent::default(),
            sections: vec![AnimationSection {
                name: "only".into(),
                start_time: 0.0,
                end_time: 4.0,
                energy: 1.0,
                tension: 0.0,
                motion_style: "slow".into(),
                spike_amount: 0.0,
                noise_amount: 1.0,
                color_palette: vec![Rgb::new(0.5, 0.0, 0.0)],
            }],
        });
        // Coverage repaired to the media duration
        assert_eq!(session.plan().unwrap().sections[0].end_time, 10.0);

        let buffer = silent();
        let frame = session.tick(TickInput {
            analysis: &buffer,
            clock: media(1.0),
            dt_s: 0.016,
            pointer: None,
        });
        assert!(frame.blended.authored);
        assert!((frame.blended.bass - 0.9).abs() < 1e-6);
        assert!((frame.surface_color.0[0] - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_stop_without_plan_author_requests_nothing() {
        let mut session =
            Session::start(small_config(), SourceKind::File, Some(1.0), SessionAuthors::default())
                .unwrap();
        session.stop();
        assert!(!session.authoring_in_progress(AuthoringKind::Plan));
        assert_eq!(session.await_authoring(Duration::from_millis(10)), 0);
    }

    #[test]
    fn test_stop_twice_requests_once() {
        let mut session =
            Session::start(small_config(), SourceKind::File, Some(1.0), SessionAuthors::default())
                .unwrap();
        let first = session.stop();
        let second = session.stop();
        assert_eq!(first, second);
        assert!(session.is_stopped());
    }
}

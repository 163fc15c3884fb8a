//! Cadence-gated timeline recorder.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::{AudioFrame, AudioTimeline, PlaybackClock, SourceKind, TrackInfo};
use crate::audio::AudioFeatures;
use crate::params::TimelineConfig;

/// Minimum spacing between counted bass onsets (seconds, ~240 BPM max)
const MIN_ONSET_GAP_S: f64 = 0.25;

/// Recent onsets kept for the tempo estimate
const ONSET_WINDOW: usize = 64;

/// Append-only recorder for one session
#[derive(Debug, Clone)]
pub struct TimelineRecorder {
    frames: Vec<AudioFrame>,
    /// Starts one interval before zero so the first tick always records
    last_recorded_s: f64,
    interval_s: f64,
    source: SourceKind,
    onsets: OnsetTracker,
}

impl TimelineRecorder {
    pub fn new(config: &TimelineConfig, source: SourceKind) -> Self {
        Self {
            frames: Vec::new(),
            last_recorded_s: -config.interval_s,
            interval_s: config.interval_s,
            source,
            onsets: OnsetTracker::new(config.onset_threshold, config.min_onsets_for_bpm),
        }
    }

    /// Offer this tick's features; returns whether a frame was appended
    pub fn record(&mut self, clock: &PlaybackClock, features: &AudioFeatures) -> bool {
        let now = clock.current_time();
        if !now.is_finite() {
            return false;
        }

        self.onsets.observe(now, features.bass);

        if now - self.last_recorded_s < self.interval_s {
            return false;
        }

        self.frames.push(AudioFrame {
            time: now,
            volume_rms: features.volume_rms,
            bass: features.bass,
            treble: features.treble,
        });
        self.last_recorded_s = now;
        trace!("Timeline frame {} at {:.2}s", self.frames.len(), now);
        true
    }

    pub fn frames(&self) -> &[AudioFrame] {
        &self.frames
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Materialize the timeline recorded so far
    pub fn snapshot(&self, duration: Option<f64>) -> AudioTimeline {
        AudioTimeline {
            track_info: TrackInfo {
                duration,
                bpm_approx: self.onsets.bpm(),
                source: self.source,
            },
            frames: self.frames.clone(),
        }
    }

    /// Consume the recorder into the final timeline
    pub fn finish(self, duration: Option<f64>) -> AudioTimeline {
        let bpm_approx = self.onsets.bpm();
        debug!(
            "Timeline finished: {} frames, duration {:?}, bpm {:?}",
            self.frames.len(),
            duration,
            bpm_approx
        );
        AudioTimeline {
            track_info: TrackInfo {
                duration,
                bpm_approx,
                source: self.source,
            },
            frames: self.frames,
        }
    }
}

/// Rising-edge bass onsets, folded into a rough tempo
#[derive(Debug, Clone)]
struct OnsetTracker {
    threshold: f32,
    min_onsets: usize,
    above: bool,
    times: VecDeque<f64>,
}

impl OnsetTracker {
    fn new(threshold: f32, min_onsets: usize) -> Self {
        Self {
            threshold,
            min_onsets: min_onsets.max(2),
            above: false,
            times: VecDeque::with_capacity(ONSET_WINDOW),
        }
    }

    fn observe(&mut self, time_s: f64, bass: f32) {
        let above = bass >= self.threshold;
        if above && !self.above {
            let spaced = self
                .times
                .back()
                .map_or(true, |&last| time_s - last >= MIN_ONSET_GAP_S);
            if spaced {
                if self.times.len() == ONSET_WINDOW {
                    self.times.pop_front();
                }
                self.times.push_back(time_s);
            }
        }
        self.above = above;
    }

    /// Median inter-onset interval as BPM, folded into [70, 180)
    fn bpm(&self) -> Option<f32> {
        if self.times.len() < self.min_onsets {
            return None;
        }
        let mut intervals: Vec<f64> = self
            .times
            .iter()
            .zip(self.times.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect();
        intervals.sort_by(|a, b| a.total_cmp(b));
        let median = intervals[intervals.len() / 2];
        if median <= 0.0 {
            return None;
        }

        let mut bpm = 60.0 / median;
        while bpm < 70.0 {
            bpm *= 2.0;
        }
        while bpm >= 180.0 {
            bpm /= 2.0;
        }
        Some(bpm as f32)
    }
}

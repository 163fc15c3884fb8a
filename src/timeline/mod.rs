//! Coarse, time-stamped recording of audio features.
//!
//! The recorder samples at a fixed cadence of session time rather than per
//! render tick, so the timeline stays small no matter the frame rate. The
//! finished timeline is what the plan-authoring boundary summarizes.

mod recorder;
mod summary;

use serde::{Deserialize, Serialize};

// Re-export public types
pub use recorder::TimelineRecorder;
pub use summary::{FeatureAccumulator, FeatureSummary};

/// Where session audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Mic,
    File,
}

/// One recorded sample of the feature stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFrame {
    /// Session time (seconds)
    pub time: f64,
    pub volume_rms: f32,
    pub bass: f32,
    pub treble: f32,
}

/// Metadata about the recorded track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm_approx: Option<f32>,
    pub source: SourceKind,
}

/// Finished recording handed to the plan-authoring boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTimeline {
    pub track_info: TrackInfo,
    pub frames: Vec<AudioFrame>,
}

/// Authoritative "current time" for a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackClock {
    /// File sessions: the media element's own playback position
    Media { position_s: f64 },
    /// Live sessions: audio clock now minus the clock at session start
    Live { now_s: f64, session_start_s: f64 },
}

impl PlaybackClock {
    pub fn current_time(&self) -> f64 {
        match *self {
            PlaybackClock::Media { position_s } => position_s,
            PlaybackClock::Live {
                now_s,
                session_start_s,
            } => now_s - session_start_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_clock_is_relative_to_session_start() {
        let clock = PlaybackClock::Live {
            now_s: 105.5,
            session_start_s: 100.0,
        };
        assert_eq!(clock.current_time(), 5.5);
    }

    #[test]
    fn test_timeline_json_shape() {
        let timeline = AudioTimeline {
            track_info: TrackInfo {
                duration: Some(12.0),
                bpm_approx: None,
                source: SourceKind::File,
            },
            frames: vec![AudioFrame {
                time: 0.0,
                volume_rms: 0.5,
                bass: 0.25,
                treble: 0.125,
            }],
        };

        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["trackInfo"]["source"], "file");
        assert_eq!(json["trackInfo"]["duration"], 12.0);
        assert!(json["trackInfo"].get("bpmApprox").is_none());
        assert_eq!(json["frames"][0]["volumeRms"], 0.5);
    }
}

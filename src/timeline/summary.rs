//! Whole-session feature statistics for the target-authoring boundary.

use serde::{Deserialize, Serialize};

use crate::audio::AudioFeatures;

/// Request body for target authoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSummary {
    /// Seconds of audio covered
    pub duration: f64,
    pub avg_rms: f32,
    pub max_rms: f32,
    pub avg_bass: f32,
    pub avg_mid: f32,
    pub avg_treble: f32,
    /// Mean absolute tick-to-tick change of total band energy
    pub flux: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_hint: Option<String>,
    pub ui_language: String,
}

/// Running sums over every tick's features
#[derive(Debug, Clone, Default)]
pub struct FeatureAccumulator {
    count: u64,
    sum_rms: f64,
    max_rms: f32,
    sum_bass: f64,
    sum_mid: f64,
    sum_treble: f64,
    flux_sum: f64,
    previous_energy: Option<f32>,
}

impl FeatureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: &AudioFeatures) {
        self.count += 1;
        self.sum_rms += features.volume_rms as f64;
        self.max_rms = self.max_rms.max(features.volume_rms);
        self.sum_bass += features.bass as f64;
        self.sum_mid += features.mid as f64;
        self.sum_treble += features.treble as f64;

        let energy = features.bass + features.mid + features.treble;
        if let Some(previous) = self.previous_energy {
            self.flux_sum += (energy - previous).abs() as f64;
        }
        self.previous_energy = Some(energy);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Averages so far; all zero before the first tick
    pub fn summarize(
        &self,
        duration: f64,
        mood_hint: Option<String>,
        ui_language: &str,
    ) -> FeatureSummary {
        let n = self.count.max(1) as f64;
        let flux_n = self.count.saturating_sub(1).max(1) as f64;
        FeatureSummary {
            duration,
            avg_rms: (self.sum_rms / n) as f32,
            max_rms: self.max_rms,
            avg_bass: (self.sum_bass / n) as f32,
            avg_mid: (self.sum_mid / n) as f32,
            avg_treble: (self.sum_treble / n) as f32,
            flux: (self.flux_sum / flux_n) as f32,
            mood_hint,
            ui_language: ui_language.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(rms: f32, bass: f32, mid: f32, treble: f32) -> AudioFeatures {
        AudioFeatures {
            volume_rms: rms,
            bass,
            mid,
            treble,
        }
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = FeatureAccumulator::new().summarize(0.0, None, "en");
        assert_eq!(summary.avg_rms, 0.0);
        assert_eq!(summary.flux, 0.0);
        assert_eq!(summary.ui_language, "en");
    }

    #[test]
    fn test_averages_max_and_flux() {
        let mut acc = FeatureAccumulator::new();
        acc.push(&f(0.2, 0.1, 0.1, 0.1)); // energy 0.3
        acc.push(&f(0.6, 0.3, 0.3, 0.3)); // energy 0.9
        acc.push(&f(0.4, 0.1, 0.1, 0.1)); // energy 0.3

        let summary = acc.summarize(3.0, Some("dreamy".to_string()), "de");
        assert!((summary.avg_rms - 0.4).abs() < 1e-6);
        assert_eq!(summary.max_rms, 0.6);
        assert!((summary.avg_bass - 0.5 / 3.0).abs() < 1e-6);
        // |0.9-0.3| + |0.3-0.9| over 2 steps
        assert!((summary.flux - 0.6).abs() < 1e-5);
        assert_eq!(summary.mood_hint.as_deref(), Some("dreamy"));
    }

    #[test]
    fn test_summary_json_is_camel_case() {
        let summary = FeatureAccumulator::new().summarize(1.0, None, "en");
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("avgRms").is_some());
        assert!(json.get("uiLanguage").is_some());
        assert!(json.get("moodHint").is_none());
    }
}

//! Coarse loudness and band-energy extraction.

use std::ops::Range;

use super::fft::AnalysisBuffer;
use crate::params::FeatureConfig;

/// Instantaneous audio features, each in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFeatures {
    pub volume_rms: f32,
    pub bass: f32,
    /// Only used for summaries; the visual path reads bass and treble
    pub mid: f32,
    pub treble: f32,
}

/// Per-tick feature extraction from an analysis buffer
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Extract RMS and band energies
    ///
    /// Never fails: empty or silent buffers produce all-zero features.
    pub fn extract(&self, buffer: &AnalysisBuffer) -> AudioFeatures {
        let volume_rms = (rms(&buffer.time_domain) * self.config.rms_gain).clamp(0.0, 1.0);

        let bins = buffer.bin_count();
        if bins == 0 || buffer.sample_rate_hz == 0 {
            return AudioFeatures {
                volume_rms,
                ..AudioFeatures::default()
            };
        }

        let nyquist = buffer.nyquist_hz();
        let bass = 0..bin_for(self.config.bass_cutoff_hz, nyquist, bins);
        let mid = bass.end..bin_for(self.config.treble_low_hz, nyquist, bins);
        let treble = mid.end..bin_for(self.config.treble_high_hz, nyquist, bins);

        AudioFeatures {
            volume_rms,
            bass: self.band_mean(&buffer.frequency_db, bass),
            mid: self.band_mean(&buffer.frequency_db, mid),
            treble: self.band_mean(&buffer.frequency_db, treble),
        }
    }

    /// Mean linear magnitude over a bin range, clamped to [0, 1]
    fn band_mean(&self, frequency_db: &[f32], bins: Range<usize>) -> f32 {
        if bins.is_empty() {
            return 0.0;
        }
        let sum: f32 = frequency_db[bins.clone()]
            .iter()
            .map(|&db| {
                if db.is_finite() && db > self.config.min_decibels {
                    10f32.powf(db / 20.0)
                } else {
                    0.0
                }
            })
            .sum();
        (sum / bins.len() as f32).clamp(0.0, 1.0)
    }
}

/// Convert frequency (Hz) to bin index, saturating at the bin count
pub fn bin_for(frequency_hz: f32, nyquist_hz: f32, bin_count: usize) -> usize {
    let bin = (frequency_hz / nyquist_hz * bin_count as f32).floor();
    if bin.is_finite() && bin > 0.0 {
        (bin as usize).min(bin_count)
    } else {
        0
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_square = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let value = mean_square.sqrt();
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(db: f32, time: f32) -> AnalysisBuffer {
        AnalysisBuffer {
            time_domain: vec![time; 2048],
            frequency_db: vec![db; 1024],
            sample_rate_hz: 44100,
        }
    }

    #[test]
    fn test_bin_edges() {
        // 44.1 kHz, 1024 bins: 21.5 Hz per bin
        assert_eq!(bin_for(250.0, 22050.0, 1024), 11);
        assert_eq!(bin_for(4000.0, 22050.0, 1024), 185);
        assert_eq!(bin_for(20000.0, 22050.0, 1024), 928);
        // Above Nyquist saturates
        assert_eq!(bin_for(30000.0, 22050.0, 1024), 1024);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let extractor = FeatureExtractor::new(FeatureConfig::default());
        let features = extractor.extract(&AnalysisBuffer::silent(1024, 44100));
        assert_eq!(features, AudioFeatures::default());
    }

    #[test]
    fn test_empty_buffer_is_all_zero() {
        let extractor = FeatureExtractor::new(FeatureConfig::default());
        let buffer = AnalysisBuffer {
            time_domain: Vec::new(),
            frequency_db: Vec::new(),
            sample_rate_hz: 44100,
        };
        assert_eq!(extractor.extract(&buffer), AudioFeatures::default());
    }

    #[test]
    fn test_rms_is_amplified_and_clamped() {
        let extractor = FeatureExtractor::new(FeatureConfig::default());

        let quiet = extractor.extract(&buffer_with(f32::NEG_INFINITY, 0.2));
        assert!((quiet.volume_rms - 0.4).abs() < 1e-5);

        let loud = extractor.extract(&buffer_with(f32::NEG_INFINITY, 0.9));
        assert_eq!(loud.volume_rms, 1.0);
    }

    #[test]
    fn test_band_energy_is_linear_magnitude() {
        let extractor = FeatureExtractor::new(FeatureConfig::default());

        let features = extractor.extract(&buffer_with(-20.0, 0.0));
        assert!((features.bass - 0.1).abs() < 1e-5);
        assert!((features.mid - 0.1).abs() < 1e-5);
        assert!((features.treble - 0.1).abs() < 1e-5);

        // Positive dB would exceed 1.0 and is clamped
        let hot = extractor.extract(&buffer_with(6.0, 0.0));
        assert_eq!(hot.bass, 1.0);
    }

    #[test]
    fn test_bands_read_their_own_bins() {
        let extractor = FeatureExtractor::new(FeatureConfig::default());
        let mut buffer = buffer_with(f32::NEG_INFINITY, 0.0);
        // Light up only the bass range [0, 11)
        for db in &mut buffer.frequency_db[..11] {
            *db = 0.0;
        }

        let features = extractor.extract(&buffer);
        assert_eq!(features.bass, 1.0);
        assert_eq!(features.mid, 0.0);
        assert_eq!(features.treble, 0.0);
    }
}

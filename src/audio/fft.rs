//! Windowed FFT producing analysis buffers.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::FeatureConfig;

/// One tick's worth of analysis data
///
/// Mirrors what a browser-style analyser node exposes: raw time-domain
/// samples plus one dB magnitude per positive-frequency bin.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisBuffer {
    /// Time-domain samples normalized to [-1, 1]
    pub time_domain: Vec<f32>,

    /// Magnitude per bin (dB), `fft_size / 2` entries
    pub frequency_db: Vec<f32>,

    /// Sample rate of the source (Hz)
    pub sample_rate_hz: u32,
}

impl AnalysisBuffer {
    /// All-silent buffer with the given bin count
    pub fn silent(bin_count: usize, sample_rate_hz: u32) -> Self {
        Self {
            time_domain: vec![0.0; bin_count * 2],
            frequency_db: vec![f32::NEG_INFINITY; bin_count],
            sample_rate_hz,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.frequency_db.len()
    }

    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / 2.0
    }
}

/// Reusable FFT state for turning raw samples into analysis buffers
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    min_decibels: f32,
}

impl SpectrumAnalyzer {
    /// Plan the FFT for the configured window size
    pub fn new(config: &FeatureConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();

        Self {
            fft,
            fft_size: config.fft_size,
            window,
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            min_decibels: config.min_decibels,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Analyze the most recent `fft_size` samples
    ///
    /// Shorter inputs are zero-padded at the front so the newest sample
    /// always sits at the end of the window.
    pub fn analyze(&mut self, samples: &[f32], sample_rate_hz: u32) -> AnalysisBuffer {
        let n = self.fft_size;
        let recent = &samples[samples.len().saturating_sub(n)..];
        let pad = n - recent.len();

        let mut time_domain = vec![0.0; n];
        time_domain[pad..].copy_from_slice(recent);

        // Apply Hann window
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = Complex::new(time_domain[i] * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let frequency_db = self.buffer[..n / 2]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / n as f32;
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(self.min_decibels)
                } else {
                    f32::NEG_INFINITY
                }
            })
            .collect();

        AnalysisBuffer {
            time_domain,
            frequency_db,
            sample_rate_hz,
        }
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_analyze_pads_short_input() {
        let config = FeatureConfig {
            fft_size: 256,
            ..FeatureConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(&config);
        let buffer = analyzer.analyze(&[0.5; 10], 48000);

        assert_eq!(buffer.time_domain.len(), 256);
        assert_eq!(buffer.bin_count(), 128);
        assert_eq!(buffer.time_domain[0], 0.0);
        assert_eq!(buffer.time_domain[255], 0.5);
    }

    #[test]
    fn test_sine_peaks_in_expected_bin() {
        let config = FeatureConfig {
            fft_size: 1024,
            ..FeatureConfig::default()
        };
        let sample_rate = 44100;
        // Pick a frequency that lands exactly on bin 40
        let freq = 40.0 * sample_rate as f32 / 1024.0;
        let samples: Vec<f32> = (0..1024)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();

        let mut analyzer = SpectrumAnalyzer::new(&config);
        let buffer = analyzer.analyze(&samples, sample_rate);

        let peak = buffer
            .frequency_db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 40);
    }

    #[test]
    fn test_silence_has_no_finite_bins() {
        let mut analyzer = SpectrumAnalyzer::new(&FeatureConfig::default());
        let buffer = analyzer.analyze(&[0.0; 4096], 44100);
        assert!(buffer.frequency_db.iter().all(|db| !db.is_finite()));
    }
}

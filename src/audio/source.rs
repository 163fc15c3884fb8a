//! WAV-backed playback source with its own media clock.

use std::path::Path;

use tracing::info;

use crate::error::CaptureError;

/// Decoded mono audio plus a playback cursor
///
/// The cursor is the authoritative clock for file sessions: pausing freezes
/// it, and with it timeline recording.
#[derive(Debug, Clone)]
pub struct FileSource {
    samples: Vec<f32>,
    sample_rate_hz: u32,
    position_s: f64,
    paused: bool,
}

impl FileSource {
    /// Decode a WAV file, downmixing to mono
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        info!(
            "Audio file: {:?} @ {}Hz, {} channel(s), {:.1}s",
            path,
            spec.sample_rate,
            spec.channels,
            samples.len() as f64 / spec.sample_rate.max(1) as f64
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// Wrap already-decoded mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz: sample_rate_hz.max(1),
            position_s: 0.0,
            paused: false,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Known media duration (seconds)
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate_hz as f64
    }

    /// Current playback position (seconds)
    pub fn position_s(&self) -> f64 {
        self.position_s
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.position_s >= self.duration_s()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Jump to a position, clamped to the media
    pub fn seek(&mut self, position_s: f64) {
        self.position_s = position_s.clamp(0.0, self.duration_s());
    }

    /// Advance the playback clock unless paused
    pub fn advance(&mut self, dt_s: f64) {
        if !self.paused && dt_s > 0.0 {
            self.position_s = (self.position_s + dt_s).min(self.duration_s());
        }
    }

    /// Up to `len` samples ending at the playback position
    pub fn window(&self, len: usize) -> &[f32] {
        let end = ((self.position_s * self.sample_rate_hz as f64) as usize).min(self.samples.len());
        &self.samples[end.saturating_sub(len)..end]
    }
}

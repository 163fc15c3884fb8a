//! Live microphone capture into a shared sample ring.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::error::CaptureError;

/// Microphone input stream feeding a bounded ring of mono samples
pub struct MicCapture {
    /// Most recent samples (thread-safe, written by the audio callback)
    ring: Arc<Mutex<VecDeque<f32>>>,

    sample_rate_hz: u32,

    /// Input stream (kept alive)
    _stream: cpal::Stream,
}

impl MicCapture {
    /// Open the default input device and start streaming
    ///
    /// `capacity` bounds how many mono samples are retained.
    pub fn open(capacity: usize) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceConfig(e.to_string()))?;

        let sample_rate_hz = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;

        info!(
            "Microphone: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz
        );

        let ring = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));
        let err_fn = |err: cpal::StreamError| error!("Audio stream error: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let ring = Arc::clone(&ring);
                device.build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        push_frames(&ring, capacity, channels, data.iter().copied());
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let ring = Arc::clone(&ring);
                device.build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let samples = data.iter().map(|&s| s as f32 / i16::MAX as f32);
                        push_frames(&ring, capacity, channels, samples);
                    },
                    err_fn,
                    None,
                )
            }
            other => return Err(CaptureError::UnsupportedFormat(format!("{:?}", other))),
        }
        .map_err(|e| CaptureError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        Ok(Self {
            ring,
            sample_rate_hz,
            _stream: stream,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Copy of the newest `len` samples (fewer if the ring is still filling)
    pub fn snapshot(&self, len: usize) -> Vec<f32> {
        let ring = self.ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let skip = ring.len().saturating_sub(len);
        ring.iter().skip(skip).copied().collect()
    }
}

/// Downmix interleaved frames to mono and append, dropping the oldest
fn push_frames(
    ring: &Mutex<VecDeque<f32>>,
    capacity: usize,
    channels: usize,
    samples: impl Iterator<Item = f32>,
) {
    let Ok(mut ring) = ring.lock() else {
        return;
    };
    let mut acc = 0.0;
    for (i, sample) in samples.enumerate() {
        acc += sample;
        if (i + 1) % channels == 0 {
            if ring.len() == capacity {
                ring.pop_front();
            }
            ring.push_back(acc / channels as f32);
            acc = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_frames_downmixes_and_bounds() {
        let ring = Mutex::new(VecDeque::new());
        push_frames(&ring, 3, 2, [1.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 1.0].into_iter());

        let ring = ring.into_inner().unwrap();
        // Oldest frame (0.5) dropped once capacity was reached
        assert_eq!(ring, VecDeque::from(vec![0.5, 0.0, 1.0]));
    }
}

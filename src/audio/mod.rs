//! Audio input and feature analysis.
//!
//! Sources (WAV file or microphone) provide raw samples, the spectrum
//! analyzer turns them into analysis buffers, and the feature extractor
//! reduces each buffer to coarse loudness and band energies.

#[cfg(feature = "mic")]
mod capture;
mod features;
mod fft;
mod source;

// Re-export public types
#[cfg(feature = "mic")]
pub use capture::MicCapture;
pub use features::{bin_for, AudioFeatures, FeatureExtractor};
pub use fft::{hann_window, AnalysisBuffer, SpectrumAnalyzer};
pub use source::FileSource;

//! Offline single-channel audio enhancement pipeline
//!
//! Multi-stage processing for cleaning up noisy mono recordings:
//! 1. Silence trimming (frame-energy scan from both ends)
//! 2. SNR improvement (spectral subtraction + Wiener filtering)
//! 3. Spectral gating (global-threshold noise suppression)
//! 4. Peak normalization
//! 5. Dynamic range compression (envelope follower)
//!
//! Every stage is a pure function from waveform to waveform; which stages
//! run is controlled by [`PipelineConfig`]. The [`io`] module supplies the
//! decode/encode collaborators for callers working with audio files.

pub mod dynamics;
pub mod error;
pub mod gate;
pub mod io;
pub mod noise;
pub mod pipeline;
pub mod snr;
pub mod stft;
pub mod trim;
pub mod waveform;

pub use error::EnhanceError;
pub use pipeline::{process, CompressorConfig, PipelineConfig};
pub use waveform::Waveform;

//! Pipeline orchestration
//!
//! Runs the enabled stages in fixed order: trim silence, improve SNR,
//! spectral gate, normalize, compress. Noise removal comes before
//! normalization so the noise floor never sets the gain reference, and
//! compression runs last so its threshold sees predictable levels.

use serde::{Deserialize, Serialize};

use crate::dynamics;
use crate::error::EnhanceError;
use crate::gate::spectral_gate;
use crate::snr::improve_snr;
use crate::trim::trim_silence;
use crate::waveform::Waveform;

/// Options controlling which stages run and their parameters.
///
/// Every field is optional when deserialized; missing fields take the
/// defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Target sample rate for decoding (Hz)
    pub sample_rate: u32,

    /// Enable peak normalization
    pub normalize: bool,
    /// Enable the spectral gate
    pub remove_noise: bool,
    /// Enable leading/trailing silence removal
    pub trim_silence: bool,
    /// Enable dynamic range compression
    pub apply_compression: bool,
    /// Enable spectral subtraction + Wiener filtering
    pub improve_snr: bool,

    /// STFT frame length in samples
    pub frame_length: usize,
    /// STFT hop length in samples
    pub hop_length: usize,

    /// Fraction of quietest frames used for the noise profile (0-1)
    pub noise_percentile: f32,
    /// Gate threshold as a multiple of the measured noise floor
    pub gate_threshold_multiplier: f32,
    /// Frames this many dB below the loudest frame count as silence
    pub silence_trim_threshold_db: f32,

    pub compression: CompressorConfig,
}

/// Compressor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressorConfig {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            normalize: true,
            remove_noise: true,
            trim_silence: true,
            apply_compression: true,
            improve_snr: true,
            frame_length: 2048,
            hop_length: 512,
            noise_percentile: 0.15,
            gate_threshold_multiplier: 2.0,
            silence_trim_threshold_db: 30.0,
            compression: CompressorConfig::default(),
        }
    }
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 5.0,
            release_ms: 50.0,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations no stage could run with.
    ///
    /// Called before any stage so an invalid config never produces a
    /// partially processed result.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        if self.sample_rate == 0 {
            return Err(EnhanceError::InvalidParameter(
                "sample rate must be > 0".to_string(),
            ));
        }
        if self.frame_length == 0 {
            return Err(EnhanceError::InvalidParameter(
                "frame length must be > 0".to_string(),
            ));
        }
        if self.hop_length == 0 {
            return Err(EnhanceError::InvalidParameter(
                "hop length must be > 0".to_string(),
            ));
        }
        if self.noise_percentile <= 0.0 || self.noise_percentile > 1.0 {
            return Err(EnhanceError::InvalidParameter(format!(
                "noise percentile must be in (0, 1], got {}",
                self.noise_percentile
            )));
        }
        if self.gate_threshold_multiplier < 0.0 {
            return Err(EnhanceError::InvalidParameter(
                "gate threshold multiplier must be >= 0".to_string(),
            ));
        }
        if self.compression.ratio <= 0.0 {
            return Err(EnhanceError::InvalidParameter(format!(
                "compression ratio must be > 0, got {}",
                self.compression.ratio
            )));
        }
        if self.compression.attack_ms <= 0.0 || self.compression.release_ms <= 0.0 {
            return Err(EnhanceError::InvalidParameter(
                "attack and release times must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run the enabled stages over the waveform.
///
/// Stage order is fixed; disabled stages are the identity. The waveform's
/// own sample rate drives the compressor's time constants.
pub fn process(waveform: &Waveform, config: &PipelineConfig) -> Result<Waveform, EnhanceError> {
    config.validate()?;
    if waveform.sample_rate == 0 {
        return Err(EnhanceError::InvalidParameter(
            "waveform sample rate must be > 0".to_string(),
        ));
    }

    let mut current = waveform.clone();

    if config.trim_silence {
        current = trim_silence(&current, config.silence_trim_threshold_db);
        log::debug!(
            "trim: {} -> {} samples",
            waveform.samples.len(),
            current.samples.len()
        );
    }

    if config.improve_snr {
        current = improve_snr(
            &current,
            config.frame_length,
            config.hop_length,
            config.noise_percentile,
        )?;
    }

    if config.remove_noise {
        current = spectral_gate(
            &current,
            config.gate_threshold_multiplier,
            config.frame_length,
            config.hop_length,
        )?;
    }

    if config.normalize {
        current = dynamics::normalize_peak(&current);
    }

    if config.apply_compression {
        let c = &config.compression;
        current = dynamics::compress(&current, c.threshold_db, c.ratio, c.attack_ms, c.release_ms)?;
    }

    log::debug!(
        "pipeline done: {} samples at {} Hz",
        current.samples.len(),
        current.sample_rate
    );
    Ok(current)
}

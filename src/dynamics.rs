//! Level management: peak normalization and dynamic range compression

use crate::error::EnhanceError;
use crate::waveform::Waveform;

/// Floor added before converting the envelope to dB.
const ENVELOPE_DB_FLOOR: f32 = 1e-8;

/// Scale the waveform so its peak absolute amplitude becomes 1.0.
///
/// A silent waveform is returned unchanged; there is nothing to scale and
/// dividing by a zero peak would poison every sample.
pub fn normalize_peak(waveform: &Waveform) -> Waveform {
    let peak = waveform.peak();
    if peak <= 0.0 {
        return waveform.clone();
    }

    let scale = 1.0 / peak;
    Waveform::new(
        waveform.samples.iter().map(|s| s * scale).collect(),
        waveform.sample_rate,
    )
}

/// Downward compressor with envelope following.
///
/// The envelope rises toward the current sample's absolute value with the
/// attack coefficient and decays with the slower release coefficient. Gain
/// reduction above the threshold is scaled by `1 - 1/ratio` and clamped to
/// 0 dB, so the compressor never amplifies.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl Compressor {
    /// Time constants are `exp(-1 / (sample_rate * seconds))`, so the
    /// sample rate must be threaded in explicitly.
    pub fn new(
        sample_rate: u32,
        threshold_db: f32,
        ratio: f32,
        attack_ms: f32,
        release_ms: f32,
    ) -> Result<Self, EnhanceError> {
        if sample_rate == 0 {
            return Err(EnhanceError::InvalidParameter(
                "sample rate must be > 0".to_string(),
            ));
        }
        if ratio <= 0.0 {
            return Err(EnhanceError::InvalidParameter(format!(
                "compression ratio must be > 0, got {}",
                ratio
            )));
        }
        if attack_ms <= 0.0 || release_ms <= 0.0 {
            return Err(EnhanceError::InvalidParameter(
                "attack and release times must be > 0".to_string(),
            ));
        }

        let attack_coeff = (-1.0 / (sample_rate as f32 * attack_ms / 1000.0)).exp();
        let release_coeff = (-1.0 / (sample_rate as f32 * release_ms / 1000.0)).exp();

        Ok(Self {
            threshold_db,
            ratio,
            attack_coeff,
            release_coeff,
            envelope: 0.0,
        })
    }

    /// Gain-reduce everything whose envelope exceeds the threshold.
    ///
    /// The envelope recurrence is inherently sequential: each sample's
    /// smoothing depends on the previous envelope value, so this must not
    /// be chunked across the time axis.
    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        let slope = 1.0 - 1.0 / self.ratio;

        samples
            .iter()
            .map(|&x| {
                let input_abs = x.abs();
                let coeff = if input_abs > self.envelope {
                    self.attack_coeff
                } else {
                    self.release_coeff
                };
                self.envelope = self.envelope * coeff + input_abs * (1.0 - coeff);

                let envelope_db = 20.0 * (self.envelope + ENVELOPE_DB_FLOOR).log10();
                let gain_db = ((self.threshold_db - envelope_db) * slope).min(0.0);
                x * 10.0f32.powf(gain_db / 20.0)
            })
            .collect()
    }
}

/// One-shot compression of a whole waveform.
pub fn compress(
    waveform: &Waveform,
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
) -> Result<Waveform, EnhanceError> {
    let mut compressor = Compressor::new(
        waveform.sample_rate,
        threshold_db,
        ratio,
        attack_ms,
        release_ms,
    )?;
    Ok(Waveform::new(
        compressor.process(&waveform.samples),
        waveform.sample_rate,
    ))
}

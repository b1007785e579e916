//! Global-threshold spectral gate
//!
//! A cruder companion to the Wiener stage: one scalar noise floor, taken
//! as the mean of the per-bin minimum magnitudes, gates every bin with a
//! hard binary mask.

use crate::error::EnhanceError;
use crate::stft::{overlay, Stft};
use crate::waveform::Waveform;

/// Zero every spectral bin below `threshold_multiplier` times the
/// measured noise floor.
///
/// An all-zero input measures a zero floor, so every bin is already at
/// the mask value and the signal passes through unchanged. Signals
/// shorter than one frame are returned unchanged.
pub fn spectral_gate(
    waveform: &Waveform,
    threshold_multiplier: f32,
    frame_length: usize,
    hop_length: usize,
) -> Result<Waveform, EnhanceError> {
    let stft = Stft::new(frame_length, hop_length)?;
    if waveform.samples.len() < frame_length {
        return Ok(waveform.clone());
    }

    let mut spectrogram = stft.analyze(&waveform.samples);
    if spectrogram.n_frames() == 0 {
        return Ok(waveform.clone());
    }

    // Mean across bins of each bin's minimum magnitude over time
    let n_bins = spectrogram.n_bins();
    let mut floor_sum = 0.0f32;
    for bin in 0..n_bins {
        let bin_min = spectrogram
            .magnitudes
            .iter()
            .map(|frame| frame[bin])
            .fold(f32::INFINITY, f32::min);
        floor_sum += bin_min;
    }
    let threshold = threshold_multiplier * floor_sum / n_bins as f32;

    for frame in spectrogram.magnitudes.iter_mut() {
        for mag in frame.iter_mut() {
            if *mag <= threshold {
                *mag = 0.0;
            }
        }
    }

    let synthesized = stft.synthesize(&spectrogram);
    Ok(Waveform::new(
        overlay(&waveform.samples, &synthesized),
        waveform.sample_rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_sine(len: usize) -> Waveform {
        let mut state = 0x6d2b79f5u32;
        let samples = (0..len)
            .map(|i| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let noise = (state >> 16) as f32 / 65535.0 - 0.5;
                let t = i as f32 / 22050.0;
                0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() + 0.02 * noise
            })
            .collect();
        Waveform::new(samples, 22050)
    }

    #[test]
    fn test_all_zero_passes_through() {
        let wave = Waveform::new(vec![0.0; 22050], 22050);
        let gated = spectral_gate(&wave, 2.0, 2048, 512).unwrap();
        assert!(gated.samples.iter().all(|&s| s.abs() < 1e-6));
        assert_eq!(gated.samples.len(), wave.samples.len());
    }

    #[test]
    fn test_output_length_matches_input() {
        let wave = noisy_sine(22050);
        let gated = spectral_gate(&wave, 2.0, 2048, 512).unwrap();
        assert_eq!(gated.samples.len(), wave.samples.len());
    }

    #[test]
    fn test_short_input_unchanged() {
        let wave = noisy_sine(512);
        let gated = spectral_gate(&wave, 2.0, 2048, 512).unwrap();
        assert_eq!(gated, wave);
    }

    #[test]
    fn test_reduces_energy_of_noise() {
        let wave = noisy_sine(22050);
        let gated = spectral_gate(&wave, 2.0, 2048, 512).unwrap();

        let energy_in: f32 = wave.samples.iter().map(|s| s * s).sum();
        let energy_out: f32 = gated.samples.iter().map(|s| s * s).sum();
        assert!(energy_out <= energy_in * 1.01);
    }

    #[test]
    fn test_rejects_zero_frame_length() {
        let wave = noisy_sine(22050);
        assert!(spectral_gate(&wave, 2.0, 0, 512).is_err());
    }
}

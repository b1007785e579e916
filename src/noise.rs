//! Stationary noise floor estimation
//!
//! Speech energy is transient, so the low end of each bin's magnitude
//! distribution over time is dominated by the stationary background. The
//! quietest fraction of frames per bin is averaged into a noise profile.

use crate::stft::Spectrogram;

/// Estimate a per-bin noise magnitude from the quietest frames.
///
/// For each frequency bin the magnitudes are sorted across time and the
/// lowest `percentile` fraction averaged. At least one frame is always
/// included, so short spectrograms still produce a usable profile.
pub fn estimate_noise_profile(spectrogram: &Spectrogram, percentile: f32) -> Vec<f32> {
    let n_frames = spectrogram.n_frames();
    let n_bins = spectrogram.n_bins();
    if n_frames == 0 {
        return vec![0.0; n_bins];
    }

    let quiet_count = ((n_frames as f32 * percentile) as usize)
        .max(1)
        .min(n_frames);

    let mut profile = Vec::with_capacity(n_bins);
    for bin in 0..n_bins {
        let mut column: Vec<f32> = spectrogram
            .magnitudes
            .iter()
            .map(|frame| frame[bin])
            .collect();
        column.sort_by(|a, b| a.total_cmp(b));

        let sum: f32 = column[..quiet_count].iter().sum();
        profile.push(sum / quiet_count as f32);
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stft::Stft;

    fn noisy_tone(len: usize) -> Vec<f32> {
        // Deterministic pseudo-noise over a 440 Hz tone
        let mut state = 0x2545f491u32;
        (0..len)
            .map(|i| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let noise = (state >> 16) as f32 / 65535.0 - 0.5;
                let t = i as f32 / 22050.0;
                0.2 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() + 0.04 * noise
            })
            .collect()
    }

    #[test]
    fn test_profile_is_non_negative() {
        let stft = Stft::new(1024, 256).unwrap();
        let spec = stft.analyze(&noisy_tone(22050));
        for value in estimate_noise_profile(&spec, 0.15) {
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_profile_length_matches_bins() {
        let stft = Stft::new(1024, 256).unwrap();
        let spec = stft.analyze(&noisy_tone(22050));
        assert_eq!(estimate_noise_profile(&spec, 0.15).len(), spec.n_bins());
    }

    #[test]
    fn test_percentile_monotonicity() {
        let stft = Stft::new(1024, 256).unwrap();
        let spec = stft.analyze(&noisy_tone(22050));

        let low = estimate_noise_profile(&spec, 0.15);
        let high = estimate_noise_profile(&spec, 0.30);
        for (bin, (lo, hi)) in low.iter().zip(&high).enumerate() {
            assert!(
                hi >= lo,
                "bin {}: estimate shrank when percentile grew ({} < {})",
                bin,
                hi,
                lo
            );
        }
    }

    #[test]
    fn test_few_frames_still_averages_one() {
        // 3 frames at 15% would floor to zero frames; at least one must count
        let stft = Stft::new(1024, 1024).unwrap();
        let spec = stft.analyze(&noisy_tone(3 * 1024));
        assert_eq!(spec.n_frames(), 3);

        let profile = estimate_noise_profile(&spec, 0.15);
        assert!(profile.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_empty_spectrogram_gives_zero_profile() {
        let stft = Stft::new(1024, 256).unwrap();
        let spec = stft.analyze(&[]);
        let profile = estimate_noise_profile(&spec, 0.15);
        assert_eq!(profile.len(), spec.n_bins());
        assert!(profile.iter().all(|&v| v == 0.0));
    }
}

//! Short-time Fourier analysis and overlap-add synthesis
//!
//! Shared framer for the spectral stages. Hann window on both analysis and
//! synthesis, squared-window normalization on resynthesis so an unmodified
//! spectrogram reconstructs the original signal.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::error::EnhanceError;

/// Magnitude/phase grid produced by [`Stft::analyze`].
///
/// Indexed `[frame][bin]` with `frame_length / 2 + 1` bins per frame.
pub struct Spectrogram {
    pub magnitudes: Vec<Vec<f32>>,
    pub phases: Vec<Vec<f32>>,
    frame_length: usize,
    hop_length: usize,
}

impl Spectrogram {
    pub fn n_frames(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn n_bins(&self) -> usize {
        self.frame_length / 2 + 1
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }
}

/// STFT/ISTFT transformer with a fixed frame and hop length.
pub struct Stft {
    frame_length: usize,
    hop_length: usize,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    window: Vec<f32>,
}

impl Stft {
    pub fn new(frame_length: usize, hop_length: usize) -> Result<Self, EnhanceError> {
        if frame_length == 0 {
            return Err(EnhanceError::InvalidParameter(
                "frame length must be > 0".to_string(),
            ));
        }
        if hop_length == 0 {
            return Err(EnhanceError::InvalidParameter(
                "hop length must be > 0".to_string(),
            ));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(frame_length);
        let inverse = planner.plan_fft_inverse(frame_length);

        // Hann window
        let window: Vec<f32> = (0..frame_length)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / frame_length as f32).cos())
            })
            .collect();

        Ok(Self {
            frame_length,
            hop_length,
            forward,
            inverse,
            window,
        })
    }

    /// Windowed forward transform over every full frame.
    ///
    /// Signals shorter than one frame yield an empty spectrogram; callers
    /// treat that as "nothing to do" rather than an error.
    pub fn analyze(&self, samples: &[f32]) -> Spectrogram {
        let mut magnitudes = Vec::new();
        let mut phases = Vec::new();

        let mut pos = 0;
        while pos + self.frame_length <= samples.len() {
            let mut buffer: Vec<f32> = samples[pos..pos + self.frame_length]
                .iter()
                .zip(&self.window)
                .map(|(s, w)| s * w)
                .collect();

            let mut spectrum = self.forward.make_output_vec();
            if self.forward.process(&mut buffer, &mut spectrum).is_ok() {
                magnitudes.push(spectrum.iter().map(|c| c.norm()).collect());
                phases.push(spectrum.iter().map(|c| c.arg()).collect());
            }

            pos += self.hop_length;
        }

        Spectrogram {
            magnitudes,
            phases,
            frame_length: self.frame_length,
            hop_length: self.hop_length,
        }
    }

    /// Overlap-add resynthesis.
    ///
    /// Output covers `(n_frames - 1) * hop_length + frame_length` samples,
    /// normalized by the accumulated squared window.
    pub fn synthesize(&self, spectrogram: &Spectrogram) -> Vec<f32> {
        if spectrogram.n_frames() == 0 {
            return Vec::new();
        }

        let out_len = (spectrogram.n_frames() - 1) * self.hop_length + self.frame_length;
        let mut output = vec![0.0f32; out_len];
        let mut window_sum = vec![0.0f32; out_len];
        let norm = 1.0 / self.frame_length as f32;

        for (frame_idx, (mags, phases)) in spectrogram
            .magnitudes
            .iter()
            .zip(&spectrogram.phases)
            .enumerate()
        {
            let mut spectrum: Vec<Complex<f32>> = mags
                .iter()
                .zip(phases)
                .map(|(&m, &p)| Complex::from_polar(m, p))
                .collect();

            // DC and Nyquist bins of a real signal are purely real;
            // from_polar can leave float dust in the imaginary parts
            if let Some(dc) = spectrum.first_mut() {
                dc.im = 0.0;
            }
            if self.frame_length % 2 == 0 {
                if let Some(nyquist) = spectrum.last_mut() {
                    nyquist.im = 0.0;
                }
            }

            let mut frame = self.inverse.make_output_vec();
            if self.inverse.process(&mut spectrum, &mut frame).is_err() {
                continue;
            }

            let start = frame_idx * self.hop_length;
            for (i, sample) in frame.iter().enumerate() {
                output[start + i] += sample * norm * self.window[i];
                window_sum[start + i] += self.window[i] * self.window[i];
            }
        }

        // Overlap-add normalization; samples with no window coverage stay 0
        for (sample, wsum) in output.iter_mut().zip(&window_sum) {
            if *wsum > 1e-3 {
                *sample /= *wsum;
            }
        }

        output
    }
}

/// Overlay a resynthesized region onto a copy of the original signal.
///
/// The synthesis output only covers full frames; anything past the last
/// frame passes through untouched so stage output length equals input
/// length.
pub(crate) fn overlay(original: &[f32], processed: &[f32]) -> Vec<f32> {
    let mut samples = original.to_vec();
    let covered = processed.len().min(samples.len());
    samples[..covered].copy_from_slice(&processed[..covered]);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, freq: f32, sample_rate: f32, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_rejects_zero_frame_length() {
        assert!(Stft::new(0, 512).is_err());
    }

    #[test]
    fn test_rejects_zero_hop_length() {
        assert!(Stft::new(2048, 0).is_err());
    }

    #[test]
    fn test_bin_count() {
        let stft = Stft::new(1024, 256).unwrap();
        let spec = stft.analyze(&vec![0.0; 4096]);
        assert_eq!(spec.n_bins(), 513);
        assert!(spec.n_frames() > 0);
        for frame in &spec.magnitudes {
            assert_eq!(frame.len(), 513);
        }
    }

    #[test]
    fn test_short_signal_yields_empty_spectrogram() {
        let stft = Stft::new(2048, 512).unwrap();
        let spec = stft.analyze(&vec![0.1; 100]);
        assert_eq!(spec.n_frames(), 0);
        assert!(stft.synthesize(&spec).is_empty());
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let stft = Stft::new(1024, 256).unwrap();
        let signal = sine(8192, 440.0, 22050.0, 0.5);

        let spec = stft.analyze(&signal);
        let rebuilt = stft.synthesize(&spec);

        // Interior samples (full window coverage) must match closely;
        // the first and last frame lengths are edge-attenuated.
        for i in 1024..rebuilt.len() - 1024 {
            assert!(
                (rebuilt[i] - signal[i]).abs() < 1e-3,
                "sample {} diverged: {} vs {}",
                i,
                rebuilt[i],
                signal[i]
            );
        }
    }

    #[test]
    fn test_overlay_keeps_uncovered_tail() {
        let original = vec![1.0f32; 10];
        let processed = vec![0.0f32; 6];
        let merged = overlay(&original, &processed);
        assert_eq!(&merged[..6], &[0.0; 6]);
        assert_eq!(&merged[6..], &[1.0; 4]);
    }
}

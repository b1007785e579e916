//! Mono waveform value type.

/// A mono waveform: samples plus the rate they were captured at.
///
/// Samples are typically normalized to [-1, 1] but nothing here assumes it.
/// Stages never mutate a waveform in place; each one returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude.
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}

/// RMS energy of a frame
pub(crate) fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak() {
        let wave = Waveform::new(vec![0.1, -0.7, 0.3], 22050);
        assert!((wave.peak() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_duration() {
        let wave = Waveform::new(vec![0.0; 22050], 22050);
        assert!((wave.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rms_empty() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_constant() {
        let frame = vec![0.5f32; 128];
        assert!((rms(&frame) - 0.5).abs() < 1e-6);
    }
}

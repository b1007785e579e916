//! Leading/trailing silence removal
//!
//! Frame-energy scan from both ends: frames whose RMS falls more than a
//! threshold below the loudest frame are near-silence and get cut.

use crate::waveform::{rms, Waveform};

/// Analysis frame length in samples.
const FRAME_LENGTH: usize = 2048;
/// Hop between analysis frames.
const HOP_LENGTH: usize = 512;

/// Remove near-silent regions from both ends of the waveform.
///
/// `threshold_db` is positive: a frame counts as silence when its RMS is
/// more than `threshold_db` dB below the loudest frame. Returns an empty
/// waveform when every frame is below the threshold. Trimming an already
/// trimmed waveform with the same threshold is a no-op.
pub fn trim_silence(waveform: &Waveform, threshold_db: f32) -> Waveform {
    let samples = &waveform.samples;
    if samples.is_empty() {
        return waveform.clone();
    }

    // Per-frame RMS, including a final partial frame so a loud tail is
    // never misclassified as silence.
    let mut energies: Vec<f32> = Vec::new();
    let mut pos = 0;
    loop {
        let end = (pos + FRAME_LENGTH).min(samples.len());
        energies.push(rms(&samples[pos..end]));
        if end == samples.len() {
            break;
        }
        pos += HOP_LENGTH;
    }

    let peak = energies.iter().fold(0.0f32, |acc, &e| acc.max(e));
    if peak <= 0.0 {
        return Waveform::new(Vec::new(), waveform.sample_rate);
    }
    let floor = peak * 10.0f32.powf(-threshold_db / 20.0);

    let first = energies.iter().position(|&e| e > floor);
    let last = energies.iter().rposition(|&e| e > floor);
    let (Some(first), Some(last)) = (first, last) else {
        return Waveform::new(Vec::new(), waveform.sample_rate);
    };

    let start = first * HOP_LENGTH;
    let end = (last * HOP_LENGTH + FRAME_LENGTH).min(samples.len());
    Waveform::new(samples[start..end].to_vec(), waveform.sample_rate)
}

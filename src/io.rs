//! Audio file decode/encode collaborators
//!
//! Decodes any symphonia-supported container to a mono waveform, resamples
//! to a target rate when asked, and writes processed results as 32-bit
//! float WAV. The processing stages themselves never touch the filesystem.

use std::fs::File;
use std::path::Path;

use hound::{WavSpec, WavWriter};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::EnhanceError;
use crate::waveform::Waveform;

/// Decode an audio file to a mono waveform.
///
/// Multi-channel sources are downmixed by channel mean. When
/// `target_sample_rate` is given and differs from the source rate, the
/// result is resampled.
pub fn load_audio(path: &Path, target_sample_rate: Option<u32>) -> Result<Waveform, EnhanceError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| EnhanceError::Decode(format!("failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| EnhanceError::Decode("no audio tracks found".to_string()))?;

    let track_id = track.id;
    let source_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| EnhanceError::Decode(format!("failed to create decoder: {}", e)))?;

    let mut mono_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(_) => continue,
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // Mix to mono
        for chunk in sample_buf.samples().chunks(channels) {
            mono_samples.push(chunk.iter().sum::<f32>() / channels as f32);
        }
    }

    if mono_samples.is_empty() {
        return Err(EnhanceError::EmptySignal(
            "decoded stream produced no samples".to_string(),
        ));
    }

    match target_sample_rate {
        Some(target) if target != source_rate => {
            log::info!("resampling {} Hz -> {} Hz", source_rate, target);
            let resampled = resample(&mono_samples, source_rate, target)?;
            Ok(Waveform::new(resampled, target))
        }
        _ => Ok(Waveform::new(mono_samples, source_rate)),
    }
}

/// Resample a mono buffer in one pass.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, EnhanceError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| EnhanceError::Resample(format!("failed to create resampler: {}", e)))?;

    let input = vec![samples.to_vec()];
    let resampled = resampler
        .process(&input, None)
        .map_err(|e| EnhanceError::Resample(format!("{}", e)))?;

    Ok(resampled.into_iter().next().unwrap_or_default())
}

/// Write a waveform as 32-bit float mono WAV.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<(), EnhanceError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in &waveform.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, sample_rate: u32) -> Waveform {
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();
        Waveform::new(samples, sample_rate)
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let wave = tone(22050, 22050);
        write_wav(&path, &wave).unwrap();

        let loaded = load_audio(&path, None).unwrap();
        assert_eq!(loaded.sample_rate, 22050);
        assert_eq!(loaded.samples.len(), wave.samples.len());
        for (a, b) in loaded.samples.iter().zip(&wave.samples) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_with_resample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone44k.wav");

        write_wav(&path, &tone(44100, 44100)).unwrap();

        let loaded = load_audio(&path, Some(22050)).unwrap();
        assert_eq!(loaded.sample_rate, 22050);
        // Half the rate: roughly half the samples (resampler edge slack)
        let expected = 22050usize;
        assert!(
            loaded.samples.len().abs_diff(expected) < 1024,
            "unexpected resampled length {}",
            loaded.samples.len()
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_audio(Path::new("/nonexistent/missing.wav"), None).unwrap_err();
        assert!(matches!(err, EnhanceError::Io(_)));
    }
}

//! WAV file reading and writing for offline rendering.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample. 32 writes IEEE float, anything else integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file as mono f32 along with its spec.
///
/// Multi-channel files are mixed down by averaging channels. No resampling
/// or normalization happens here; use [`decode_file`](crate::decode_file)
/// for the full ingestion pipeline.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec))
}

/// Write mono samples to a WAV file, duplicating them to every channel of
/// `spec`.
///
/// Integer formats clamp to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let hound_spec = hound::WavSpec::from(spec);
    let mut writer = WavWriter::create(path, hound_spec)?;
    let channels = spec.channels.max(1);

    if spec.bits_per_sample == 32 {
        for &sample in samples {
            for _ in 0..channels {
                writer.write_sample(sample)?;
            }
        }
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            for _ in 0..channels {
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    tracing::debug!(frames = samples.len(), ?spec, "wrote wav");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_int16_clamps() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };
        write_wav(file.path(), &[2.0, -2.0, 0.5], spec).unwrap();
        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.bits_per_sample, 16);
        assert!((loaded[0] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(loaded[1], -1.0);
        assert!((loaded[2] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_stereo_write_reads_back_mono() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            ..WavSpec::default()
        };
        write_wav(file.path(), &[0.25, -0.75], spec).unwrap();
        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.channels, 2);
        assert_eq!(loaded, vec![0.25, -0.75]);
    }
}

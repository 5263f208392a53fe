//! Audio ingestion: any supported container to mono f32 at the working rate.
//!
//! The pipeline is probe, decode, downmix, resample and normalize:
//!
//! 1. symphonia probes the container; the first track with a real codec is
//!    the audio track.
//! 2. Every packet of that track is decoded to interleaved f32. Corrupt
//!    packets are skipped with a warning.
//! 3. Frames are averaged down to mono.
//! 4. [`resample_linear`] brings the samples to the working rate.
//! 5. [`normalize_peak`] scales non-silent audio to a 0.9 peak.
//!
//! A failure at any step returns a [`DecodeError`]; callers keep whatever
//! buffer they had before.

use crate::resample::{NORMALIZE_PEAK, normalize_peak, resample_linear};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Why a decode attempt produced no buffer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The container holds no decodable audio track.
    #[error("no audio track found")]
    NoAudioTrack,

    /// The container or codec is not supported, or the stream is malformed.
    #[error("codec unavailable: {0}")]
    CodecUnavailable(String),

    /// Reading the source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SymphoniaError> for DecodeError {
    fn from(err: SymphoniaError) -> Self {
        match err {
            SymphoniaError::IoError(e) => DecodeError::Io(e),
            other => DecodeError::CodecUnavailable(other.to_string()),
        }
    }
}

/// Mono audio at the source's native rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples, channels averaged.
    pub samples: Vec<f32>,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source before downmix.
    pub source_channels: usize,
}

impl DecodedAudio {
    /// Decode an in-memory file.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        Self::from_source(Box::new(Cursor::new(bytes)), None)
    }

    /// Decode a file on disk, using its extension as a format hint.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let extension = path.extension().and_then(|e| e.to_str());
        Self::from_source(Box::new(file), extension)
    }

    /// Decode any symphonia media source.
    pub fn from_source(
        source: Box<dyn MediaSource>,
        extension: Option<&str>,
    ) -> Result<Self, DecodeError> {
        let mss = MediaSourceStream::new(source, Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::CodecUnavailable("unknown sample rate".to_string()))?;
        let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut samples = Vec::new();
        let mut source_channels = 1;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    tracing::warn!(reason, "skipping corrupt packet");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count().max(1);
            let frames = decoded.capacity();
            if sample_buf
                .as_ref()
                .is_none_or(|buf| buf.capacity() < frames * channels)
            {
                sample_buf = Some(SampleBuffer::<f32>::new(frames as u64, spec));
            }
            let Some(buf) = sample_buf.as_mut() else {
                continue;
            };
            buf.copy_interleaved_ref(decoded);

            source_channels = channels;
            samples.extend(
                buf.samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        tracing::debug!(
            frames = samples.len(),
            sample_rate,
            channels = source_channels,
            "decoded audio"
        );

        Ok(Self {
            samples,
            sample_rate,
            source_channels,
        })
    }

    /// Duration in seconds at the native rate.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate.max(1) as f64
    }

    /// Resample to `target_rate` and normalize to the standard peak.
    pub fn into_working_rate(self, target_rate: u32) -> Vec<f32> {
        let mut samples = if self.sample_rate == target_rate {
            self.samples
        } else {
            resample_linear(&self.samples, self.sample_rate, target_rate)
        };
        normalize_peak(&mut samples, NORMALIZE_PEAK);
        samples
    }
}

/// Decode an in-memory file to mono at `target_rate`, peak 0.9.
pub fn decode_bytes(bytes: Vec<u8>, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    Ok(DecodedAudio::from_bytes(bytes)?.into_working_rate(target_rate))
}

/// Decode a file on disk to mono at `target_rate`, peak 0.9.
pub fn decode_file<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    Ok(DecodedAudio::from_file(path)?.into_working_rate(target_rate))
}

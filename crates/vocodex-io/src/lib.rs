//! Audio I/O layer for the vocodex vocoder.
//!
//! This crate provides:
//!
//! - **Ingestion**: [`decode_bytes`] and [`decode_file`] turn any supported
//!   container into mono f32 at the working rate, peak-normalized to 0.9
//! - **Resampling**: [`resample_linear`] and [`normalize_peak`]
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for offline rendering
//! - **Devices**: the [`AudioBackend`](backend::AudioBackend) trait with a cpal
//!   implementation and a [`MockBackend`](mock::MockBackend) for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vocodex_io::{decode_file, write_wav, WavSpec};
//!
//! // Any supported format, resampled to 48 kHz
//! let voice = decode_file("voice.mp3", 48000)?;
//! write_wav("voice.wav", &voice, WavSpec::default())?;
//! ```

pub mod backend;
pub mod cpal_backend;
pub mod decode;
pub mod mock;
pub mod resample;
mod stream;
mod wav;

pub use decode::{DecodeError, DecodedAudio, decode_bytes, decode_file};
pub use resample::{NORMALIZE_PEAK, normalize_peak, resample_linear};
pub use stream::{AudioDevice, default_device, list_devices};
pub use wav::{WavSpec, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Compressed audio could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The platform refused access to the device.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

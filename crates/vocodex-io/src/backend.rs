//! Pluggable audio backend abstraction.
//!
//! [`AudioBackend`] decouples the vocoder engine from any specific platform
//! audio API. The engine asks a backend for one output stream (the vocoded
//! bus) and, while the microphone is open, one input stream. Two
//! implementations ship with the crate:
//!
//! - [`CpalBackend`](crate::cpal_backend::CpalBackend) for ALSA, CoreAudio,
//!   WASAPI and AAudio
//! - [`MockBackend`](crate::mock::MockBackend), a deterministic stand-in so
//!   lifecycle and capture-failure paths run without hardware
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │          VocoderEngine           │
//! └──────────────┬───────────────────┘
//!                │ Box<dyn AudioBackend>
//!                ▼
//! ┌──────────────────────────────────┐
//! │        AudioBackend trait        │
//! │  list_devices / build_streams    │
//! └──────────────┬───────────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │ CpalBackend │  │ MockBackend │
//! └─────────────┘  └─────────────┘
//! ```
//!
//! Callbacks are boxed closures so the trait stays object-safe, and streams
//! come back as a type-erased [`StreamHandle`] that stops the stream when
//! dropped.

use crate::{AudioDevice, Result};

/// Configuration for building an audio stream.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Optional device name filter (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is active while this handle exists; dropping it stops
/// playback or capture.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback, run on the real-time thread.
///
/// Receives an interleaved buffer (`[L0, R0, L1, R1, ...]` for stereo) of
/// `frames * channels` samples to fill. Must not allocate, block or do I/O.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Audio input callback, run on the real-time thread with interleaved
/// captured samples.
pub type InputCallback = Box<dyn FnMut(&[f32]) + Send>;

/// Called with a human-readable message when a running stream fails.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio backend.
///
/// Object-safe so the engine can hold a `Box<dyn AudioBackend>` and tests
/// can swap in a mock.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g. "cpal", "mock").
    fn name(&self) -> &str;

    /// List all available audio devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Get the default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Get the default input device, if any.
    fn default_input_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Build and start an input stream.
    ///
    /// Fails with [`Error::PermissionDenied`](crate::Error::PermissionDenied)
    /// when the platform refuses microphone access and with
    /// [`Error::NoDevice`](crate::Error::NoDevice) when there is nothing to
    /// capture from.
    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// The sample rate the backend will actually run `config` at.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BackendStreamConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.channels, 2);
        assert!(config.device_name.is_none());
    }

    #[test]
    fn test_stream_handle_debug() {
        let handle = StreamHandle::new(42u32);
        let debug_str = format!("{:?}", handle);
        assert!(debug_str.contains("StreamHandle"));
    }
}

//! Deterministic in-process backend.
//!
//! [`MockBackend`] never touches hardware. Building a stream stores its
//! callback; the test then drives it by hand with
//! [`pull_output`](MockBackend::pull_output) and
//! [`push_input`](MockBackend::push_input). Failures can be scripted per
//! direction to exercise the engine's error paths.
//!
//! Clones share state, so a test can hand one clone to the engine and keep
//! another to drive the streams.
//!
//! ```rust
//! use vocodex_io::backend::{AudioBackend, BackendStreamConfig};
//! use vocodex_io::mock::MockBackend;
//!
//! let backend = MockBackend::new();
//! let handle = backend
//!     .build_output_stream(
//!         &BackendStreamConfig::default(),
//!         Box::new(|buf: &mut [f32]| buf.fill(0.25)),
//!         Box::new(|_| {}),
//!     )
//!     .unwrap();
//! assert_eq!(backend.pull_output(4), Some(vec![0.25; 4]));
//! drop(handle);
//! assert_eq!(backend.pull_output(4), None);
//! ```

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle,
};
use crate::{AudioDevice, Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// A failure to report from the next stream build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Report [`Error::NoDevice`].
    NoDevice,
    /// Report [`Error::PermissionDenied`].
    PermissionDenied,
    /// Report [`Error::Stream`] with this message.
    Stream(String),
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            MockFailure::NoDevice => Error::NoDevice,
            MockFailure::PermissionDenied => {
                Error::PermissionDenied("microphone access refused".to_string())
            }
            MockFailure::Stream(msg) => Error::Stream(msg.clone()),
        }
    }
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    output: Option<(u64, OutputCallback)>,
    input: Option<(u64, InputCallback)>,
    output_config: Option<BackendStreamConfig>,
    input_config: Option<BackendStreamConfig>,
    output_failure: Option<MockFailure>,
    input_failure: Option<MockFailure>,
    output_builds: usize,
    input_builds: usize,
}

/// Hardware-free [`AudioBackend`] for tests.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockBackend")
            .field("output_active", &state.output.is_some())
            .field("input_active", &state.input.is_some())
            .finish()
    }
}

/// Clears the stored callback when the owning [`StreamHandle`] drops.
struct MockStreamGuard {
    state: Arc<Mutex<MockState>>,
    id: u64,
    is_input: bool,
}

impl Drop for MockStreamGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if self.is_input {
            if state.input.as_ref().is_some_and(|(id, _)| *id == self.id) {
                state.input = None;
            }
        } else if state.output.as_ref().is_some_and(|(id, _)| *id == self.id) {
            state.output = None;
        }
    }
}

impl MockBackend {
    /// Create a backend whose streams always build.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following output build fail, or succeed again with `None`.
    pub fn fail_output(&self, failure: Option<MockFailure>) {
        self.state.lock().output_failure = failure;
    }

    /// Make every following input build fail, or succeed again with `None`.
    pub fn fail_input(&self, failure: Option<MockFailure>) {
        self.state.lock().input_failure = failure;
    }

    /// Run the live output callback for `len` interleaved samples.
    ///
    /// Returns `None` when no output stream is open.
    pub fn pull_output(&self, len: usize) -> Option<Vec<f32>> {
        let mut state = self.state.lock();
        let (_, callback) = state.output.as_mut()?;
        let mut buffer = vec![0.0; len];
        callback(&mut buffer);
        Some(buffer)
    }

    /// Feed interleaved samples to the live input callback.
    ///
    /// Returns `false` when no input stream is open.
    pub fn push_input(&self, samples: &[f32]) -> bool {
        let mut state = self.state.lock();
        match state.input.as_mut() {
            Some((_, callback)) => {
                callback(samples);
                true
            }
            None => false,
        }
    }

    /// Whether an output stream is currently open.
    pub fn has_output_stream(&self) -> bool {
        self.state.lock().output.is_some()
    }

    /// Whether an input stream is currently open.
    pub fn has_input_stream(&self) -> bool {
        self.state.lock().input.is_some()
    }

    /// Config of the most recent successful output build.
    pub fn output_config(&self) -> Option<BackendStreamConfig> {
        self.state.lock().output_config.clone()
    }

    /// Config of the most recent successful input build.
    pub fn input_config(&self) -> Option<BackendStreamConfig> {
        self.state.lock().input_config.clone()
    }

    /// Number of output build attempts, failed ones included.
    pub fn output_builds(&self) -> usize {
        self.state.lock().output_builds
    }

    /// Number of input build attempts, failed ones included.
    pub fn input_builds(&self) -> usize {
        self.state.lock().input_builds
    }

    fn mock_device(is_input: bool) -> AudioDevice {
        AudioDevice {
            name: if is_input { "Mock Input" } else { "Mock Output" }.to_string(),
            is_input,
            is_output: !is_input,
            default_sample_rate: 48000,
        }
    }
}

impl AudioBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(vec![Self::mock_device(true), Self::mock_device(false)])
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(Some(Self::mock_device(false)))
    }

    fn default_input_device(&self) -> Result<Option<AudioDevice>> {
        Ok(Some(Self::mock_device(true)))
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let mut state = self.state.lock();
        state.output_builds += 1;
        if let Some(failure) = &state.output_failure {
            return Err(failure.to_error());
        }
        state.next_id += 1;
        let id = state.next_id;
        state.output = Some((id, callback));
        state.output_config = Some(config.clone());
        tracing::debug!(id, "mock output stream opened");

        Ok(StreamHandle::new(MockStreamGuard {
            state: Arc::clone(&self.state),
            id,
            is_input: false,
        }))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        _error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let mut state = self.state.lock();
        state.input_builds += 1;
        if let Some(failure) = &state.input_failure {
            return Err(failure.to_error());
        }
        state.next_id += 1;
        let id = state.next_id;
        state.input = Some((id, callback));
        state.input_config = Some(config.clone());
        tracing::debug!(id, "mock input stream opened");

        Ok(StreamHandle::new(MockStreamGuard {
            state: Arc::clone(&self.state),
            id,
            is_input: true,
        }))
    }
}

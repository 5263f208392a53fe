//! The engine handle: lifecycle, devices and the control surface.
//!
//! [`VocoderEngine`] is what an application holds. It owns the audio
//! backend, the parameter mapper and, once created, the processor and its
//! streams.
//!
//! ```text
//!            create()             start()
//! Uninitialized ──────▶ Suspended ──────▶ Running
//!       ▲                 │   ▲              │
//!       └─── destroy() ───┘   └─── stop() ───┘
//! ```
//!
//! Control calls made before `create()` are ignored, so a UI can wire its
//! callbacks before the engine exists.

use crate::command::Command;
use crate::error::{CaptureError, RenderError};
use crate::meter::{MeterReader, SCOPE_LEN};
use crate::params::{ParamTarget, ParameterMapper, ParameterSet, Waveform};
use crate::processor::{ProcessorControl, VocoderProcessor};
use crate::source::{ModulatorSource, SourceCommand, SourceSelection};
use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use vocodex_config::{ConfigError, EngineConfig};
use vocodex_io::backend::{
    AudioBackend, BackendStreamConfig, InputCallback, OutputCallback, StreamHandle,
};
use vocodex_io::cpal_backend::CpalBackend;
use vocodex_io::{DecodeError, NORMALIZE_PEAK, decode_file, normalize_peak};

/// Capacity of the live input queue in samples.
const INPUT_QUEUE_LEN: usize = 16384;

/// Lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing allocated.
    #[default]
    Uninitialized,
    /// Processor built, no output stream.
    Suspended,
    /// Output stream running.
    Running,
}

/// Everything that exists between `create()` and `destroy()`.
struct Runtime {
    processor: Arc<Mutex<VocoderProcessor>>,
    control: ProcessorControl,
    input_tx: Sender<f32>,
    input_rx: Receiver<f32>,
    output_stream: Option<StreamHandle>,
    input_stream: Option<StreamHandle>,
    recording: bool,
    latency: usize,
}

impl Runtime {
    /// Drop queued input and prime one block of silence, so the next output
    /// callback hears the newest capture with no backlog ahead of it.
    fn reset_input_queue(&self, block: usize) {
        while self.input_rx.try_recv().is_ok() {}
        for _ in 0..block {
            let _ = self.input_tx.try_send(0.0);
        }
    }
}

/// A channel vocoder bound to an audio backend.
///
/// # Example
///
/// ```rust
/// use vocodex_config::EngineConfig;
/// use vocodex_engine::{EngineState, VocoderEngine};
/// use vocodex_io::mock::MockBackend;
///
/// let mut engine = VocoderEngine::new(EngineConfig::default(), Box::new(MockBackend::new()))?;
/// engine.create();
/// assert!(engine.start());
/// engine.update_pad(0.25, 0.5);
/// assert_eq!(engine.state(), EngineState::Running);
/// engine.destroy();
/// # Ok::<(), vocodex_config::ConfigError>(())
/// ```
pub struct VocoderEngine {
    config: EngineConfig,
    backend: Box<dyn AudioBackend>,
    mapper: ParameterMapper,
    noise_threshold: f32,
    state: EngineState,
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for VocoderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocoderEngine")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("params", self.mapper.params())
            .finish_non_exhaustive()
    }
}

impl VocoderEngine {
    /// Engine over `backend`. Fails if `config` does not validate.
    pub fn new(config: EngineConfig, backend: Box<dyn AudioBackend>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            noise_threshold: config.gain.noise_threshold,
            config,
            backend,
            mapper: ParameterMapper::new(),
            state: EngineState::Uninitialized,
            runtime: None,
        })
    }

    /// Engine on the system audio devices.
    pub fn with_cpal(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::new(config, Box::new(CpalBackend::new()))
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the audio backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    // --- lifecycle ---

    /// Build the processor. Moves Uninitialized to Suspended; otherwise a
    /// no-op.
    pub fn create(&mut self) {
        if self.state != EngineState::Uninitialized {
            tracing::debug!(state = ?self.state, "create() ignored");
            return;
        }
        let (processor, control) = VocoderProcessor::new(&self.config);
        control.params.store(self.mapper.params());
        control.params.set_noise_threshold(self.noise_threshold);
        let (input_tx, input_rx) = bounded(INPUT_QUEUE_LEN);
        let latency = processor.latency_samples();

        self.runtime = Some(Runtime {
            processor: Arc::new(Mutex::new(processor)),
            control,
            input_tx,
            input_rx,
            output_stream: None,
            input_stream: None,
            recording: false,
            latency,
        });
        self.state = EngineState::Suspended;
        tracing::info!(
            sample_rate = self.config.engine.sample_rate,
            bands = self.config.bands.frequencies.len(),
            backend = self.backend.name(),
            "engine created"
        );
    }

    /// Open the output stream. Returns whether the engine is running.
    ///
    /// On failure the engine stays suspended.
    pub fn start(&mut self) -> bool {
        match self.state {
            EngineState::Uninitialized => {
                tracing::debug!("start() before create() ignored");
                return false;
            }
            EngineState::Running => return true,
            EngineState::Suspended => {}
        }

        let stream_config = self.output_stream_config();
        let actual_rate = self.backend.actual_sample_rate(&stream_config);
        if actual_rate != stream_config.sample_rate {
            tracing::warn!(
                requested = stream_config.sample_rate,
                actual = actual_rate,
                "output device runs at a different rate; pitch will be off"
            );
        }
        let block = self.config.engine.block_size;
        let Some(rt) = self.runtime.as_mut() else {
            return false;
        };

        // capture may have queued input while suspended
        rt.reset_input_queue(block);
        let callback = output_callback(
            Arc::clone(&rt.processor),
            rt.input_rx.clone(),
            stream_config.channels.max(1) as usize,
            stream_config.buffer_size as usize,
        );
        let error_callback = Box::new(|msg: &str| tracing::warn!(msg, "output stream error"));

        match self
            .backend
            .build_output_stream(&stream_config, callback, error_callback)
        {
            Ok(handle) => {
                rt.output_stream = Some(handle);
                self.state = EngineState::Running;
                tracing::info!(
                    buffer_size = stream_config.buffer_size,
                    channels = stream_config.channels,
                    "engine started"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to open output stream");
                false
            }
        }
    }

    /// Close the output stream. Processor state is kept for the next
    /// `start()`.
    pub fn stop(&mut self) {
        if self.state != EngineState::Running {
            tracing::debug!(state = ?self.state, "stop() ignored");
            return;
        }
        if let Some(rt) = self.runtime.as_mut() {
            rt.output_stream = None;
        }
        self.state = EngineState::Suspended;
        tracing::info!("engine stopped");
    }

    /// Drop every stream, the processor and all loaded buffers. Parameters
    /// are kept.
    pub fn destroy(&mut self) {
        if let Some(mut rt) = self.runtime.take() {
            rt.output_stream = None;
            rt.input_stream = None;
            tracing::info!("engine destroyed");
        }
        self.state = EngineState::Uninitialized;
    }

    // --- parameters ---

    fn update_params(&mut self, change: impl FnOnce(&mut ParameterMapper)) {
        let Some(rt) = self.runtime.as_ref() else {
            tracing::debug!("parameter change before create() ignored");
            return;
        };
        change(&mut self.mapper);
        rt.control.params.store(self.mapper.params());
    }

    /// Set carrier pitch in Hz, clamped to 50..400.
    pub fn set_pitch(&mut self, hz: f32) {
        self.update_params(|m| m.params_mut().set_pitch_hz(hz));
    }

    /// Set intensity, clamped to 0.2..3.0.
    pub fn set_intensity(&mut self, ratio: f32) {
        self.update_params(|m| m.params_mut().set_intensity(ratio));
    }

    /// Set vibrato depth in `[0, 1]`.
    pub fn set_vibrato(&mut self, depth: f32) {
        self.update_params(|m| m.params_mut().set_vibrato(depth));
    }

    /// Set tremolo depth in `[0, 1]`.
    pub fn set_tremolo(&mut self, depth: f32) {
        self.update_params(|m| m.params_mut().set_tremolo(depth));
    }

    /// Set echo amount in `[0, 1]`; 1 is the maximum feedback of 0.7.
    pub fn set_echo(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        self.update_params(|m| m.params_mut().set_echo(ParamTarget::Echo.map(amount)));
    }

    /// Select the carrier waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.update_params(|m| m.params_mut().set_waveform(waveform));
    }

    /// Set the gate threshold, clamped to `[0, 1]`.
    pub fn set_noise_threshold(&mut self, threshold: f32) {
        let Some(rt) = self.runtime.as_ref() else {
            tracing::debug!("noise threshold change before create() ignored");
            return;
        };
        if threshold.is_finite() {
            self.noise_threshold = threshold.clamp(0.0, 1.0);
            rt.control.params.set_noise_threshold(self.noise_threshold);
        }
    }

    /// Rebind the pad axes.
    pub fn set_axis_params(&mut self, x: ParamTarget, y: ParamTarget) {
        self.update_params(|m| m.set_axis_params(x, y));
    }

    /// Apply a pad position.
    pub fn update_pad(&mut self, x: f32, y: f32) {
        self.update_params(|m| m.update_pad(x, y));
    }

    /// Zero vibrato, echo and tremolo and re-center the pad.
    pub fn reset_params(&mut self) {
        self.update_params(ParameterMapper::reset);
    }

    /// Current parameters.
    pub fn params(&self) -> ParameterSet {
        *self.mapper.params()
    }

    /// Current pad axis bindings.
    pub fn axis_params(&self) -> (ParamTarget, ParamTarget) {
        self.mapper.axis_params()
    }

    /// Apply one queued UI command.
    pub fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "apply");
        match command {
            Command::SetPitch(hz) => self.set_pitch(hz),
            Command::SetIntensity(ratio) => self.set_intensity(ratio),
            Command::SetVibrato(v) => self.set_vibrato(v),
            Command::SetTremolo(v) => self.set_tremolo(v),
            Command::SetEcho(v) => self.set_echo(v),
            Command::SetWaveform(w) => self.set_waveform(w),
            Command::SetNoiseThreshold(v) => self.set_noise_threshold(v),
            Command::SetAxisParams { x, y } => self.set_axis_params(x, y),
            Command::UpdatePad { x, y } => self.update_pad(x, y),
            Command::ResetParams => self.reset_params(),
            Command::SetSource(source) => self.set_source(source),
            Command::SetFilePlaying(playing) => self.set_file_playing(playing),
            Command::SetFileLooping(looping) => self.set_file_looping(looping),
            Command::ResetFileIndex => self.reset_file_index(),
            Command::StartRecording => self.start_recording(),
            Command::StopRecording => self.stop_recording(),
        }
    }

    // --- sources ---

    fn send(&self, command: SourceCommand) -> bool {
        match self.runtime.as_ref() {
            Some(rt) => {
                rt.control.send(command);
                true
            }
            None => {
                tracing::debug!(?command, "source command before create() ignored");
                false
            }
        }
    }

    /// Select the modulator source.
    pub fn set_source(&mut self, source: ModulatorSource) {
        self.send(SourceCommand::SetSource(source));
    }

    /// Start or pause file playback.
    pub fn set_file_playing(&mut self, playing: bool) {
        self.send(SourceCommand::SetFilePlaying(playing));
    }

    /// Loop file playback (the default), or stop and rewind at the end.
    pub fn set_file_looping(&mut self, looping: bool) {
        self.send(SourceCommand::SetFileLooping(looping));
    }

    /// Rewind file playback.
    pub fn reset_file_index(&mut self) {
        self.send(SourceCommand::ResetFilePosition);
    }

    /// Publish working-rate samples as the modulator, select the file source
    /// and start playback.
    ///
    /// The samples are normalized to the standard peak first.
    pub fn load_modulator_data(&mut self, mut samples: Vec<f32>) {
        if self.runtime.is_none() {
            tracing::debug!("modulator load before create() ignored");
            return;
        }
        normalize_peak(&mut samples, NORMALIZE_PEAK);
        tracing::info!(samples = samples.len(), "modulator loaded");
        self.send(SourceCommand::LoadModulator(Arc::from(samples)));
        self.send(SourceCommand::SetSource(ModulatorSource::File));
        self.send(SourceCommand::SetFilePlaying(true));
    }

    /// Publish working-rate samples as the carrier file. Takes effect while
    /// the waveform is [`Waveform::ExternalCarrier`].
    pub fn load_carrier_data(&mut self, mut samples: Vec<f32>) {
        if self.runtime.is_none() {
            tracing::debug!("carrier load before create() ignored");
            return;
        }
        normalize_peak(&mut samples, NORMALIZE_PEAK);
        tracing::info!(samples = samples.len(), "carrier loaded");
        self.send(SourceCommand::LoadCarrier(Arc::from(samples)));
    }

    /// Decode a file and load it as the modulator.
    ///
    /// On error the previous modulator stays in place.
    pub fn load_modulator_file(&mut self, path: impl AsRef<Path>) -> Result<(), DecodeError> {
        if self.runtime.is_none() {
            tracing::debug!("modulator load before create() ignored");
            return Ok(());
        }
        let samples = decode_file(path, self.config.engine.sample_rate)?;
        self.load_modulator_data(samples);
        Ok(())
    }

    /// Decode a file and load it as the carrier.
    ///
    /// On error the previous carrier stays in place.
    pub fn load_carrier_file(&mut self, path: impl AsRef<Path>) -> Result<(), DecodeError> {
        if self.runtime.is_none() {
            tracing::debug!("carrier load before create() ignored");
            return Ok(());
        }
        let samples = decode_file(path, self.config.engine.sample_rate)?;
        self.load_carrier_data(samples);
        Ok(())
    }

    /// Open the capture device.
    ///
    /// On failure nothing is kept open and the engine state is unchanged.
    pub fn start_capture(&mut self) -> Result<(), CaptureError> {
        let stream_config = self.input_stream_config();
        let block = self.config.engine.block_size;
        let Some(rt) = self.runtime.as_mut() else {
            tracing::debug!("start_capture() before create()");
            return Err(CaptureError::NotReady);
        };
        if rt.input_stream.is_some() {
            return Ok(());
        }

        let callback = input_callback(
            rt.input_tx.clone(),
            stream_config.channels.max(1) as usize,
        );
        let error_callback = Box::new(|msg: &str| tracing::warn!(msg, "input stream error"));
        let handle = self
            .backend
            .build_input_stream(&stream_config, callback, error_callback)
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to open capture device");
                CaptureError::from(e)
            })?;

        rt.reset_input_queue(block);
        rt.input_stream = Some(handle);
        tracing::info!(channels = stream_config.channels, "capture started");
        Ok(())
    }

    /// Close the capture device. A recording in progress is finished
    /// first.
    pub fn stop_capture(&mut self) {
        self.stop_recording();
        if let Some(rt) = self.runtime.as_mut()
            && rt.input_stream.take().is_some()
        {
            tracing::info!("capture stopped");
        }
    }

    /// Whether the capture device is open.
    pub fn is_capturing(&self) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(|rt| rt.input_stream.is_some())
    }

    /// Start recording the live input. Ignored unless capture is open.
    pub fn start_recording(&mut self) {
        if !self.is_capturing() {
            tracing::warn!("start_recording() without an open capture device ignored");
            return;
        }
        if self.send(SourceCommand::StartRecording)
            && let Some(rt) = self.runtime.as_mut()
        {
            rt.recording = true;
            tracing::info!("recording started");
        }
    }

    /// Stop recording. A non-empty take becomes the modulator and starts
    /// playing; an empty one is discarded.
    pub fn stop_recording(&mut self) {
        if let Some(rt) = self.runtime.as_mut()
            && rt.recording
        {
            rt.recording = false;
            rt.control.send(SourceCommand::StopRecording);
            tracing::info!("recording stopped");
        }
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.runtime.as_ref().is_some_and(|rt| rt.recording)
    }

    /// Source state as of the last processed tick.
    pub fn source_selection(&self) -> SourceSelection {
        self.runtime
            .as_ref()
            .map(|rt| rt.control.selection())
            .unwrap_or_default()
    }

    // --- telemetry ---

    /// A meter handle for polling from another thread. `None` before
    /// `create()`.
    pub fn meter(&self) -> Option<MeterReader> {
        self.runtime.as_ref().map(|rt| rt.control.meter.clone())
    }

    /// Modulator loudness in `[0, 1]`.
    pub fn vu_level(&self) -> f32 {
        self.runtime
            .as_ref()
            .map_or(0.0, |rt| rt.control.meter.vu_level())
    }

    /// Latest output window, oldest sample first.
    pub fn waveform_data(&self) -> [f32; SCOPE_LEN] {
        self.runtime
            .as_ref()
            .map_or([0.0; SCOPE_LEN], |rt| rt.control.meter.waveform())
    }

    // --- offline ---

    /// Render without a device. Only allowed while suspended.
    ///
    /// `input` is the live input, as in [`VocoderProcessor::process`].
    pub fn render_offline(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), RenderError> {
        match (self.state, self.runtime.as_ref()) {
            (EngineState::Running, _) => Err(RenderError::Running),
            (_, None) => Err(RenderError::NotCreated),
            (_, Some(rt)) => {
                rt.processor.lock().process(input, output);
                Ok(())
            }
        }
    }

    /// Apply pending parameters without smoothing, for an offline render
    /// that should start at its final settings.
    pub fn snap_params(&mut self) -> Result<(), RenderError> {
        match (self.state, self.runtime.as_ref()) {
            (EngineState::Running, _) => Err(RenderError::Running),
            (_, None) => Err(RenderError::NotCreated),
            (_, Some(rt)) => {
                rt.processor.lock().snap_params();
                Ok(())
            }
        }
    }

    /// Output latency of the processor in samples.
    pub fn latency_samples(&self) -> usize {
        self.runtime.as_ref().map_or(0, |rt| rt.latency)
    }

    fn output_stream_config(&self) -> BackendStreamConfig {
        let devices = &self.config.devices;
        BackendStreamConfig {
            sample_rate: self.config.engine.sample_rate,
            buffer_size: devices.buffer_size,
            channels: devices.output_channels,
            device_name: devices.output_device.clone(),
        }
    }

    fn input_stream_config(&self) -> BackendStreamConfig {
        let devices = &self.config.devices;
        BackendStreamConfig {
            sample_rate: self.config.engine.sample_rate,
            buffer_size: devices.buffer_size,
            channels: devices.input_channels,
            device_name: devices.input_device.clone(),
        }
    }
}

impl Drop for VocoderEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Device output callback: pull live input, render mono, fan out to every
/// channel. Writes silence if the control thread holds the processor.
fn output_callback(
    processor: Arc<Mutex<VocoderProcessor>>,
    input_rx: Receiver<f32>,
    channels: usize,
    buffer_size: usize,
) -> OutputCallback {
    let mut live_buf = vec![0.0_f32; buffer_size.max(1)];
    let mut mono_buf = vec![0.0_f32; buffer_size.max(1)];

    Box::new(move |data: &mut [f32]| {
        let frames = data.len() / channels;
        if mono_buf.len() < frames {
            // device gave a larger buffer than requested
            live_buf.resize(frames, 0.0);
            mono_buf.resize(frames, 0.0);
        }
        let live = &mut live_buf[..frames];
        for s in live.iter_mut() {
            *s = input_rx.try_recv().unwrap_or(0.0);
        }

        let mono = &mut mono_buf[..frames];
        match processor.try_lock() {
            Some(mut p) => p.process(live, mono),
            None => mono.fill(0.0),
        }

        for (frame, &s) in data.chunks_mut(channels).zip(mono.iter()) {
            frame.fill(s);
        }
    })
}

/// Device input callback: downmix each frame and queue it, dropping samples
/// when the queue is full.
fn input_callback(input_tx: Sender<f32>, channels: usize) -> InputCallback {
    Box::new(move |data: &[f32]| {
        for frame in data.chunks(channels) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            let _ = input_tx.try_send(mono);
        }
    })
}

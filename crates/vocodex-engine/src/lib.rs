//! Vocodex Engine - real-time channel vocoder
//!
//! The modulator (live voice or a loaded file) is split into bands whose
//! envelopes set the gains of a matching bank on the carrier (an oscillator
//! or a loaded file). The summed bus runs through tremolo, echo and a
//! limiter.
//!
//! - [`VocoderEngine`] - Lifecycle, devices and the control surface
//! - [`VocoderProcessor`] - The signal graph, usable without any device
//! - [`ParameterMapper`] - XY pad and parameter ranges
//! - [`meter`] - Lock-free VU and oscilloscope
//!
//! ## Example
//!
//! ```rust
//! use vocodex_config::EngineConfig;
//! use vocodex_engine::{VocoderProcessor, Waveform};
//!
//! let config = EngineConfig::default();
//! let (mut processor, control) = VocoderProcessor::new(&config);
//! let mut params = control.params.snapshot();
//! params.set_waveform(Waveform::Square);
//! control.params.store(&params);
//!
//! let voice: Vec<f32> = (0..4800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
//! let mut out = vec![0.0; voice.len()];
//! processor.process(&voice, &mut out);
//! assert!(out.iter().all(|s| s.abs() <= 1.0));
//! ```

mod bands;
mod carrier;
mod command;
mod engine;
mod envelope;
mod error;
mod gain;
pub mod meter;
mod params;
mod processor;
mod source;

pub use bands::{BandChannel, BandSpec, FilterBank};
pub use carrier::CarrierGenerator;
pub use command::Command;
pub use engine::{EngineState, VocoderEngine};
pub use envelope::EnvelopeDetector;
pub use error::{CaptureError, RenderError};
pub use gain::BandGainController;
pub use meter::{METER_RATE_HZ, MeterReader, MeterTicker, SCOPE_LEN};
pub use params::{
    AtomicParam, ECHO_RANGE, INTENSITY_RANGE, PITCH_RANGE, ParamTarget, ParameterMapper,
    ParameterSet, SharedParams, TREMOLO_RANGE, VIBRATO_RANGE, Waveform,
};
pub use processor::{ProcessorControl, VocoderProcessor};
pub use source::{
    ModulatorSource, RECORD_RESERVE_SECS, SourceCommand, SourceManager, SourceSelection,
    SourceStatus,
};

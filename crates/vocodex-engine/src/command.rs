//! Discrete control messages.

use crate::params::{ParamTarget, Waveform};
use crate::source::ModulatorSource;

/// One user action, as queued by a UI layer.
///
/// Values need no pre-validation: [`VocoderEngine::apply`](crate::VocoderEngine::apply)
/// clamps numbers into range and ignores non-finite ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Carrier pitch in Hz.
    SetPitch(f32),
    /// Band gain intensity.
    SetIntensity(f32),
    /// Vibrato depth in `[0, 1]`.
    SetVibrato(f32),
    /// Tremolo depth in `[0, 1]`.
    SetTremolo(f32),
    /// Echo amount in `[0, 1]`, scaled to the feedback range.
    SetEcho(f32),
    /// Carrier waveform.
    SetWaveform(Waveform),
    /// Gate threshold in `[0, 1]`.
    SetNoiseThreshold(f32),
    /// Rebind the pad axes.
    SetAxisParams {
        /// Parameter on the X axis.
        x: ParamTarget,
        /// Parameter on the Y axis.
        y: ParamTarget,
    },
    /// Pad position, both in `[0, 1]`.
    UpdatePad {
        /// Horizontal position.
        x: f32,
        /// Vertical position, 0 at the top.
        y: f32,
    },
    /// Zero the effects and re-center the pad.
    ResetParams,
    /// Select the modulator source.
    SetSource(ModulatorSource),
    /// Start or pause file playback.
    SetFilePlaying(bool),
    /// Loop file playback.
    SetFileLooping(bool),
    /// Rewind file playback.
    ResetFileIndex,
    /// Start recording the live input.
    StartRecording,
    /// Stop recording and use the take as the modulator.
    StopRecording,
}

//! Performance parameters and the two-axis pad mapping.
//!
//! The control side owns a [`ParameterMapper`], which keeps the canonical
//! [`ParameterSet`] and publishes it to the audio side through
//! [`SharedParams`]: one lock-free [`AtomicParam`] per value. The processor
//! reads the shared set once per tick and smooths toward it.
//!
//! ```text
//!  pad (x, y) ──▶ ParameterMapper ──▶ ParameterSet ──▶ SharedParams ──▶ processor
//!  set_pitch() ──┘    (clamps)                         (atomics)        (per tick)
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use vocodex_core::Waveshape;

/// Pitch range in Hz.
pub const PITCH_RANGE: (f32, f32) = (50.0, 400.0);
/// Intensity range.
pub const INTENSITY_RANGE: (f32, f32) = (0.2, 3.0);
/// Vibrato depth range.
pub const VIBRATO_RANGE: (f32, f32) = (0.0, 1.0);
/// Tremolo depth range.
pub const TREMOLO_RANGE: (f32, f32) = (0.0, 1.0);
/// Echo feedback range.
pub const ECHO_RANGE: (f32, f32) = (0.0, vocodex_effects::echo::MAX_FEEDBACK);

/// Carrier source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Sawtooth oscillator.
    #[default]
    Saw,
    /// Square oscillator.
    Square,
    /// Triangle oscillator.
    Triangle,
    /// Sine oscillator.
    Sine,
    /// The loaded carrier file, looped. Falls back to the oscillator while
    /// no carrier is loaded.
    ExternalCarrier,
}

impl Waveform {
    /// Every waveform, in index order.
    pub const ALL: [Waveform; 5] = [
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sine,
        Waveform::ExternalCarrier,
    ];

    /// Stable index for atomic storage.
    pub fn index(self) -> u8 {
        match self {
            Waveform::Saw => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::Sine => 3,
            Waveform::ExternalCarrier => 4,
        }
    }

    /// Inverse of [`index`](Self::index). Unknown indices read as `Saw`.
    pub fn from_index(index: u8) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Oscillator shape, or `None` for the external carrier.
    pub fn waveshape(self) -> Option<Waveshape> {
        match self {
            Waveform::Saw => Some(Waveshape::Saw),
            Waveform::Square => Some(Waveshape::Square),
            Waveform::Triangle => Some(Waveshape::Triangle),
            Waveform::Sine => Some(Waveshape::Sine),
            Waveform::ExternalCarrier => None,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sine => "sine",
            Waveform::ExternalCarrier => "external",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "square" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "sine" => Ok(Waveform::Sine),
            "external" | "carrier" => Ok(Waveform::ExternalCarrier),
            other => Err(format!("unknown waveform '{other}'")),
        }
    }
}

/// A parameter the pad axes can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
    /// Carrier pitch, 50..400 Hz.
    Pitch,
    /// Band gain intensity, 0.2..3.0.
    Intensity,
    /// Vibrato depth, 0..1.
    Vibrato,
    /// Echo feedback, 0..0.7.
    Echo,
    /// Tremolo depth, 0..1.
    Tremolo,
}

impl ParamTarget {
    /// `(min, max)` of the physical value.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamTarget::Pitch => PITCH_RANGE,
            ParamTarget::Intensity => INTENSITY_RANGE,
            ParamTarget::Vibrato => VIBRATO_RANGE,
            ParamTarget::Echo => ECHO_RANGE,
            ParamTarget::Tremolo => TREMOLO_RANGE,
        }
    }

    /// Map a control value in `[0, 1]` linearly onto the range.
    #[inline]
    pub fn map(self, v: f32) -> f32 {
        let (min, max) = self.range();
        min + (max - min) * v.clamp(0.0, 1.0)
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ParamTarget::Pitch => "pitch",
            ParamTarget::Intensity => "intensity",
            ParamTarget::Vibrato => "vibrato",
            ParamTarget::Echo => "echo",
            ParamTarget::Tremolo => "tremolo",
        }
    }
}

impl fmt::Display for ParamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pitch" => Ok(ParamTarget::Pitch),
            "intensity" => Ok(ParamTarget::Intensity),
            "vibrato" => Ok(ParamTarget::Vibrato),
            "echo" => Ok(ParamTarget::Echo),
            "tremolo" => Ok(ParamTarget::Tremolo),
            other => Err(format!("unknown parameter '{other}'")),
        }
    }
}

/// The performance parameters. Every setter clamps into range and ignores
/// non-finite input, so the fields are always valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pitch_hz: f32,
    intensity: f32,
    vibrato: f32,
    tremolo: f32,
    echo: f32,
    waveform: Waveform,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            pitch_hz: 140.0,
            intensity: 0.8,
            vibrato: 0.0,
            tremolo: 0.0,
            echo: 0.0,
            waveform: Waveform::Saw,
        }
    }
}

fn clamp_into(field: &mut f32, value: f32, (min, max): (f32, f32)) {
    if value.is_finite() {
        *field = value.clamp(min, max);
    }
}

impl ParameterSet {
    /// Carrier pitch in Hz.
    pub fn pitch_hz(&self) -> f32 {
        self.pitch_hz
    }

    /// Band gain intensity.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Vibrato depth.
    pub fn vibrato(&self) -> f32 {
        self.vibrato
    }

    /// Tremolo depth.
    pub fn tremolo(&self) -> f32 {
        self.tremolo
    }

    /// Echo feedback.
    pub fn echo(&self) -> f32 {
        self.echo
    }

    /// Carrier waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set pitch in Hz.
    pub fn set_pitch_hz(&mut self, hz: f32) {
        clamp_into(&mut self.pitch_hz, hz, PITCH_RANGE);
    }

    /// Set intensity.
    pub fn set_intensity(&mut self, ratio: f32) {
        clamp_into(&mut self.intensity, ratio, INTENSITY_RANGE);
    }

    /// Set vibrato depth.
    pub fn set_vibrato(&mut self, depth: f32) {
        clamp_into(&mut self.vibrato, depth, VIBRATO_RANGE);
    }

    /// Set tremolo depth.
    pub fn set_tremolo(&mut self, depth: f32) {
        clamp_into(&mut self.tremolo, depth, TREMOLO_RANGE);
    }

    /// Set echo feedback.
    pub fn set_echo(&mut self, feedback: f32) {
        clamp_into(&mut self.echo, feedback, ECHO_RANGE);
    }

    /// Set carrier waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Read the value a pad axis drives.
    pub fn get(&self, target: ParamTarget) -> f32 {
        match target {
            ParamTarget::Pitch => self.pitch_hz,
            ParamTarget::Intensity => self.intensity,
            ParamTarget::Vibrato => self.vibrato,
            ParamTarget::Echo => self.echo,
            ParamTarget::Tremolo => self.tremolo,
        }
    }

    /// Write the value a pad axis drives, clamped.
    pub fn set(&mut self, target: ParamTarget, value: f32) {
        match target {
            ParamTarget::Pitch => self.set_pitch_hz(value),
            ParamTarget::Intensity => self.set_intensity(value),
            ParamTarget::Vibrato => self.set_vibrato(value),
            ParamTarget::Echo => self.set_echo(value),
            ParamTarget::Tremolo => self.set_tremolo(value),
        }
    }
}

/// Two-axis pad mapping over a [`ParameterSet`].
///
/// # Example
///
/// ```rust
/// use vocodex_engine::{ParamTarget, ParameterMapper};
///
/// let mut mapper = ParameterMapper::new();
/// mapper.update_pad(0.0, 0.0);
/// assert_eq!(mapper.params().get(ParamTarget::Pitch), 50.0);
/// // pad "up" is y = 0, which maps to the top of the Y range
/// assert_eq!(mapper.params().get(ParamTarget::Intensity), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapper {
    params: ParameterSet,
    x_param: ParamTarget,
    y_param: ParamTarget,
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterMapper {
    /// Default parameters with X bound to pitch and Y to intensity.
    pub fn new() -> Self {
        Self {
            params: ParameterSet::default(),
            x_param: ParamTarget::Pitch,
            y_param: ParamTarget::Intensity,
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Mutable access for direct setters.
    pub fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    /// Parameters bound to the X and Y axes.
    pub fn axis_params(&self) -> (ParamTarget, ParamTarget) {
        (self.x_param, self.y_param)
    }

    /// Rebind both axes. Values are untouched until the next pad update.
    pub fn set_axis_params(&mut self, x: ParamTarget, y: ParamTarget) {
        self.x_param = x;
        self.y_param = y;
    }

    /// Apply a pad position. `x` drives the X parameter, `1 - y` the Y
    /// parameter. Non-finite coordinates are ignored.
    pub fn update_pad(&mut self, x: f32, y: f32) {
        if x.is_finite() {
            self.params.set(self.x_param, self.x_param.map(x));
        }
        if y.is_finite() {
            let inverted = 1.0 - y.clamp(0.0, 1.0);
            self.params.set(self.y_param, self.y_param.map(inverted));
        }
    }

    /// Zero vibrato, echo and tremolo, then replay the pad center.
    ///
    /// What the center produces depends on the current axis bindings.
    pub fn reset(&mut self) {
        self.params.set_vibrato(0.0);
        self.params.set_echo(0.0);
        self.params.set_tremolo(0.0);
        self.update_pad(0.5, 0.5);
    }
}

/// A thread-safe atomic parameter using bit-cast f32.
///
/// Control thread writes, audio thread reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a new atomic parameter with range and default.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: AtomicU32::new(default.to_bits()),
            min,
            max,
            default,
        }
    }

    /// Set the parameter value (control thread).
    #[inline]
    pub fn set(&self, v: f32) {
        if !v.is_finite() {
            return;
        }
        let clamped = v.clamp(self.min, self.max);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Get the parameter value (audio thread).
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Get the minimum value.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Get the maximum value.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Get the default value.
    pub fn default(&self) -> f32 {
        self.default
    }

    /// Reset to default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

impl Clone for AtomicParam {
    fn clone(&self) -> Self {
        Self {
            value: AtomicU32::new(self.value.load(Ordering::Acquire)),
            min: self.min,
            max: self.max,
            default: self.default,
        }
    }
}

/// The audio-side view of the parameters.
///
/// Shared as `Arc<SharedParams>`. The control thread stores a whole
/// [`ParameterSet`] after every change; the processor takes a
/// [`snapshot`](Self::snapshot) at each tick boundary.
#[derive(Debug)]
pub struct SharedParams {
    pitch_hz: AtomicParam,
    intensity: AtomicParam,
    vibrato: AtomicParam,
    tremolo: AtomicParam,
    echo: AtomicParam,
    noise_threshold: AtomicParam,
    waveform: AtomicU8,
}

impl SharedParams {
    /// Shared parameters holding the defaults and `noise_threshold`.
    pub fn new(noise_threshold: f32) -> Self {
        let defaults = ParameterSet::default();
        Self {
            pitch_hz: AtomicParam::new(defaults.pitch_hz, PITCH_RANGE.0, PITCH_RANGE.1),
            intensity: AtomicParam::new(defaults.intensity, INTENSITY_RANGE.0, INTENSITY_RANGE.1),
            vibrato: AtomicParam::new(defaults.vibrato, VIBRATO_RANGE.0, VIBRATO_RANGE.1),
            tremolo: AtomicParam::new(defaults.tremolo, TREMOLO_RANGE.0, TREMOLO_RANGE.1),
            echo: AtomicParam::new(defaults.echo, ECHO_RANGE.0, ECHO_RANGE.1),
            noise_threshold: AtomicParam::new(noise_threshold.clamp(0.0, 1.0), 0.0, 1.0),
            waveform: AtomicU8::new(defaults.waveform.index()),
        }
    }

    /// Publish `params`.
    pub fn store(&self, params: &ParameterSet) {
        self.pitch_hz.set(params.pitch_hz);
        self.intensity.set(params.intensity);
        self.vibrato.set(params.vibrato);
        self.tremolo.set(params.tremolo);
        self.echo.set(params.echo);
        self.waveform
            .store(params.waveform.index(), Ordering::Release);
    }

    /// Read the published parameters.
    pub fn snapshot(&self) -> ParameterSet {
        ParameterSet {
            pitch_hz: self.pitch_hz.get(),
            intensity: self.intensity.get(),
            vibrato: self.vibrato.get(),
            tremolo: self.tremolo.get(),
            echo: self.echo.get(),
            waveform: Waveform::from_index(self.waveform.load(Ordering::Acquire)),
        }
    }

    /// Gate threshold.
    pub fn noise_threshold(&self) -> f32 {
        self.noise_threshold.get()
    }

    /// Set the gate threshold, clamped to `[0, 1]`.
    pub fn set_noise_threshold(&self, threshold: f32) {
        self.noise_threshold.set(threshold);
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(0.05)
    }
}

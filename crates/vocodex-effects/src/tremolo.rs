//! Tremolo on the summed vocoder bus.
//!
//! A sine LFO pulls the gain down from unity by up to `depth`:
//! `gain = 1 - depth * (0.5 + 0.5 * lfo)`. At full depth the bus swings
//! between silence and unity.

use vocodex_core::{Effect, Lfo, SmoothedParam};

/// Depth at or below which the tremolo is bypassed and its LFO holds.
const BYPASS_DEPTH: f32 = 0.001;

/// Sine amplitude modulation.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Effect;
/// use vocodex_effects::Tremolo;
///
/// let mut tremolo = Tremolo::new(48000.0);
/// assert_eq!(tremolo.process(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Tremolo {
    lfo: Lfo,
    depth: SmoothedParam,
    sample_rate: f32,
}

impl Tremolo {
    /// Create a tremolo at 6 Hz with zero depth.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            lfo: Lfo::new(sample_rate, 6.0),
            depth: SmoothedParam::standard(0.0, sample_rate),
            sample_rate,
        }
    }

    /// Set the LFO rate in Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.lfo.set_frequency(rate_hz.clamp(0.1, 20.0));
    }

    /// LFO rate in Hz.
    pub fn rate(&self) -> f32 {
        self.lfo.frequency()
    }

    /// Set modulation depth (0-1), smoothed.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth.set_target(depth.clamp(0.0, 1.0));
    }

    /// Target modulation depth.
    pub fn depth(&self) -> f32 {
        self.depth.target()
    }
}

impl Effect for Tremolo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let depth = self.depth.advance();
        if depth <= BYPASS_DEPTH {
            return input;
        }
        input * (1.0 - depth * self.lfo.next_unipolar())
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        self.depth.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.lfo.reset();
        self.depth.snap_to_target();
    }
}

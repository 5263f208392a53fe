//! Sine low-frequency oscillator.
//!
//! Feeds the carrier's vibrato and the output tremolo.

use core::f32::consts::TAU;
use libm::sinf;

/// Phase-accumulating sine LFO with output in `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Lfo;
///
/// let mut lfo = Lfo::new(48000.0, 5.0);
/// let v = lfo.next();
/// assert!((-1.0..=1.0).contains(&v));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Phase in [0, 1)
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Create an LFO at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Set frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Next bipolar value in `[-1, 1]`.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        let out = sinf(self.phase * TAU);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    /// Next value mapped to `[0, 1]`.
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        self.next() * 0.5 + 0.5
    }

    /// Change sample rate while keeping the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_completes_cycle() {
        let mut lfo = Lfo::new(48000.0, 1.0);
        for _ in 0..48000 {
            lfo.next();
        }
        let phase_error = lfo.phase().min((lfo.phase() - 1.0).abs());
        assert!(phase_error < 0.01);
    }

    #[test]
    fn test_lfo_ranges() {
        let mut lfo = Lfo::new(48000.0, 6.0);
        for _ in 0..20000 {
            let v = lfo.next();
            assert!((-1.0..=1.0).contains(&v));
            let u = lfo.next_unipolar();
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn test_lfo_sample_rate_change_keeps_frequency() {
        let mut lfo = Lfo::new(44100.0, 5.0);
        lfo.set_sample_rate(48000.0);
        assert!((lfo.frequency() - 5.0).abs() < 1e-4);
    }
}

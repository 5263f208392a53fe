//! Audio-rate carrier oscillator with anti-aliasing.
//!
//! Saw and square use 2nd-order PolyBLEP corrections at their step
//! discontinuities. The triangle has no step, only a slope change, and is
//! generated directly from the phase. Sine needs no correction.

use core::f32::consts::TAU;
use libm::sinf;

/// Oscillator waveshape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveshape {
    /// Sawtooth, all harmonics. The classic vocoder carrier.
    #[default]
    Saw,
    /// 50% square, odd harmonics.
    Square,
    /// Triangle, weak odd harmonics.
    Triangle,
    /// Pure sine.
    Sine,
}

/// Band-limited oscillator driven by a phase accumulator.
///
/// # Example
///
/// ```rust
/// use vocodex_core::{Oscillator, Waveshape};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_frequency(140.0);
/// osc.set_waveshape(Waveshape::Saw);
/// let s = osc.advance();
/// assert!(s.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    shape: Waveshape,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a 140 Hz saw oscillator.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 140.0 / sample_rate,
            sample_rate,
            frequency: 140.0,
            shape: Waveshape::Saw,
        }
    }

    /// Set frequency in Hz. Negative values clamp to 0, values above
    /// Nyquist clamp to Nyquist.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.clamp(0.0, self.sample_rate * 0.5);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Select the waveshape. Phase is kept so switching is click-free.
    pub fn set_waveshape(&mut self, shape: Waveshape) {
        self.shape = shape;
    }

    /// Current waveshape.
    pub fn waveshape(&self) -> Waveshape {
        self.shape
    }

    /// Update sample rate and keep frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_frequency(self.frequency);
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the next sample in `[-1, 1]`.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let t = self.phase;
        let dt = self.phase_inc;

        let out = match self.shape {
            Waveshape::Saw => (2.0 * t - 1.0) - poly_blep(t, dt),
            Waveshape::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                let mut falling = t + 0.5;
                if falling >= 1.0 {
                    falling -= 1.0;
                }
                naive + poly_blep(t, dt) - poly_blep(falling, dt)
            }
            Waveshape::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Waveshape::Sine => sinf(t * TAU),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out.clamp(-1.0, 1.0)
    }
}

/// 2nd-order PolyBLEP residual for a unit step at phase 0.
///
/// Non-zero only within one sample of the discontinuity.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if t < dt {
        let n = t / dt;
        n + n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + n + n + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: [Waveshape; 4] = [
        Waveshape::Saw,
        Waveshape::Square,
        Waveshape::Triangle,
        Waveshape::Sine,
    ];

    #[test]
    fn test_output_bounded_for_all_shapes() {
        for shape in SHAPES {
            let mut osc = Oscillator::new(48000.0);
            osc.set_waveshape(shape);
            osc.set_frequency(397.0);
            for _ in 0..48000 {
                let s = osc.advance();
                assert!((-1.0..=1.0).contains(&s), "{shape:?} produced {s}");
            }
        }
    }

    #[test]
    fn test_saw_has_near_zero_mean() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(100.0);
        // exactly 10 periods
        let sum: f32 = (0..4800).map(|_| osc.advance()).sum();
        assert!((sum / 4800.0).abs() < 0.01);
    }

    #[test]
    fn test_frequency_clamped_to_nyquist() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_frequency(1.0e6);
        assert_eq!(osc.frequency(), 24000.0);
        osc.set_frequency(-5.0);
        assert_eq!(osc.frequency(), 0.0);
    }

    #[test]
    fn test_zero_crossings_track_frequency() {
        let mut osc = Oscillator::new(48000.0);
        osc.set_waveshape(Waveshape::Sine);
        osc.set_frequency(200.0);
        let mut prev = osc.advance();
        let mut rising = 0;
        for _ in 0..48000 {
            let s = osc.advance();
            if prev < 0.0 && s >= 0.0 {
                rising += 1;
            }
            prev = s;
        }
        assert!((199..=201).contains(&rising), "got {rising} cycles");
    }
}

//! Biquad (bi-quadratic) filter structure.
//!
//! The vocoder uses two shapes: constant-peak band-pass for the analysis and
//! synthesis banks, and high-pass for the anti-rumble stage in front of the
//! modulator path. Coefficients follow the RBJ Audio EQ Cookbook.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Upper bound for a design frequency, as a fraction of the sample rate.
///
/// Center frequencies at or above Nyquist fold back and produce unstable
/// coefficients, so they are pulled just below it.
const MAX_NORMALIZED_FREQ: f32 = 0.49;

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    /// Input history: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output history: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a constant 0 dB peak band-pass filter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vocodex_core::Biquad;
    ///
    /// let mut band = Biquad::bandpass(1100.0, 12.0, 48000.0);
    /// let y = band.process(0.5);
    /// assert!(y.is_finite());
    /// ```
    pub fn bandpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new();
        let (b0, b1, b2, a0, a1, a2) = bandpass_coefficients(frequency, q, sample_rate);
        filter.set_coefficients(b0, b1, b2, a0, a1, a2);
        filter
    }

    /// Creates a second-order high-pass filter.
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new();
        let (b0, b1, b2, a0, a1, a2) = highpass_coefficients(frequency, q, sample_rate);
        filter.set_coefficients(b0, b1, b2, a0, a1, a2);
        filter
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);

        output
    }

    /// Filters `input` into `output`. Buffers must have equal length.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process(*x);
        }
    }

    /// Clears the filter history without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `(cos(omega), alpha)` for the given design frequency.
#[inline]
fn design(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let limit = sample_rate * MAX_NORMALIZED_FREQ;
    let frequency = if frequency > limit {
        #[cfg(feature = "tracing")]
        tracing::debug!(frequency, limit, "design frequency pulled below nyquist");
        limit
    } else {
        frequency.max(1.0)
    };
    let omega = 2.0 * PI * frequency / sample_rate;
    let alpha = sinf(omega) / (2.0 * q.max(0.01));
    (cosf(omega), alpha)
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn highpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = design(frequency, q, sample_rate);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates band-pass filter coefficients using the RBJ cookbook formula.
///
/// This version has constant 0 dB peak gain, so a sine at the center
/// frequency passes at unity regardless of Q.
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn bandpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = design(frequency, q, sample_rate);

    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_gain(filter: &mut Biquad, freq: f32, sample_rate: f32) -> f32 {
        let mut peak = 0.0_f32;
        for i in 0..(sample_rate as usize) {
            let x = sinf(2.0 * PI * freq * i as f32 / sample_rate);
            let y = filter.process(x);
            // skip the settling transient
            if i > sample_rate as usize / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();
        for i in 0..10 {
            let input = i as f32 * 0.1;
            assert!((biquad.process(input) - input).abs() < 1e-6);
        }
    }

    #[test]
    fn test_biquad_clear() {
        let mut biquad = Biquad::bandpass(1000.0, 12.0, 48000.0);
        for _ in 0..10 {
            biquad.process(1.0);
        }
        biquad.clear();
        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.x2, 0.0);
        assert_eq!(biquad.y1, 0.0);
        assert_eq!(biquad.y2, 0.0);
    }

    #[test]
    fn test_bandpass_unity_at_center() {
        let mut band = Biquad::bandpass(1100.0, 12.0, 48000.0);
        let gain = sine_gain(&mut band, 1100.0, 48000.0);
        assert!((gain - 1.0).abs() < 0.02, "center gain {gain}");
    }

    #[test]
    fn test_bandpass_rejects_neighbouring_band() {
        let mut band = Biquad::bandpass(1100.0, 12.0, 48000.0);
        let gain = sine_gain(&mut band, 2150.0, 48000.0);
        assert!(gain < 0.1, "off-band gain {gain}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut hpf = Biquad::highpass(200.0, 0.707, 48000.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hpf.process(1.0);
        }
        assert!(out.abs() < 1e-3, "dc leaked: {out}");
    }

    #[test]
    fn test_coefficients_finite_above_nyquist() {
        let (b0, b1, b2, a0, a1, a2) = bandpass_coefficients(30000.0, 12.0, 48000.0);
        for c in [b0, b1, b2, a0, a1, a2] {
            assert!(c.is_finite());
        }
        let mut band = Biquad::bandpass(30000.0, 12.0, 48000.0);
        for i in 0..4800 {
            let y = band.process(if i % 2 == 0 { 1.0 } else { -1.0 });
            assert!(y.is_finite() && y.abs() < 10.0);
        }
    }
}

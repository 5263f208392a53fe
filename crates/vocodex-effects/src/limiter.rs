//! Brickwall lookahead limiter on the vocoder output.
//!
//! The last stage before the device. Whatever the band gains, echo feedback
//! or tremolo do upstream, no sample leaves this stage above
//! `threshold × ceiling`.
//!
//! # Algorithm
//!
//! 1. Input is written into a circular window of `lookahead + 1` samples.
//!    The oldest sample in the window is the one emitted.
//! 2. The peak detector scans the whole window, so it always includes the
//!    sample about to be emitted as well as every sample still to come
//!    within the lookahead.
//! 3. Target gain is `threshold / peak` when the peak exceeds the threshold,
//!    otherwise unity, and is then scaled by the ceiling.
//! 4. Gain drops to the target instantly and recovers with a one-pole
//!    release toward it. Recovery approaches the target from below, so the
//!    applied gain never exceeds the current target.
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Threshold | -30 to 0 dB | -3.0 |
//! | Ceiling | -30 to 0 dB | -0.3 |
//! | Release | 10 to 500 ms | 100.0 |
//! | Lookahead | 0 to 10 ms | 1.5 |

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{expf, fabsf};
use vocodex_core::{Effect, db_to_linear, ms_to_samples};

/// Upper bound on lookahead, used to size the window once.
const MAX_LOOKAHEAD_MS: f32 = 10.0;

/// Brickwall lookahead limiter.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Effect;
/// use vocodex_effects::Limiter;
///
/// let mut lim = Limiter::new(48000.0);
/// let ceiling = lim.output_ceiling();
/// for i in 0..4800 {
///     let loud = if i % 2 == 0 { 4.0 } else { -4.0 };
///     assert!(lim.process(loud).abs() <= ceiling + 1e-6);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Limiter {
    sample_rate: f32,
    threshold_db: f32,
    ceiling_db: f32,
    threshold_lin: f32,
    ceiling_lin: f32,
    release_ms: f32,
    release_coeff: f32,
    lookahead_ms: f32,
    lookahead_samples: usize,
    /// Sized for `MAX_LOOKAHEAD_MS`; only `lookahead_samples + 1` slots are live.
    window: Vec<f32>,
    write_pos: usize,
    gain: f32,
}

impl Limiter {
    /// Create a limiter with the output-stage defaults.
    pub fn new(sample_rate: f32) -> Self {
        let mut limiter = Self {
            sample_rate,
            threshold_db: -3.0,
            ceiling_db: -0.3,
            threshold_lin: db_to_linear(-3.0),
            ceiling_lin: db_to_linear(-0.3),
            release_ms: 100.0,
            release_coeff: release_coeff(100.0, sample_rate),
            lookahead_ms: 1.5,
            lookahead_samples: 0,
            window: vec![0.0; max_window(sample_rate)],
            write_pos: 0,
            gain: 1.0,
        };
        limiter.set_lookahead_ms(1.5);
        limiter
    }

    /// Set the detection threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.threshold_db = threshold_db.clamp(-30.0, 0.0);
        self.threshold_lin = db_to_linear(self.threshold_db);
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Set the ceiling in dB, applied on top of the threshold.
    pub fn set_ceiling_db(&mut self, ceiling_db: f32) {
        self.ceiling_db = ceiling_db.clamp(-30.0, 0.0);
        self.ceiling_lin = db_to_linear(self.ceiling_db);
    }

    /// Ceiling in dB.
    pub fn ceiling_db(&self) -> f32 {
        self.ceiling_db
    }

    /// Set the release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.clamp(10.0, 500.0);
        self.release_coeff = release_coeff(self.release_ms, self.sample_rate);
    }

    /// Set the lookahead in milliseconds. Clears the window.
    pub fn set_lookahead_ms(&mut self, lookahead_ms: f32) {
        self.lookahead_ms = lookahead_ms.clamp(0.0, MAX_LOOKAHEAD_MS);
        let samples = ms_to_samples(self.lookahead_ms, self.sample_rate) as usize;
        self.lookahead_samples = samples.min(self.window.len() - 1);
        self.window.fill(0.0);
        self.write_pos = 0;
    }

    /// Largest magnitude the limiter can emit, `threshold × ceiling` in linear terms.
    pub fn output_ceiling(&self) -> f32 {
        self.threshold_lin * self.ceiling_lin
    }

    /// Current gain reduction in dB (0 = none, negative = reducing).
    pub fn gain_reduction_db(&self) -> f32 {
        vocodex_core::linear_to_db(self.gain / self.ceiling_lin).min(0.0)
    }
}

impl Effect for Limiter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let input = if input.is_finite() { input } else { 0.0 };
        let len = self.lookahead_samples + 1;

        self.window[self.write_pos] = input;
        self.write_pos += 1;
        if self.write_pos == len {
            self.write_pos = 0;
        }
        // after advancing, write_pos points at the oldest live sample
        let delayed = self.window[self.write_pos];

        let peak = self.window[..len]
            .iter()
            .fold(0.0_f32, |acc, s| acc.max(fabsf(*s)));

        let target = if peak > self.threshold_lin {
            self.threshold_lin / peak * self.ceiling_lin
        } else {
            self.ceiling_lin
        };

        if target < self.gain {
            self.gain = target;
        } else {
            self.gain = self.release_coeff * self.gain + (1.0 - self.release_coeff) * target;
        }

        delayed * self.gain
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.release_coeff = release_coeff(self.release_ms, sample_rate);
        self.window = vec![0.0; max_window(sample_rate)];
        self.set_lookahead_ms(self.lookahead_ms);
    }

    fn reset(&mut self) {
        self.window.fill(0.0);
        self.write_pos = 0;
        self.gain = self.ceiling_lin;
    }

    fn latency_samples(&self) -> usize {
        self.lookahead_samples
    }
}

fn max_window(sample_rate: f32) -> usize {
    ms_to_samples(MAX_LOOKAHEAD_MS, sample_rate) as usize + 1
}

fn release_coeff(release_ms: f32, sample_rate: f32) -> f32 {
    let samples = ms_to_samples(release_ms, sample_rate);
    if samples > 0.0 {
        expf(-1.0 / samples)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_passes_with_latency() {
        let mut lim = Limiter::new(48000.0);
        let latency = lim.latency_samples();
        assert_eq!(latency, 72);

        let mut out = Vec::new();
        for i in 0..200 {
            let x = if i == 0 { 0.1 } else { 0.0 };
            out.push(lim.process(x));
        }
        let expected = 0.1 * db_to_linear(-0.3);
        assert!((out[latency] - expected).abs() < 1e-6);
        assert!(out[..latency].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_never_exceeds_ceiling() {
        let mut lim = Limiter::new(48000.0);
        let ceiling = lim.output_ceiling();
        for i in 0..48000 {
            let x = 5.0 * libm::sinf(i as f32 * 0.013) + if i % 997 == 0 { 20.0 } else { 0.0 };
            let y = lim.process(x);
            assert!(y.abs() <= ceiling + 1e-6, "sample {i}: {y} > {ceiling}");
        }
    }

    #[test]
    fn test_single_spike_is_caught() {
        // a lone spike must be attenuated on the very sample it leaves the window
        let mut lim = Limiter::new(48000.0);
        lim.set_lookahead_ms(0.0);
        assert_eq!(lim.latency_samples(), 0);
        let y = lim.process(10.0);
        assert!(y.abs() <= lim.output_ceiling() + 1e-6);
    }

    #[test]
    fn test_non_finite_input_is_silenced() {
        let mut lim = Limiter::new(48000.0);
        lim.set_lookahead_ms(0.0);
        assert_eq!(lim.process(f32::NAN), 0.0);
        assert_eq!(lim.process(f32::INFINITY), 0.0);
        assert!(lim.process(0.1).is_finite());
    }

    #[test]
    fn test_release_recovers() {
        let mut lim = Limiter::new(48000.0);
        for _ in 0..1000 {
            lim.process(2.0);
        }
        assert!(lim.gain_reduction_db() < -6.0);
        for _ in 0..48000 {
            lim.process(0.0);
        }
        assert!(lim.gain_reduction_db() > -0.1);
    }
}

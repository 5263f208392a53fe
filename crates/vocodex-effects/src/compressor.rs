//! Dynamics compressor with soft-knee characteristics.
//!
//! Sits between the modulator preamp and the analysis filter bank. It keeps
//! the band envelopes and the noise-gate loudness reference in a stable range
//! whether the talker whispers or shouts into the microphone.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → Gain Computer → Gain Reduction → Output
//!                                    ↓
//!                              Makeup Gain
//! ```
//!
//! # Defaults
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | Threshold | -60 to 0 dB | -24 dB |
//! | Knee | 0 to 40 dB | 30 dB |
//! | Ratio | 1:1 to 20:1 | 12:1 |
//! | Attack | 0.1-100 ms | 3 ms |
//! | Release | 10-1000 ms | 250 ms |
//! | Makeup | 0-24 dB | 0 dB |

use vocodex_core::{Effect, EnvelopeFollower, SmoothedParam, db_to_linear, linear_to_db};

/// Static compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
}

impl GainComputer {
    /// Gain change in dB (always non-positive) for a detector level in dB.
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;
        let slope = 1.0 - 1.0 / self.ratio;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot > half_knee || self.knee_db <= 0.0 {
            -(overshoot * slope)
        } else {
            // quadratic knee, continuous with both linear segments
            let x = overshoot + half_knee;
            -(slope * x * x / (2.0 * self.knee_db))
        }
    }
}

/// Soft-knee feed-forward compressor.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Effect;
/// use vocodex_effects::Compressor;
///
/// let mut comp = Compressor::new(48000.0);
/// for _ in 0..4800 {
///     comp.process(0.9);
/// }
/// assert!(comp.gain_reduction_db() < -10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    makeup_gain: SmoothedParam,
    sample_rate: f32,
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor with the input-stage defaults.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope_follower: EnvelopeFollower::with_times(sample_rate, 3.0, 250.0),
            gain_computer: GainComputer {
                threshold_db: -24.0,
                ratio: 12.0,
                knee_db: 30.0,
            },
            makeup_gain: SmoothedParam::standard(1.0, sample_rate),
            sample_rate,
            last_gain_reduction_db: 0.0,
        }
    }

    /// Set threshold in dB.
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.gain_computer.threshold_db = threshold_db.clamp(-60.0, 0.0);
    }

    /// Threshold in dB.
    pub fn threshold_db(&self) -> f32 {
        self.gain_computer.threshold_db
    }

    /// Set compression ratio.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.gain_computer.ratio = ratio.clamp(1.0, 20.0);
    }

    /// Compression ratio.
    pub fn ratio(&self) -> f32 {
        self.gain_computer.ratio
    }

    /// Set knee width in dB.
    pub fn set_knee_db(&mut self, knee_db: f32) {
        self.gain_computer.knee_db = knee_db.clamp(0.0, 40.0);
    }

    /// Set attack time in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.envelope_follower.set_attack_ms(attack_ms.clamp(0.1, 100.0));
    }

    /// Set release time in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.envelope_follower.set_release_ms(release_ms.clamp(10.0, 1000.0));
    }

    /// Set makeup gain in dB.
    pub fn set_makeup_gain_db(&mut self, gain_db: f32) {
        self.makeup_gain.set_target(db_to_linear(gain_db.clamp(0.0, 24.0)));
    }

    /// Last computed gain reduction in dB (0 = none, negative = reducing).
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let envelope = self.envelope_follower.process(input);
        let gain_reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_gain_reduction_db = gain_reduction_db;
        let makeup = self.makeup_gain.advance();

        input * db_to_linear(gain_reduction_db) * makeup
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.envelope_follower.set_sample_rate(sample_rate);
        self.makeup_gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.makeup_gain.snap_to_target();
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_untouched() {
        let mut comp = Compressor::new(48000.0);
        // -60 dBFS sits far below threshold minus half the knee
        let mut out = 0.0;
        for _ in 0..4800 {
            out = comp.process(0.001);
        }
        assert!((out - 0.001).abs() < 1e-6);
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_loud_signal_reduced() {
        let mut comp = Compressor::new(48000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = comp.process(1.0);
        }
        // 24 dB over threshold at 12:1 is -22 dB of reduction
        assert!(out < 0.1, "expected heavy reduction, got {out}");
        assert!((comp.gain_reduction_db() + 22.0).abs() < 0.5);
    }

    #[test]
    fn test_knee_is_continuous() {
        let gc = GainComputer {
            threshold_db: -24.0,
            ratio: 12.0,
            knee_db: 30.0,
        };
        let below = gc.compute_gain_db(-24.0 - 15.0 - 1e-3);
        let lower_edge = gc.compute_gain_db(-24.0 - 15.0 + 1e-3);
        let upper_in = gc.compute_gain_db(-24.0 + 15.0 - 1e-3);
        let upper_out = gc.compute_gain_db(-24.0 + 15.0 + 1e-3);
        assert!((below - lower_edge).abs() < 1e-3);
        assert!((upper_in - upper_out).abs() < 1e-2);
    }

    #[test]
    fn test_gain_curve_monotonic() {
        let comp = Compressor::new(48000.0);
        let mut prev_out = f32::NEG_INFINITY;
        for i in 0..120 {
            let in_db = -80.0 + i as f32;
            let out_db = in_db + comp.gain_computer.compute_gain_db(in_db);
            assert!(out_db >= prev_out - 1e-4);
            prev_out = out_db;
        }
    }

    #[test]
    fn test_reset_clears_detector() {
        let mut comp = Compressor::new(48000.0);
        for _ in 0..4800 {
            comp.process(1.0);
        }
        comp.reset();
        assert_eq!(comp.gain_reduction_db(), 0.0);
        let out = comp.process(0.001);
        assert!((out - 0.001).abs() < 1e-6);
    }
}

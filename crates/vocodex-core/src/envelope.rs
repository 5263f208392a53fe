//! Envelope follower for tracking signal amplitude.
//!
//! Drives the input compressor's detector.

use libm::expf;

/// Peak envelope follower with separate attack and release times.
///
/// # Example
///
/// ```rust
/// use vocodex_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 3.0, 250.0);
/// let level = env.process(0.5);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Create a follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Create with specified attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set the attack time in milliseconds (minimum 0.1 ms).
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.recalculate_coefficients();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set the release time in milliseconds (minimum 1 ms).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.recalculate_coefficients();
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Update sample rate and recalculate coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Process a sample and return the envelope level (always positive).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope =
            crate::math::flush_denormal(coeff * self.envelope + (1.0 - coeff) * input_abs);
        self.envelope
    }

    /// Current level without processing new input.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        // coeff = exp(-1 / (time_ms * sample_rate / 1000))
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_attack() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
        let mut envelope = 0.0;
        for _ in 0..500 {
            envelope = env.process(1.0);
        }
        assert!(envelope > 0.9, "envelope should rise, got {envelope}");
    }

    #[test]
    fn test_envelope_release() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        for _ in 0..500 {
            env.process(1.0);
        }
        let mut envelope = 1.0;
        for _ in 0..1000 {
            envelope = env.process(0.0);
        }
        // ~2 time constants
        assert!(envelope < 0.15, "envelope should fall, got {envelope}");
    }

    #[test]
    fn test_envelope_rectifies() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 100.0);
        assert!(env.process(-0.5) > 0.0);
    }

    #[test]
    fn test_envelope_reset() {
        let mut env = EnvelopeFollower::new(48000.0);
        for _ in 0..100 {
            env.process(1.0);
        }
        env.reset();
        assert_eq!(env.level(), 0.0);
    }
}

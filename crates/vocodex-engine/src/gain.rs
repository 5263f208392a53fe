//! Band gain law and noise gate.
//!
//! Once per tick the controller measures global loudness, decides whether
//! the gate is open, and hands each band a target gain:
//!
//! ```text
//! loudness = clamp(rms(modulator) * loudness_scale, 0, 1)   (VU ballistics)
//! target   = 0                                              if loudness < noise_threshold
//!          = clamp(envelope * intensity * gain_ceiling, 0, max_band_gain)   otherwise
//! ```
//!
//! The band's [`AsymmetricSmoother`](vocodex_core::AsymmetricSmoother) then
//! moves the applied gain toward the target per sample, quickly on the way up
//! and slowly on the way down.

use crate::bands::FilterBank;
use vocodex_config::GainSettings;
use vocodex_core::rms;

/// Per-tick gain controller. Owns the loudness estimate that doubles as the
/// VU reading.
#[derive(Debug, Clone)]
pub struct BandGainController {
    gain_ceiling: f32,
    max_band_gain: f32,
    noise_threshold: f32,
    loudness_scale: f32,
    vu_attack: f32,
    vu_release: f32,
    loudness: f32,
}

impl BandGainController {
    /// Controller configured from the `[gain]` section.
    pub fn new(settings: &GainSettings) -> Self {
        Self {
            gain_ceiling: settings.gain_ceiling,
            max_band_gain: settings.max_band_gain,
            noise_threshold: settings.noise_threshold.clamp(0.0, 1.0),
            loudness_scale: settings.loudness_scale,
            vu_attack: settings.vu_attack,
            vu_release: settings.vu_release,
            loudness: 0.0,
        }
    }

    /// Update the loudness estimate from one tick of post-compressor
    /// modulator and return it. An empty tick leaves it unchanged.
    pub fn measure_loudness(&mut self, modulator: &[f32]) -> f32 {
        if modulator.is_empty() {
            return self.loudness;
        }
        let raw = rms(modulator) * self.loudness_scale;
        let level = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        let coeff = if level > self.loudness {
            self.vu_attack
        } else {
            self.vu_release
        };
        self.loudness += (level - self.loudness) * coeff;
        self.loudness
    }

    /// Smoothed loudness in `[0, 1]`.
    pub fn loudness(&self) -> f32 {
        self.loudness
    }

    /// Loudness below which every band is muted.
    pub fn noise_threshold(&self) -> f32 {
        self.noise_threshold
    }

    /// Change the gate threshold, clamped to `[0, 1]`. Non-finite values are
    /// ignored.
    pub fn set_noise_threshold(&mut self, threshold: f32) {
        if threshold.is_finite() {
            self.noise_threshold = threshold.clamp(0.0, 1.0);
        }
    }

    /// Whether the gate is currently closed.
    pub fn is_gated(&self) -> bool {
        self.loudness < self.noise_threshold
    }

    /// Target gain for a band with `envelope` at `intensity`.
    #[inline]
    pub fn target_gain(&self, envelope: f32, intensity: f32) -> f32 {
        if self.is_gated() {
            return 0.0;
        }
        let gain = envelope * intensity * self.gain_ceiling;
        if gain.is_nan() {
            0.0
        } else {
            gain.clamp(0.0, self.max_band_gain)
        }
    }

    /// Set every band's target from its current envelope.
    pub fn apply(&self, bank: &mut FilterBank, intensity: f32) {
        for channel in bank.channels_mut() {
            let target = self.target_gain(channel.envelope(), intensity);
            channel.set_target_gain(target);
        }
    }

    /// Forget the loudness history.
    pub fn reset(&mut self) {
        self.loudness = 0.0;
    }
}

impl Default for BandGainController {
    fn default() -> Self {
        Self::new(&GainSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSpec;
    use crate::envelope::EnvelopeDetector;
    use vocodex_core::AsymmetricSmoother;

    fn open_gate() -> BandGainController {
        let mut ctl = BandGainController::default();
        for _ in 0..64 {
            ctl.measure_loudness(&[0.5; 256]);
        }
        assert!(!ctl.is_gated());
        ctl
    }

    #[test]
    fn test_silence_closes_gate() {
        let mut ctl = BandGainController::default();
        ctl.measure_loudness(&[0.0; 256]);
        assert!(ctl.is_gated());
        assert_eq!(ctl.target_gain(1.0, 3.0), 0.0);
    }

    #[test]
    fn test_vu_ballistics_rise_faster_than_fall() {
        let mut ctl = BandGainController::default();
        let up = ctl.measure_loudness(&[0.25; 256]);
        assert!((up - 0.25).abs() < 1e-6, "{up}");
        let down = ctl.measure_loudness(&[0.0; 256]);
        assert!((down - 0.25 * 0.92).abs() < 1e-6, "{down}");
    }

    #[test]
    fn test_empty_tick_keeps_loudness() {
        let mut ctl = BandGainController::default();
        let level = ctl.measure_loudness(&[0.1; 128]);
        assert_eq!(ctl.measure_loudness(&[]), level);
    }

    #[test]
    fn test_target_gain_law() {
        let ctl = open_gate();
        assert!((ctl.target_gain(0.5, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(ctl.target_gain(1.0, 3.0), 4.0);
        assert_eq!(ctl.target_gain(0.0, 3.0), 0.0);
        assert_eq!(ctl.target_gain(f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_threshold_setter() {
        let mut ctl = BandGainController::default();
        ctl.set_noise_threshold(2.0);
        assert_eq!(ctl.noise_threshold(), 1.0);
        ctl.set_noise_threshold(f32::NAN);
        assert_eq!(ctl.noise_threshold(), 1.0);
        ctl.set_noise_threshold(0.0);
        ctl.measure_loudness(&[0.0; 16]);
        // loudness 0 is not below a threshold of 0
        assert!(!ctl.is_gated());
    }

    #[test]
    fn test_apply_sets_band_targets() {
        let ctl = open_gate();
        let mut bank = FilterBank::new(BandSpec::new(&[1000.0], 12.0), 48000.0, 5.0, 50.0);
        let tone: Vec<f32> = (0..2048)
            .map(|i| 0.5 * (core::f32::consts::TAU * 1000.0 * i as f32 / 48000.0).sin())
            .collect();
        bank.analyze(&tone, &EnvelopeDetector::default());
        ctl.apply(&mut bank, 1.0);
        assert_eq!(bank.channels()[0].target_gain(), 2.0);
    }

    #[test]
    fn test_rise_faster_than_fall() {
        let mut smoother = AsymmetricSmoother::new(48000.0, 5.0, 50.0);
        smoother.set_target(1.0);
        let mut rise = 0;
        while smoother.advance() < 0.95 {
            rise += 1;
        }
        smoother.set_target(0.0);
        let mut fall = 0;
        while smoother.advance() > 0.05 {
            fall += 1;
        }
        assert!(rise < fall, "rise {rise} fall {fall}");
    }
}

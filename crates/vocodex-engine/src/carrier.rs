//! Carrier generation: oscillator with vibrato, or a looped carrier file.

use crate::params::Waveform;
use std::sync::Arc;
use vocodex_config::ModulationSettings;
use vocodex_core::{Lfo, Oscillator};

/// Produces the carrier fed to the synthesis bank.
///
/// The vibrato LFO runs continuously, even while a carrier file plays, so
/// switching back to the oscillator does not restart its phase.
#[derive(Debug, Clone)]
pub struct CarrierGenerator {
    oscillator: Oscillator,
    vibrato_lfo: Lfo,
    vibrato_max_hz: f32,
    external: Option<Arc<[f32]>>,
    position: usize,
    use_external: bool,
}

impl CarrierGenerator {
    /// Saw carrier at 140 Hz with the `[modulation]` vibrato settings.
    pub fn new(sample_rate: f32, settings: &ModulationSettings) -> Self {
        Self {
            oscillator: Oscillator::new(sample_rate),
            vibrato_lfo: Lfo::new(sample_rate, settings.vibrato_rate_hz),
            vibrato_max_hz: settings.vibrato_max_hz,
            external: None,
            position: 0,
            use_external: false,
        }
    }

    /// Select the oscillator shape or the external carrier.
    ///
    /// Selecting `ExternalCarrier` keeps the last oscillator shape for the
    /// fallback case.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        match waveform.waveshape() {
            Some(shape) => {
                self.oscillator.set_waveshape(shape);
                self.use_external = false;
            }
            None => self.use_external = true,
        }
    }

    /// Replace the carrier buffer, restarting it from the top. `None` or an
    /// empty buffer unloads it.
    pub fn set_buffer(&mut self, buffer: Option<Arc<[f32]>>) {
        self.external = buffer.filter(|b| !b.is_empty());
        self.position = 0;
    }

    /// Whether a carrier buffer is loaded.
    pub fn has_buffer(&self) -> bool {
        self.external.is_some()
    }

    /// Whether the next sample comes from the carrier buffer.
    pub fn is_external_active(&self) -> bool {
        self.use_external && self.external.is_some()
    }

    /// Oscillator pitch the last sample was generated at, vibrato included.
    pub fn frequency(&self) -> f32 {
        self.oscillator.frequency()
    }

    /// Next carrier sample at base `pitch_hz` with `vibrato` depth in
    /// `[0, 1]`.
    #[inline]
    pub fn next_sample(&mut self, pitch_hz: f32, vibrato: f32) -> f32 {
        let excursion = self.vibrato_lfo.next() * vibrato * self.vibrato_max_hz;
        if self.use_external
            && let Some(buffer) = &self.external
        {
            let sample = buffer[self.position];
            self.position = (self.position + 1) % buffer.len();
            return sample;
        }
        self.oscillator.set_frequency((pitch_hz + excursion).max(1.0));
        self.oscillator.advance()
    }

    /// Rewind the oscillator, LFO and carrier buffer.
    pub fn reset(&mut self) {
        self.oscillator.reset();
        self.vibrato_lfo.reset();
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CarrierGenerator {
        CarrierGenerator::new(48000.0, &ModulationSettings::default())
    }

    #[test]
    fn test_oscillator_is_bounded() {
        let mut carrier = generator();
        for _ in 0..4800 {
            let s = carrier.next_sample(140.0, 1.0);
            assert!(s.abs() <= 1.1, "{s}");
        }
    }

    #[test]
    fn test_vibrato_moves_pitch() {
        let mut carrier = generator();
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for _ in 0..48000 {
            carrier.next_sample(200.0, 1.0);
            lo = lo.min(carrier.frequency());
            hi = hi.max(carrier.frequency());
        }
        assert!(hi > 215.0 && lo < 185.0, "{lo}..{hi}");

        let mut dry = generator();
        for _ in 0..4800 {
            dry.next_sample(200.0, 0.0);
            assert_eq!(dry.frequency(), 200.0);
        }
    }

    #[test]
    fn test_external_buffer_loops() {
        let mut carrier = generator();
        carrier.set_buffer(Some(Arc::from(vec![0.1, 0.2, 0.3])));
        carrier.set_waveform(Waveform::ExternalCarrier);
        assert!(carrier.is_external_active());
        let out: Vec<f32> = (0..7).map(|_| carrier.next_sample(140.0, 0.0)).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1]);
    }

    #[test]
    fn test_external_without_buffer_falls_back() {
        let mut carrier = generator();
        carrier.set_waveform(Waveform::ExternalCarrier);
        assert!(!carrier.is_external_active());
        let energy: f32 = (0..480).map(|_| carrier.next_sample(140.0, 0.0).abs()).sum();
        assert!(energy > 10.0);
    }

    #[test]
    fn test_empty_buffer_unloads() {
        let mut carrier = generator();
        carrier.set_buffer(Some(Arc::from(Vec::new())));
        assert!(!carrier.has_buffer());
    }

    #[test]
    fn test_waveform_switch_back_to_oscillator() {
        let mut carrier = generator();
        carrier.set_buffer(Some(Arc::from(vec![0.0; 8])));
        carrier.set_waveform(Waveform::ExternalCarrier);
        carrier.set_waveform(Waveform::Sine);
        assert!(!carrier.is_external_active());
        assert!(carrier.has_buffer());
    }
}

//! Per-band envelope extraction.

use vocodex_core::mean_abs;

/// Turns one tick of band-filtered modulator into an envelope in `[0, 1]`.
///
/// The measure is the mean absolute value over the tick, scaled so that a
/// typical voiced band reaches the top of the range.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeDetector {
    scale: f32,
}

impl EnvelopeDetector {
    /// Detector with the given mean-to-envelope multiplier.
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    /// Mean-to-envelope multiplier.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Envelope of `filtered`, or `None` for an empty tick.
    #[inline]
    pub fn measure(&self, filtered: &[f32]) -> Option<f32> {
        if filtered.is_empty() {
            return None;
        }
        let level = mean_abs(filtered) * self.scale;
        // NaN clamps to NaN; treat it as silence
        Some(if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) })
    }
}

impl Default for EnvelopeDetector {
    fn default() -> Self {
        Self::new(8.0)
    }
}

//! Analysis and synthesis filter banks.
//!
//! Every band owns a matched pair of constant-peak band-pass filters with the
//! same center and Q: the analysis filter listens to the modulator, the
//! synthesis filter shapes the carrier. Coefficients are computed once, when
//! the bank is built.
//!
//! ```text
//!  modulator ──┬─▶ analysis[0] ──▶ envelope[0] ─┐
//!              ├─▶ analysis[1] ──▶ envelope[1] ─┤   gain law
//!              └─▶ ...                          ▼
//!  carrier ────┬─▶ synthesis[0] ──× gain[0] ──┐
//!              ├─▶ synthesis[1] ──× gain[1] ──┼──▶ bus
//!              └─▶ ...                        ┘
//! ```

use crate::envelope::EnvelopeDetector;
use std::sync::Arc;
use vocodex_config::{BandSettings, DEFAULT_BAND_FREQUENCIES};
use vocodex_core::{AsymmetricSmoother, Biquad};

/// Band centers and the shared Q. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpec {
    frequencies: Arc<[f32]>,
    q: f32,
}

impl BandSpec {
    /// Layout from explicit centers in Hz.
    pub fn new(frequencies: &[f32], q: f32) -> Self {
        Self {
            frequencies: Arc::from(frequencies),
            q,
        }
    }

    /// The default 20-band voice layout at Q 12.
    pub fn voice() -> Self {
        Self::new(&DEFAULT_BAND_FREQUENCIES, 12.0)
    }

    /// Layout from the `[bands]` config section.
    pub fn from_settings(settings: &BandSettings) -> Self {
        Self::new(&settings.frequencies, settings.q)
    }

    /// Center frequencies in Hz.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Shared Q.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the layout has no bands.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl Default for BandSpec {
    fn default() -> Self {
        Self::voice()
    }
}

/// State of one band: both filters, the latest envelope and the smoothed
/// gain applied to the synthesis output.
#[derive(Debug, Clone)]
pub struct BandChannel {
    analysis: Biquad,
    synthesis: Biquad,
    envelope: f32,
    gain: AsymmetricSmoother,
}

impl BandChannel {
    fn new(frequency: f32, q: f32, sample_rate: f32, rise_ms: f32, fall_ms: f32) -> Self {
        Self {
            analysis: Biquad::bandpass(frequency, q, sample_rate),
            synthesis: Biquad::bandpass(frequency, q, sample_rate),
            envelope: 0.0,
            gain: AsymmetricSmoother::new(sample_rate, rise_ms, fall_ms),
        }
    }

    /// Envelope measured on the last non-empty tick.
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Gain currently applied to the synthesis output.
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Gain the smoother is moving toward.
    pub fn target_gain(&self) -> f32 {
        self.gain.target()
    }

    pub(crate) fn set_target_gain(&mut self, target: f32) {
        self.gain.set_target(target);
    }

    fn reset(&mut self) {
        self.analysis.clear();
        self.synthesis.clear();
        self.envelope = 0.0;
        self.gain.reset();
    }
}

/// The full bank: one [`BandChannel`] per band plus a scratch buffer for the
/// analysis pass.
#[derive(Debug, Clone)]
pub struct FilterBank {
    spec: BandSpec,
    channels: Vec<BandChannel>,
    scratch: Vec<f32>,
}

impl FilterBank {
    /// Build both filter sets for `spec`. `rise_ms` and `fall_ms` are the
    /// band gain time constants.
    pub fn new(spec: BandSpec, sample_rate: f32, rise_ms: f32, fall_ms: f32) -> Self {
        let channels = spec
            .frequencies()
            .iter()
            .map(|&freq| BandChannel::new(freq, spec.q(), sample_rate, rise_ms, fall_ms))
            .collect();
        Self {
            spec,
            channels,
            scratch: Vec::new(),
        }
    }

    /// Reserve scratch space so ticks of up to `max_block` samples never
    /// allocate.
    pub fn with_max_block(mut self, max_block: usize) -> Self {
        self.scratch.reserve(max_block);
        self
    }

    /// Layout the bank was built from.
    pub fn spec(&self) -> &BandSpec {
        &self.spec
    }

    /// Per-band state.
    pub fn channels(&self) -> &[BandChannel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [BandChannel] {
        &mut self.channels
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the bank has no bands.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Run one tick of modulator through every analysis filter and update
    /// each band's envelope. An empty tick changes nothing.
    pub fn analyze(&mut self, modulator: &[f32], detector: &EnvelopeDetector) {
        if modulator.is_empty() {
            return;
        }
        self.scratch.resize(modulator.len(), 0.0);
        for channel in &mut self.channels {
            channel.analysis.process_block(modulator, &mut self.scratch);
            if let Some(env) = detector.measure(&self.scratch) {
                channel.envelope = env;
            }
        }
    }

    /// Filter `carrier` through every synthesis filter, weight by the
    /// smoothed band gains and sum into `out`.
    ///
    /// Gains advance one step per sample. Synthesis filters run even at zero
    /// gain so their state stays continuous.
    pub fn synthesize(&mut self, carrier: &[f32], out: &mut [f32]) {
        debug_assert_eq!(carrier.len(), out.len());
        out.fill(0.0);
        for channel in &mut self.channels {
            for (&c, y) in carrier.iter().zip(out.iter_mut()) {
                let band = channel.synthesis.process(c);
                *y += band * channel.gain.advance();
            }
        }
    }

    /// Clear filter history, envelopes and gains.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}

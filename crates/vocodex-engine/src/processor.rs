//! The audio-side vocoder graph.
//!
//! [`VocoderProcessor`] renders the vocoded bus from live input, the loaded
//! modulator and the carrier. Work happens in ticks of at most `block_size`
//! samples. At the start of each tick the processor drains pending
//! [`SourceCommand`]s and takes a parameter snapshot, so every change lands
//! on a tick boundary and never mid-tick.
//!
//! ```text
//!  live / file ─▶ ×input_gain ─▶ high-pass ─▶ compressor ─┬─▶ loudness (VU, gate)
//!                                                         └─▶ analysis bank ─▶ envelopes
//!                                                                                 │
//!  oscillator + vibrato / carrier file ─▶ synthesis bank ─× band gains ◀──────────┘
//!                                              │
//!                       Σ ×normalization ─▶ tremolo ─▶ echo ─▶ limiter ─▶ out, scope
//! ```
//!
//! Nothing here locks or logs once constructed. The only allocations are
//! the record buffer reserve and the finished take when recording stops.

use crate::bands::{BandSpec, FilterBank};
use crate::carrier::CarrierGenerator;
use crate::envelope::EnvelopeDetector;
use crate::gain::BandGainController;
use crate::meter::{MeterReader, MeterWriter, meter_pair};
use crate::params::{ParameterSet, SharedParams};
use crate::source::{SourceCommand, SourceManager, SourceSelection, SourceStatus};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use vocodex_config::EngineConfig;
use vocodex_core::{Biquad, Effect, SmoothedParam};
use vocodex_effects::{Compressor, Echo, Limiter, Tremolo};

/// Control-side handles onto a [`VocoderProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessorControl {
    /// Parameters read at every tick boundary.
    pub params: Arc<SharedParams>,
    /// Transport and buffer commands, drained at every tick boundary.
    pub commands: Sender<SourceCommand>,
    /// Source state as of the last tick.
    pub status: Arc<SourceStatus>,
    /// VU and scope.
    pub meter: MeterReader,
}

impl ProcessorControl {
    /// Queue a source command. A dropped processor makes this a no-op.
    pub fn send(&self, command: SourceCommand) {
        let _ = self.commands.send(command);
    }

    /// Source state as of the last tick.
    pub fn selection(&self) -> SourceSelection {
        self.status.load()
    }
}

/// The complete vocoder signal graph.
pub struct VocoderProcessor {
    block_size: usize,
    input_gain: f32,
    output_normalization: f32,

    params: Arc<SharedParams>,
    commands: Receiver<SourceCommand>,
    sources: SourceManager,

    highpass: Biquad,
    compressor: Compressor,
    detector: EnvelopeDetector,
    bank: FilterBank,
    gains: BandGainController,
    carrier: CarrierGenerator,
    tremolo: Tremolo,
    echo: Echo,
    limiter: Limiter,

    pitch: SmoothedParam,
    intensity: SmoothedParam,
    vibrato: SmoothedParam,

    meter: MeterWriter,

    live: Vec<f32>,
    modulator: Vec<f32>,
    carrier_buf: Vec<f32>,
}

impl std::fmt::Debug for VocoderProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocoderProcessor")
            .field("block_size", &self.block_size)
            .field("bands", &self.bank.len())
            .field("loudness", &self.gains.loudness())
            .finish_non_exhaustive()
    }
}

impl VocoderProcessor {
    /// Build the graph for `config` along with its control handles.
    ///
    /// `config` is expected to be validated.
    pub fn new(config: &EngineConfig) -> (Self, ProcessorControl) {
        let sample_rate = config.sample_rate_hz();
        let block_size = config.engine.block_size.max(1);
        let params = Arc::new(SharedParams::new(config.gain.noise_threshold));
        let (commands_tx, commands) = unbounded();
        let status = Arc::new(SourceStatus::default());
        let (meter, meter_reader) = meter_pair(sample_rate);

        let comp = &config.input_compressor;
        let mut compressor = Compressor::new(sample_rate);
        compressor.set_threshold_db(comp.threshold_db);
        compressor.set_knee_db(comp.knee_db);
        compressor.set_ratio(comp.ratio);
        compressor.set_attack_ms(comp.attack_ms);
        compressor.set_release_ms(comp.release_ms);
        compressor.set_makeup_gain_db(comp.makeup_db);

        let lim = &config.output_limiter;
        let mut limiter = Limiter::new(sample_rate);
        limiter.set_threshold_db(lim.threshold_db);
        limiter.set_ceiling_db(lim.ceiling_db);
        limiter.set_release_ms(lim.release_ms);
        limiter.set_lookahead_ms(lim.lookahead_ms);

        let modulation = &config.modulation;
        let mut tremolo = Tremolo::new(sample_rate);
        tremolo.set_rate(modulation.tremolo_rate_hz);
        let echo = Echo::with_delay_ms(sample_rate, modulation.echo_delay_ms);

        let bank = FilterBank::new(
            BandSpec::from_settings(&config.bands),
            sample_rate,
            config.gain.rise_ms,
            config.gain.fall_ms,
        )
        .with_max_block(block_size);

        let initial = ParameterSet::default();
        let smoothing_ms = config.engine.smoothing_ms;

        let processor = Self {
            block_size,
            input_gain: config.engine.input_gain,
            output_normalization: config.engine.output_normalization,
            params: Arc::clone(&params),
            commands,
            sources: SourceManager::new(config.engine.sample_rate, Arc::clone(&status)),
            highpass: Biquad::highpass(
                config.engine.modulator_highpass_hz,
                core::f32::consts::FRAC_1_SQRT_2,
                sample_rate,
            ),
            compressor,
            detector: EnvelopeDetector::new(config.bands.envelope_scale),
            bank,
            gains: BandGainController::new(&config.gain),
            carrier: CarrierGenerator::new(sample_rate, modulation),
            tremolo,
            echo,
            limiter,
            pitch: SmoothedParam::with_config(initial.pitch_hz(), sample_rate, smoothing_ms),
            intensity: SmoothedParam::with_config(initial.intensity(), sample_rate, smoothing_ms),
            vibrato: SmoothedParam::with_config(initial.vibrato(), sample_rate, smoothing_ms),
            meter,
            live: vec![0.0; block_size],
            modulator: vec![0.0; block_size],
            carrier_buf: vec![0.0; block_size],
        };

        let control = ProcessorControl {
            params,
            commands: commands_tx,
            status,
            meter: meter_reader,
        };
        (processor, control)
    }

    /// Render `output.len()` samples.
    ///
    /// `input` is the live input for the same span; it is read as silence
    /// past its end. It only reaches the bus when the mic is the selected
    /// source, but is always recorded while recording.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let mut offset = 0;
        for chunk in output.chunks_mut(self.block_size) {
            let start = offset.min(input.len());
            let end = (offset + chunk.len()).min(input.len());
            self.tick(&input[start..end], chunk);
            offset += chunk.len();
        }
    }

    fn tick(&mut self, input: &[f32], out: &mut [f32]) {
        let n = out.len();
        self.drain_commands();
        self.sync_params();

        let live = &mut self.live[..n];
        for (i, dst) in live.iter_mut().enumerate() {
            let s = input.get(i).copied().unwrap_or(0.0);
            *dst = if s.is_finite() { s } else { 0.0 };
        }

        let modulator = &mut self.modulator[..n];
        self.sources.fill_modulator(live, modulator);
        for s in modulator.iter_mut() {
            let pre = self.highpass.process(*s * self.input_gain);
            *s = self.compressor.process(pre);
        }

        let loudness = self.gains.measure_loudness(modulator);
        self.bank.analyze(modulator, &self.detector);

        let mut intensity = self.intensity.get();
        for _ in 0..n {
            intensity = self.intensity.advance();
        }
        self.gains.apply(&mut self.bank, intensity);

        let carrier = &mut self.carrier_buf[..n];
        for c in carrier.iter_mut() {
            *c = self
                .carrier
                .next_sample(self.pitch.advance(), self.vibrato.advance());
        }

        self.bank.synthesize(carrier, out);
        for y in out.iter_mut() {
            let bus = *y * self.output_normalization;
            let bus = self.tremolo.process(bus);
            let bus = self.echo.process(bus);
            *y = self.limiter.process(bus);
        }

        self.meter.set_vu(loudness);
        self.meter.push(out);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            if let Some(carrier) = self.sources.apply(command) {
                self.carrier.set_buffer(Some(carrier));
            }
        }
        self.sources.publish();
    }

    fn sync_params(&mut self) {
        let p = self.params.snapshot();
        self.pitch.set_target(p.pitch_hz());
        self.intensity.set_target(p.intensity());
        self.vibrato.set_target(p.vibrato());
        self.tremolo.set_depth(p.tremolo());
        self.echo.set_feedback(p.echo());
        self.carrier.set_waveform(p.waveform());
        self.gains
            .set_noise_threshold(self.params.noise_threshold());
    }

    /// Jump every smoothed parameter to the published values.
    ///
    /// Used before an offline render so the first samples already sound
    /// at the requested settings.
    pub fn snap_params(&mut self) {
        self.sync_params();
        self.pitch.snap_to_target();
        self.intensity.snap_to_target();
        self.vibrato.snap_to_target();
    }

    /// Clear all signal state. Parameters, buffers and source selection are
    /// kept.
    pub fn reset(&mut self) {
        self.highpass.clear();
        self.compressor.reset();
        self.bank.reset();
        self.gains.reset();
        self.carrier.reset();
        self.tremolo.reset();
        self.echo.reset();
        self.limiter.reset();
        self.meter.clear();
    }

    /// Maximum samples per tick.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Output delay introduced by the limiter lookahead, in samples.
    pub fn latency_samples(&self) -> usize {
        self.limiter.latency_samples()
    }

    /// The filter bank, for inspecting envelopes and gains.
    pub fn bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Gate loudness as of the last tick.
    pub fn loudness(&self) -> f32 {
        self.gains.loudness()
    }

    /// Source state as of the last tick.
    pub fn selection(&self) -> SourceSelection {
        self.sources.selection()
    }

    /// Whether the carrier currently comes from the loaded carrier file.
    pub fn external_carrier_active(&self) -> bool {
        self.carrier.is_external_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterMapper, Waveform};
    use crate::source::ModulatorSource;
    use core::f32::consts::TAU;
    use vocodex_core::peak_abs;

    fn voice(len: usize) -> Vec<f32> {
        // crude vowel: a few harmonics of 150 Hz
        (0..len)
            .map(|i| {
                let t = i as f32 / 48000.0;
                0.3 * (TAU * 150.0 * t).sin()
                    + 0.2 * (TAU * 600.0 * t).sin()
                    + 0.1 * (TAU * 1100.0 * t).sin()
            })
            .collect()
    }

    fn processor() -> (VocoderProcessor, ProcessorControl) {
        VocoderProcessor::new(&EngineConfig::default())
    }

    #[test]
    fn test_silence_in_silence_out() {
        let (mut proc, _control) = processor();
        let mut out = vec![1.0; 4800];
        proc.process(&[], &mut out);
        assert!(out.iter().all(|s| *s == 0.0));
        assert!(proc.loudness() < 0.05);
    }

    #[test]
    fn test_voice_produces_output() {
        let (mut proc, _control) = processor();
        let input = voice(24000);
        let mut out = vec![0.0; input.len()];
        proc.process(&input, &mut out);
        let tail = peak_abs(&out[12000..]);
        assert!(tail > 0.01, "{tail}");
        assert!(tail <= 1.0);
        assert!(proc.bank().channels().iter().any(|c| c.gain() > 0.1));
    }

    #[test]
    fn test_non_finite_input_is_silence() {
        let (mut proc, _control) = processor();
        let input = vec![f32::NAN; 1024];
        let mut out = vec![0.0; 1024];
        proc.process(&input, &mut out);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_commands_apply_at_tick_boundary() {
        let (mut proc, control) = processor();
        control.send(SourceCommand::SetSource(ModulatorSource::File));
        assert_eq!(control.selection().source, ModulatorSource::Mic);
        proc.process(&[], &mut [0.0; 16]);
        assert_eq!(control.selection().source, ModulatorSource::File);
    }

    #[test]
    fn test_file_modulator_ignores_live_input() {
        let (mut proc, control) = processor();
        control.send(SourceCommand::SetSource(ModulatorSource::File));
        let input = voice(9600);
        let mut out = vec![0.0; input.len()];
        proc.process(&input, &mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_file_modulator_drives_output() {
        let (mut proc, control) = processor();
        control.send(SourceCommand::LoadModulator(Arc::from(voice(4800))));
        control.send(SourceCommand::SetSource(ModulatorSource::File));
        control.send(SourceCommand::SetFilePlaying(true));
        let mut out = vec![0.0; 24000];
        proc.process(&[], &mut out);
        assert!(peak_abs(&out[12000..]) > 0.01);
    }

    #[test]
    fn test_external_carrier_switch() {
        let (mut proc, control) = processor();
        control.send(SourceCommand::LoadCarrier(Arc::from(voice(480))));
        let mut mapper = ParameterMapper::new();
        mapper.params_mut().set_waveform(Waveform::ExternalCarrier);
        control.params.store(mapper.params());
        proc.process(&[], &mut [0.0; 64]);
        assert!(proc.external_carrier_active());
    }

    #[test]
    fn test_intensity_raises_gain() {
        let run = |intensity: f32| {
            let (mut proc, control) = processor();
            let mut mapper = ParameterMapper::new();
            mapper.params_mut().set_intensity(intensity);
            control.params.store(mapper.params());
            proc.snap_params();
            let input = voice(19200);
            proc.process(&input, &mut vec![0.0; input.len()]);
            proc.bank()
                .channels()
                .iter()
                .map(|c| c.target_gain())
                .collect::<Vec<_>>()
        };
        let low = run(0.5);
        let high = run(1.5);
        assert!(low.iter().zip(&high).all(|(l, h)| h >= l));
        assert!(high.iter().sum::<f32>() > low.iter().sum::<f32>());
    }

    #[test]
    fn test_latency_matches_lookahead() {
        let (proc, _control) = processor();
        assert_eq!(proc.latency_samples(), 72);
    }
}

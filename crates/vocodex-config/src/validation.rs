//! Range checks for [`EngineConfig`].
//!
//! Validation never stops at the first problem: a user editing a config file
//! sees every bad value in one error.

use crate::EngineConfig;

/// Small helper that accumulates human-readable problems.
#[derive(Debug, Default)]
struct Problems(Vec<String>);

impl Problems {
    fn range(&mut self, name: &str, value: f32, min: f32, max: f32) {
        if !value.is_finite() || value < min || value > max {
            self.0
                .push(format!("{name} = {value} is outside [{min}, {max}]"));
        }
    }

    fn positive(&mut self, name: &str, value: f32) {
        if !value.is_finite() || value <= 0.0 {
            self.0.push(format!("{name} = {value} must be positive"));
        }
    }

    fn count<T: PartialOrd + std::fmt::Display>(&mut self, name: &str, value: T, min: T, max: T) {
        if value < min || value > max {
            self.0
                .push(format!("{name} = {value} is outside [{min}, {max}]"));
        }
    }
}

/// Every problem in `config`, empty when it is valid.
pub fn collect_problems(config: &EngineConfig) -> Vec<String> {
    let mut p = Problems::default();

    let engine = &config.engine;
    p.count("engine.sample_rate", engine.sample_rate, 8000, 192_000);
    p.count("engine.block_size", engine.block_size, 1, 4096);
    p.range("engine.input_gain", engine.input_gain, 0.0, 100.0);
    p.range(
        "engine.output_normalization",
        engine.output_normalization,
        0.0,
        4.0,
    );
    p.range("engine.smoothing_ms", engine.smoothing_ms, 0.0, 1000.0);

    let nyquist = engine.sample_rate as f32 / 2.0;
    p.range(
        "engine.modulator_highpass_hz",
        engine.modulator_highpass_hz,
        0.0,
        nyquist,
    );

    let bands = &config.bands;
    if bands.frequencies.is_empty() {
        p.0.push("bands.frequencies must list at least one band".to_string());
    }
    for (i, &freq) in bands.frequencies.iter().enumerate() {
        if !freq.is_finite() || freq <= 0.0 || freq >= nyquist {
            p.0.push(format!(
                "bands.frequencies[{i}] = {freq} must be above 0 and below Nyquist ({nyquist} Hz)"
            ));
        }
    }
    p.range("bands.q", bands.q, 0.1, 100.0);
    p.positive("bands.envelope_scale", bands.envelope_scale);

    let gain = &config.gain;
    p.positive("gain.gain_ceiling", gain.gain_ceiling);
    p.positive("gain.max_band_gain", gain.max_band_gain);
    p.range("gain.noise_threshold", gain.noise_threshold, 0.0, 1.0);
    p.positive("gain.loudness_scale", gain.loudness_scale);
    p.positive("gain.rise_ms", gain.rise_ms);
    p.positive("gain.fall_ms", gain.fall_ms);
    p.range("gain.vu_attack", gain.vu_attack, 0.001, 1.0);
    p.range("gain.vu_release", gain.vu_release, 0.001, 1.0);

    let comp = &config.input_compressor;
    p.range("input_compressor.threshold_db", comp.threshold_db, -60.0, 0.0);
    p.range("input_compressor.knee_db", comp.knee_db, 0.0, 40.0);
    p.range("input_compressor.ratio", comp.ratio, 1.0, 20.0);
    p.range("input_compressor.attack_ms", comp.attack_ms, 0.1, 100.0);
    p.range("input_compressor.release_ms", comp.release_ms, 10.0, 1000.0);
    p.range("input_compressor.makeup_db", comp.makeup_db, 0.0, 24.0);

    let lim = &config.output_limiter;
    p.range("output_limiter.threshold_db", lim.threshold_db, -30.0, 0.0);
    p.range("output_limiter.ceiling_db", lim.ceiling_db, -30.0, 0.0);
    p.range("output_limiter.release_ms", lim.release_ms, 10.0, 500.0);
    p.range("output_limiter.lookahead_ms", lim.lookahead_ms, 0.0, 10.0);

    let modulation = &config.modulation;
    p.range("modulation.vibrato_rate_hz", modulation.vibrato_rate_hz, 0.1, 20.0);
    p.range("modulation.vibrato_max_hz", modulation.vibrato_max_hz, 0.0, 100.0);
    p.range("modulation.tremolo_rate_hz", modulation.tremolo_rate_hz, 0.1, 20.0);
    p.range("modulation.echo_delay_ms", modulation.echo_delay_ms, 1.0, 2000.0);

    let devices = &config.devices;
    p.count("devices.buffer_size", devices.buffer_size, 16, 8192);
    p.count("devices.input_channels", devices.input_channels, 1, 8);
    p.count("devices.output_channels", devices.output_channels, 1, 8);

    p.0
}

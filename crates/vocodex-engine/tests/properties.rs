//! Property-based tests for the vocoder signal graph and parameter mapping.
//!
//! Uses proptest to check the invariants that must hold for any input and
//! any parameter combination: bounded output, a closed gate on silence, and
//! monotonic parameter laws.

use proptest::prelude::*;
use vocodex_config::{EngineConfig, GainSettings};
use vocodex_engine::{
    BandGainController, ParamTarget, ParameterMapper, VocoderProcessor, Waveform,
};

fn render(
    input: &[f32],
    pitch: f32,
    intensity: f32,
    vibrato: f32,
    tremolo: f32,
    echo: f32,
    waveform: Waveform,
) -> Vec<f32> {
    let (mut processor, control) = VocoderProcessor::new(&EngineConfig::default());
    let mut mapper = ParameterMapper::new();
    let params = mapper.params_mut();
    params.set_pitch_hz(pitch);
    params.set_intensity(intensity);
    params.set_vibrato(vibrato);
    params.set_tremolo(tremolo);
    params.set_echo(echo);
    params.set_waveform(waveform);
    control.params.store(mapper.params());
    processor.snap_params();

    let mut out = vec![0.0; input.len()];
    processor.process(input, &mut out);
    out
}

fn waveform_strategy() -> impl Strategy<Value = Waveform> {
    prop::sample::select(vec![
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sine,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Any finite input, however hot, with any parameters stays within the
    /// limiter ceiling.
    #[test]
    fn output_is_bounded(
        input in prop::collection::vec(-4.0f32..=4.0f32, 2048),
        pitch in 50.0f32..=400.0,
        intensity in 0.2f32..=3.0,
        vibrato in 0.0f32..=1.0,
        tremolo in 0.0f32..=1.0,
        echo in 0.0f32..=0.7,
        waveform in waveform_strategy(),
    ) {
        let out = render(&input, pitch, intensity, vibrato, tremolo, echo, waveform);
        for &s in &out {
            prop_assert!(s.is_finite());
            prop_assert!(s.abs() <= 1.0, "sample {s} out of range");
        }
    }

    /// A silent modulator never opens the gate.
    #[test]
    fn silence_keeps_gate_closed(
        pitch in 50.0f32..=400.0,
        intensity in 0.2f32..=3.0,
        waveform in waveform_strategy(),
    ) {
        let out = render(&[0.0; 4096], pitch, intensity, 0.0, 0.0, 0.0, waveform);
        prop_assert!(out.iter().all(|s| *s == 0.0));
    }

    /// Band gain grows with envelope and intensity and never exceeds the cap.
    #[test]
    fn target_gain_is_monotonic(
        env in 0.0f32..=1.0,
        d_env in 0.0f32..=0.5,
        intensity in 0.2f32..=3.0,
        d_intensity in 0.0f32..=1.0,
    ) {
        let mut controller = BandGainController::default();
        controller.set_noise_threshold(0.0);
        let base = controller.target_gain(env, intensity);
        prop_assert!(controller.target_gain(env + d_env, intensity) >= base);
        prop_assert!(controller.target_gain(env, intensity + d_intensity) >= base);
        prop_assert!(base <= 4.0);
    }

    /// Below the threshold every band is muted; above it the gain stays
    /// within the cap.
    #[test]
    fn gate_mutes_below_threshold(
        level in 0.0f32..=1.0,
        threshold in 0.0f32..=1.0,
        envelope in 0.0f32..=1.0,
        intensity in 0.2f32..=3.0,
        ticks in 1usize..8,
    ) {
        let max_band_gain = GainSettings::default().max_band_gain;
        let mut controller = BandGainController::default();
        controller.set_noise_threshold(threshold);
        for _ in 0..ticks {
            controller.measure_loudness(&[level; 256]);
        }

        let gain = controller.target_gain(envelope, intensity);
        if controller.loudness() < threshold {
            prop_assert_eq!(gain, 0.0);
        } else {
            prop_assert!((0.0..=max_band_gain).contains(&gain), "gain {gain}");
        }
    }

    /// Pad positions always map into each bound parameter's range.
    #[test]
    fn pad_stays_in_range(
        x in -2.0f32..=3.0,
        y in -2.0f32..=3.0,
        x_idx in 0usize..5,
        y_idx in 0usize..5,
    ) {
        let targets = [
            ParamTarget::Pitch,
            ParamTarget::Intensity,
            ParamTarget::Vibrato,
            ParamTarget::Echo,
            ParamTarget::Tremolo,
        ];
        let (tx, ty) = (targets[x_idx], targets[y_idx]);
        let mut mapper = ParameterMapper::new();
        mapper.set_axis_params(tx, ty);
        mapper.update_pad(x, y);
        for target in [tx, ty] {
            let (min, max) = target.range();
            let v = mapper.params().get(target);
            prop_assert!(v >= min && v <= max, "{target}: {v}");
        }
    }

    /// Moving right never lowers the X parameter; moving down never raises
    /// the Y parameter.
    #[test]
    fn pad_is_monotonic(x in 0.0f32..=1.0, dx in 0.0f32..=1.0, y in 0.0f32..=1.0, dy in 0.0f32..=1.0) {
        let mut a = ParameterMapper::new();
        let mut b = ParameterMapper::new();
        a.update_pad(x, y);
        b.update_pad(x + dx, y + dy);
        prop_assert!(b.params().pitch_hz() >= a.params().pitch_hz());
        prop_assert!(b.params().intensity() <= a.params().intensity());
    }
}

#[test]
fn reset_scenario() {
    let mut mapper = ParameterMapper::new();
    mapper.set_axis_params(ParamTarget::Echo, ParamTarget::Tremolo);
    mapper.update_pad(1.0, 0.0);
    mapper.params_mut().set_vibrato(0.9);
    mapper.reset();

    let p = mapper.params();
    assert_eq!(p.vibrato(), 0.0);
    // the pad re-centers on the bound axes after zeroing
    assert!((p.echo() - 0.35).abs() < 1e-6);
    assert!((p.tremolo() - 0.5).abs() < 1e-6);
}

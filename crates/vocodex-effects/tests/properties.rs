//! Property-based tests for the vocoder bus effects.
//!
//! The limiter bound is the guarantee the rest of the engine leans on, so it
//! is checked against arbitrary signals and settings rather than a few
//! hand-picked ones.

use proptest::prelude::*;
use vocodex_core::Effect;
use vocodex_effects::{Compressor, Echo, Limiter, Tremolo};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No sample ever leaves the limiter above `threshold × ceiling`.
    #[test]
    fn limiter_never_exceeds_ceiling(
        input in prop::collection::vec(-50.0f32..=50.0f32, 1..2048),
        threshold_db in -30.0f32..0.0,
        ceiling_db in -30.0f32..0.0,
        release_ms in 10.0f32..500.0,
        lookahead_ms in 0.0f32..10.0,
    ) {
        let mut lim = Limiter::new(48000.0);
        lim.set_threshold_db(threshold_db);
        lim.set_ceiling_db(ceiling_db);
        lim.set_release_ms(release_ms);
        lim.set_lookahead_ms(lookahead_ms);
        let bound = lim.output_ceiling() * (1.0 + 1e-5);
        for &x in &input {
            let y = lim.process(x);
            prop_assert!(y.abs() <= bound, "{} > {}", y.abs(), bound);
        }
    }

    /// Default limiter output is always strictly inside full scale.
    #[test]
    fn limiter_output_below_full_scale(input in prop::collection::vec(any::<f32>(), 1..512)) {
        let mut lim = Limiter::new(48000.0);
        for &x in &input {
            let y = lim.process(x);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() < 1.0);
        }
    }

    /// Echo output obeys the geometric bound `peak_in / (1 - feedback)`.
    #[test]
    fn echo_is_stable(
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..4096),
        feedback in 0.0f32..=0.7,
        delay_ms in 1.0f32..50.0,
    ) {
        let mut echo = Echo::with_delay_ms(48000.0, delay_ms);
        echo.set_feedback(feedback);
        echo.reset();
        let bound = 1.0 / (1.0 - echo.feedback()) + 1e-3;
        for &x in &input {
            let y = echo.process(x);
            prop_assert!(y.abs() <= bound);
        }
    }

    /// Tremolo only attenuates.
    #[test]
    fn tremolo_never_amplifies(
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..2048),
        depth in 0.0f32..=1.0,
        rate in 0.1f32..20.0,
    ) {
        let mut tremolo = Tremolo::new(48000.0);
        tremolo.set_rate(rate);
        tremolo.set_depth(depth);
        for &x in &input {
            let y = tremolo.process(x);
            prop_assert!(y.abs() <= x.abs() + 1e-6);
        }
    }

    /// The compressor never adds gain with zero makeup.
    #[test]
    fn compressor_never_amplifies(
        input in prop::collection::vec(-2.0f32..=2.0f32, 1..2048),
        threshold_db in -60.0f32..0.0,
        ratio in 1.0f32..20.0,
    ) {
        let mut comp = Compressor::new(48000.0);
        comp.set_threshold_db(threshold_db);
        comp.set_ratio(ratio);
        for &x in &input {
            let y = comp.process(x);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() <= x.abs() + 1e-6);
        }
    }
}

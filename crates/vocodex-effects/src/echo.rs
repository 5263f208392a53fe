//! Fixed-time feedback echo.
//!
//! With feedback `g` the output is `y = x + g * d`, where `d` is the sample
//! written one delay period earlier, and `y` is written back into the line.
//! Each repeat is therefore `g` times the previous one, so `g < 1` keeps the
//! loop stable. The feedback range tops out at 0.7.
//!
//! While the echo is off (feedback at or below 0.001) the line is not fed;
//! instead every pass multiplies its contents by 0.95. Old material fades
//! out in the background and does not burst back when echo is re-enabled.

use vocodex_core::{DelayLine, Effect, SmoothedParam};

/// Maximum feedback amount.
pub const MAX_FEEDBACK: f32 = 0.7;

const OFF_THRESHOLD: f32 = 0.001;
const IDLE_DECAY: f32 = 0.95;

/// Single-tap feedback echo.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Effect;
/// use vocodex_effects::Echo;
///
/// let mut echo = Echo::with_delay_ms(48000.0, 1.0);
/// echo.set_feedback(0.5);
/// echo.reset();
/// let first = echo.process(1.0);
/// assert_eq!(first, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Echo {
    line: DelayLine,
    feedback: SmoothedParam,
    delay_ms: f32,
    sample_rate: f32,
}

impl Echo {
    /// Create a 300 ms echo with feedback off.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_delay_ms(sample_rate, 300.0)
    }

    /// Create an echo with a custom delay time.
    pub fn with_delay_ms(sample_rate: f32, delay_ms: f32) -> Self {
        let delay_ms = delay_ms.clamp(1.0, 2000.0);
        Self {
            line: DelayLine::from_ms(delay_ms, sample_rate),
            feedback: SmoothedParam::standard(0.0, sample_rate),
            delay_ms,
            sample_rate,
        }
    }

    /// Set feedback (0 to [`MAX_FEEDBACK`]), smoothed.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback.set_target(feedback.clamp(0.0, MAX_FEEDBACK));
    }

    /// Target feedback.
    pub fn feedback(&self) -> f32 {
        self.feedback.target()
    }

    /// Delay time in milliseconds.
    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    /// Delay length in samples.
    pub fn delay_samples(&self) -> usize {
        self.line.len()
    }
}

impl Effect for Echo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let feedback = self.feedback.advance();
        let delayed = self.line.peek();
        if feedback > OFF_THRESHOLD {
            let out = input + delayed * feedback;
            self.line.push(out);
            out
        } else {
            self.line.push(delayed * IDLE_DECAY);
            input
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.line = DelayLine::from_ms(self.delay_ms, sample_rate);
        self.feedback.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.line.clear();
        self.feedback.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_length() {
        let echo = Echo::new(48000.0);
        assert_eq!(echo.delay_samples(), 14400);
    }

    #[test]
    fn test_repeats_decay_by_feedback() {
        let mut echo = Echo::with_delay_ms(48000.0, 1.0);
        echo.set_feedback(0.5);
        echo.reset();
        let period = echo.delay_samples();
        assert_eq!(period, 48);

        let mut out = Vec::new();
        for i in 0..(period * 3 + 1) {
            out.push(echo.process(if i == 0 { 1.0 } else { 0.0 }));
        }
        assert_eq!(out[0], 1.0);
        assert!((out[period] - 0.5).abs() < 1e-6);
        assert!((out[2 * period] - 0.25).abs() < 1e-6);
        assert!((out[3 * period] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_off_passes_dry() {
        let mut echo = Echo::new(48000.0);
        for i in 0..1000 {
            let x = (i as f32 * 0.01).sin();
            assert_eq!(echo.process(x), x);
        }
    }

    #[test]
    fn test_idle_line_decays() {
        let mut echo = Echo::with_delay_ms(48000.0, 1.0);
        echo.set_feedback(0.5);
        echo.reset();
        for _ in 0..48 {
            echo.process(1.0);
        }
        echo.set_feedback(0.0);
        echo.feedback.snap_to_target();
        // ten idle passes: 0.95^10 of the stored level remains
        for _ in 0..(48 * 10) {
            echo.process(0.0);
        }
        echo.set_feedback(0.5);
        echo.feedback.snap_to_target();
        let y = echo.process(0.0);
        let expected = 0.95_f32.powi(10) * 0.5;
        assert!((y - expected).abs() < 1e-4, "{y} vs {expected}");
    }

    #[test]
    fn test_stable_under_max_feedback() {
        let mut echo = Echo::with_delay_ms(48000.0, 10.0);
        echo.set_feedback(1.5);
        assert_eq!(echo.feedback(), MAX_FEEDBACK);
        let mut peak = 0.0_f32;
        for _ in 0..48000 {
            peak = peak.max(echo.process(0.5).abs());
        }
        // geometric series bound: 0.5 / (1 - 0.7)
        assert!(peak <= 0.5 / 0.3 + 1e-3);
    }
}

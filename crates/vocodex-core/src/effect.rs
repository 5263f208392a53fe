//! Core Effect trait.
//!
//! The vocoder's bus processors (compressor, tremolo, echo, limiter) all
//! implement [`Effect`] so the processor can treat them uniformly and tests
//! can drive them sample-by-sample or block-by-block.

/// Mono audio processor.
///
/// Object-safe, and every method is callable from a real-time audio thread.
///
/// # Example
///
/// ```rust
/// use vocodex_core::Effect;
///
/// struct Gain(f32);
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.0
///     }
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain(0.5);
/// let mut buf = [1.0, -1.0];
/// g.process_block_inplace(&mut buf);
/// assert_eq!(buf, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process a single sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples. Buffers must have equal length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Recalculate sample-rate-dependent state.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without changing parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Zero unless the effect looks ahead.
    fn latency_samples(&self) -> usize {
        0
    }
}

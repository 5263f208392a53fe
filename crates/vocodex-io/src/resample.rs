//! Linear resampling and peak normalization.
//!
//! Loaded modulator and carrier files are brought to the engine's working
//! rate once, at load time, so playback is a plain index walk.

use vocodex_core::{lerp, peak_abs};

/// Peak level every loaded or recorded buffer is normalized to.
pub const NORMALIZE_PEAK: f32 = 0.9;

/// Resample `input` from `src_rate` to `dst_rate` by linear interpolation.
///
/// Output length is `floor(len * dst / src)`. Output sample `i` reads
/// position `s = i * src / dst` and interpolates between `floor(s)` and the
/// next sample, clamped at the end of the input.
///
/// ```rust
/// use vocodex_io::resample_linear;
///
/// let up = resample_linear(&[0.0, 1.0], 1, 2);
/// assert_eq!(up, vec![0.0, 0.5, 1.0, 1.0]);
/// ```
pub fn resample_linear(input: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if input.is_empty() || src_rate == 0 || dst_rate == 0 {
        return Vec::new();
    }
    if src_rate == dst_rate {
        return input.to_vec();
    }

    let out_len = (input.len() as u64 * dst_rate as u64 / src_rate as u64) as usize;
    let step = src_rate as f64 / dst_rate as f64;
    let last = input.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            lerp(input[idx], input[next], frac)
        })
        .collect()
}

/// Scale `samples` in place so the largest magnitude equals `target`.
///
/// Silence and non-finite peaks are left untouched. Returns the applied gain.
pub fn normalize_peak(samples: &mut [f32], target: f32) -> f32 {
    let peak = peak_abs(samples);
    if peak <= 0.0 || !peak.is_finite() {
        return 1.0;
    }
    let gain = target / peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
    gain
}

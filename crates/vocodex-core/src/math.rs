//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`]
//!
//! # Block Statistics
//!
//! - [`mean_abs`] - band envelope measure
//! - [`rms`] - loudness measure
//! - [`peak_abs`] - normalization and metering

use libm::{expf, logf, sqrtf};

/// Convert decibels to linear gain.
///
/// ```rust
/// use vocodex_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Values at or below 1e-10 map to -200 dB.
///
/// ```rust
/// use vocodex_core::linear_to_db;
///
/// assert!((linear_to_db(0.5) + 6.02).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Linear interpolation: `a` at `t = 0`, `b` at `t = 1`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush values below 1e-20 to zero.
///
/// Used in every feedback path (filter history, echo line, smoothers)
/// where a decaying signal would otherwise drift into the subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Mean absolute value. Zero for an empty slice.
#[inline]
pub fn mean_abs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32
}

/// Root-mean-square level. Zero for an empty slice.
#[inline]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    sqrtf(sum / samples.len() as f32)
}

/// Largest absolute sample. Zero for an empty slice.
#[inline]
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
}

//! Parameter smoothing for zipper-free changes.
//!
//! Every user-facing control in the vocoder (pitch, intensity, effect depths)
//! is applied through a [`SmoothedParam`], and every band gain through an
//! [`AsymmetricSmoother`]. Both are one-pole lowpass filters toward a target:
//!
//! ```text
//! y[n] = y[n-1] + coeff * (target - y[n-1])
//! coeff = 1 - exp(-1 / (tau * sample_rate))
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vocodex_core::SmoothedParam;
//!
//! let mut pitch = SmoothedParam::with_config(140.0, 48000.0, 30.0);
//! pitch.set_target(220.0);
//!
//! for _ in 0..480 {
//!     let _hz = pitch.advance();
//! }
//! assert!(pitch.get() > 140.0);
//! ```

use libm::expf;

/// One-pole coefficient for a time constant in milliseconds.
///
/// A non-positive time or rate yields `1.0` (instant).
#[inline]
pub fn one_pole_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    if time_ms <= 0.0 || sample_rate <= 0.0 {
        1.0
    } else {
        let samples = time_ms / 1000.0 * sample_rate;
        1.0 - expf(-1.0 / samples)
    }
}

/// A parameter with built-in exponential smoothing.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// Smoothing coefficient (1 = instant, near 0 = very slow)
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Time constant used by [`fast`](Self::fast).
    pub const FAST_MS: f32 = 5.0;
    /// Time constant used by [`standard`](Self::standard).
    pub const STANDARD_MS: f32 = 30.0;

    /// Create a smoothed parameter with no smoothing (instant changes).
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// 5 ms smoothing, for thresholds and gains.
    pub fn fast(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, Self::FAST_MS)
    }

    /// 30 ms smoothing, for performance controls.
    pub fn standard(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, Self::STANDARD_MS)
    }

    /// Set the value the parameter smooths towards.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set smoothing time in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the value is within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jump to the target value.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = one_pole_coeff(self.smoothing_time_ms, self.sample_rate);
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// One-pole smoother with direction-dependent time constants.
///
/// Rising toward a larger target uses the rise coefficient, falling toward a
/// smaller target uses the fall coefficient. Band gains use a fast rise to
/// keep consonant onsets and a slow fall to avoid gain chatter.
///
/// # Example
///
/// ```rust
/// use vocodex_core::AsymmetricSmoother;
///
/// let mut gain = AsymmetricSmoother::new(48000.0, 5.0, 50.0);
/// gain.set_target(1.0);
/// for _ in 0..480 {
///     gain.advance();
/// }
/// assert!(gain.get() > 0.8);
/// ```
#[derive(Debug, Clone)]
pub struct AsymmetricSmoother {
    current: f32,
    target: f32,
    rise_coeff: f32,
    fall_coeff: f32,
    rise_ms: f32,
    fall_ms: f32,
    sample_rate: f32,
}

impl AsymmetricSmoother {
    /// Create a smoother resting at zero.
    pub fn new(sample_rate: f32, rise_ms: f32, fall_ms: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            rise_coeff: one_pole_coeff(rise_ms, sample_rate),
            fall_coeff: one_pole_coeff(fall_ms, sample_rate),
            rise_ms,
            fall_ms,
            sample_rate,
        }
    }

    /// Set the value to move toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let coeff = if self.target > self.current {
            self.rise_coeff
        } else {
            self.fall_coeff
        };
        self.current = crate::math::flush_denormal(
            self.current + coeff * (self.target - self.current),
        );
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Rise time constant in milliseconds.
    pub fn rise_ms(&self) -> f32 {
        self.rise_ms
    }

    /// Fall time constant in milliseconds.
    pub fn fall_ms(&self) -> f32 {
        self.fall_ms
    }

    /// Update sample rate and both coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.rise_coeff = one_pole_coeff(self.rise_ms, sample_rate);
        self.fall_coeff = one_pole_coeff(self.fall_ms, sample_rate);
    }

    /// Return to rest at zero.
    pub fn reset(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
    }
}

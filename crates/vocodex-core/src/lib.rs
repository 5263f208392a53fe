//! Vocodex Core - DSP primitives for the channel vocoder
//!
//! This crate provides the building blocks the vocoder engine is assembled
//! from. Everything here is allocation-free once constructed, so it can run
//! inside a real-time audio callback.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for mono audio processors
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - One-pole exponential smoothing toward a target
//! - [`AsymmetricSmoother`] - One-pole smoothing with separate rise and fall
//!   time constants (fast attack, slow decay)
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//!
//! ## Oscillators & Delay
//!
//! - [`Oscillator`] - Audio-rate carrier oscillator with PolyBLEP anti-aliasing
//! - [`Lfo`] - Low-frequency oscillator for vibrato and tremolo
//! - [`DelayLine`] - Fixed-length circular delay line
//!
//! ## Dynamics
//!
//! - [`EnvelopeFollower`] - Peak envelope detection with attack/release
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`linear_to_db`], [`lerp`], etc.
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! vocodex-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod oscillator;
pub mod param;

pub use biquad::{Biquad, bandpass_coefficients, highpass_coefficients};
pub use delay::DelayLine;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use lfo::Lfo;
pub use math::{
    db_to_linear, flush_denormal, lerp, linear_to_db, mean_abs, ms_to_samples, peak_abs, rms,
};
pub use oscillator::{Oscillator, Waveshape};
pub use param::{AsymmetricSmoother, SmoothedParam};

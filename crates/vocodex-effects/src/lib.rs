//! Vocodex Effects - bus processors for the channel vocoder
//!
//! Built on vocodex-core, each type implements [`vocodex_core::Effect`]:
//!
//! - [`Compressor`] - Soft-knee feed-forward compressor guarding the analysis path
//! - [`Limiter`] - Lookahead brickwall limiter on the final output
//! - [`Echo`] - Fixed-time feedback echo with a decaying idle state
//! - [`Tremolo`] - Sine amplitude modulation of the summed bus
//!
//! ## Example
//!
//! ```rust
//! use vocodex_core::Effect;
//! use vocodex_effects::{Echo, Limiter, Tremolo};
//!
//! let mut tremolo = Tremolo::new(48000.0);
//! let mut echo = Echo::new(48000.0);
//! let mut limiter = Limiter::new(48000.0);
//! tremolo.set_depth(0.5);
//! echo.set_feedback(0.3);
//!
//! let mut bus = [0.8_f32; 256];
//! tremolo.process_block_inplace(&mut bus);
//! echo.process_block_inplace(&mut bus);
//! limiter.process_block_inplace(&mut bus);
//! assert!(bus.iter().all(|s| s.abs() < 1.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod echo;
pub mod limiter;
pub mod tremolo;

pub use compressor::Compressor;
pub use echo::Echo;
pub use limiter::Limiter;
pub use tremolo::Tremolo;

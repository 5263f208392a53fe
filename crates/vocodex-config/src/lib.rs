//! Engine configuration for the vocodex vocoder.
//!
//! Everything the engine treats as fixed at construction time lives here:
//! band layout, gain law constants, dynamics settings, modulation rates and
//! device preferences. Runtime performance parameters (pitch, intensity and
//! the effect amounts) are not configuration; they flow through the engine's
//! parameter mapper.
//!
//! Files are TOML with one table per section. Every field has a default, so
//! a file only needs the values it changes:
//!
//! ```toml
//! [bands]
//! q = 8.0
//!
//! [gain]
//! noise_threshold = 0.08
//!
//! [devices]
//! input_device = "USB"
//! ```
//!
//! # Example
//!
//! ```rust
//! use vocodex_config::EngineConfig;
//!
//! let config = EngineConfig::from_toml("[gain]\nnoise_threshold = 0.1\n").unwrap();
//! assert_eq!(config.gain.noise_threshold, 0.1);
//! assert_eq!(config.bands.frequencies.len(), 20);
//! config.validate().unwrap();
//! ```

mod engine_config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Range checks for [`EngineConfig`].
pub mod validation;

pub use engine_config::{
    BandSettings, CompressorSettings, DEFAULT_BAND_FREQUENCIES, DeviceSettings, EngineConfig,
    EngineSettings, GainSettings, LimiterSettings, ModulationSettings,
};
pub use error::ConfigError;
pub use paths::{default_config_path, user_config_dir};

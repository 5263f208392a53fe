//! The [`EngineConfig`] document and its sections.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Voice-optimized band centers in Hz, denser where formants live.
pub const DEFAULT_BAND_FREQUENCIES: [f32; 20] = [
    100.0, 160.0, 240.0, 350.0, 480.0, 640.0, 840.0, 1100.0, 1400.0, 1750.0, 2150.0, 2600.0,
    3100.0, 3700.0, 4400.0, 5300.0, 6500.0, 8000.0, 10500.0, 14000.0,
];

/// Complete engine configuration.
///
/// # TOML Format
///
/// ```toml
/// [engine]
/// sample_rate = 48000
/// block_size = 256
///
/// [bands]
/// frequencies = [200.0, 400.0, 800.0, 1600.0, 3200.0]
/// q = 6.0
///
/// [output_limiter]
/// threshold_db = -6.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Processing rate, block size and bus gains.
    pub engine: EngineSettings,
    /// Filter bank layout.
    pub bands: BandSettings,
    /// Band gain law and noise gate.
    pub gain: GainSettings,
    /// Compressor ahead of the analysis bank.
    pub input_compressor: CompressorSettings,
    /// Limiter on the final output.
    pub output_limiter: LimiterSettings,
    /// LFO rates and echo time.
    pub modulation: ModulationSettings,
    /// Audio device preferences.
    pub devices: DeviceSettings,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Load `path` if given, else the platform config file if it exists,
    /// else the defaults. The result is validated either way.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = crate::default_config_path();
                if default_path.is_file() {
                    Self::load(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every range, collecting all problems into one
    /// [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = crate::validation::collect_problems(self);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Working sample rate as `f32`.
    pub fn sample_rate_hz(&self) -> f32 {
        self.engine.sample_rate as f32
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Working sample rate in Hz. Loaded files are resampled to it.
    pub sample_rate: u32,
    /// Frames per processing tick. Parameter and source changes land on tick
    /// boundaries.
    pub block_size: usize,
    /// Linear preamp gain on the modulator.
    pub input_gain: f32,
    /// Linear gain on the summed band bus.
    pub output_normalization: f32,
    /// Cutoff of the anti-rumble high-pass on the modulator, in Hz.
    pub modulator_highpass_hz: f32,
    /// Time constant of performance parameter smoothing, in ms.
    pub smoothing_ms: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 256,
            input_gain: 2.0,
            output_normalization: 0.55,
            modulator_highpass_hz: 200.0,
            smoothing_ms: 30.0,
        }
    }
}

/// `[bands]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandSettings {
    /// Band center frequencies in Hz.
    pub frequencies: Vec<f32>,
    /// Q shared by every analysis and synthesis filter.
    pub q: f32,
    /// Multiplier from mean absolute band level to envelope.
    pub envelope_scale: f32,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            frequencies: DEFAULT_BAND_FREQUENCIES.to_vec(),
            q: 12.0,
            envelope_scale: 8.0,
        }
    }
}

/// `[gain]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainSettings {
    /// Band gain at full envelope and unit intensity.
    pub gain_ceiling: f32,
    /// Hard upper bound on any band gain.
    pub max_band_gain: f32,
    /// Loudness below which every band is muted.
    pub noise_threshold: f32,
    /// Multiplier from modulator RMS to loudness.
    pub loudness_scale: f32,
    /// Band gain rise time constant in ms.
    pub rise_ms: f32,
    /// Band gain fall time constant in ms.
    pub fall_ms: f32,
    /// Per-tick loudness smoothing factor while rising.
    pub vu_attack: f32,
    /// Per-tick loudness smoothing factor while falling.
    pub vu_release: f32,
}

impl Default for GainSettings {
    fn default() -> Self {
        Self {
            gain_ceiling: 2.0,
            max_band_gain: 4.0,
            noise_threshold: 0.05,
            loudness_scale: 4.0,
            rise_ms: 5.0,
            fall_ms: 50.0,
            vu_attack: 0.25,
            vu_release: 0.08,
        }
    }
}

/// `[input_compressor]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Knee width in dB.
    pub knee_db: f32,
    /// Compression ratio.
    pub ratio: f32,
    /// Attack in ms.
    pub attack_ms: f32,
    /// Release in ms.
    pub release_ms: f32,
    /// Makeup gain in dB.
    pub makeup_db: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack_ms: 3.0,
            release_ms: 250.0,
            makeup_db: 0.0,
        }
    }
}

/// `[output_limiter]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterSettings {
    /// Detection threshold in dB.
    pub threshold_db: f32,
    /// Ceiling in dB, applied on top of the threshold.
    pub ceiling_db: f32,
    /// Release in ms.
    pub release_ms: f32,
    /// Lookahead in ms. Adds the same amount of output latency.
    pub lookahead_ms: f32,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold_db: -3.0,
            ceiling_db: -0.3,
            release_ms: 100.0,
            lookahead_ms: 1.5,
        }
    }
}

/// `[modulation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulationSettings {
    /// Vibrato LFO rate in Hz.
    pub vibrato_rate_hz: f32,
    /// Pitch excursion at full vibrato, in Hz.
    pub vibrato_max_hz: f32,
    /// Tremolo LFO rate in Hz.
    pub tremolo_rate_hz: f32,
    /// Echo delay in ms.
    pub echo_delay_ms: f32,
}

impl Default for ModulationSettings {
    fn default() -> Self {
        Self {
            vibrato_rate_hz: 5.0,
            vibrato_max_hz: 20.0,
            tremolo_rate_hz: 6.0,
            echo_delay_ms: 300.0,
        }
    }
}

/// `[devices]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Capture device name filter. `None` uses the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,
    /// Playback device name filter. `None` uses the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
    /// Device buffer size in frames.
    pub buffer_size: u32,
    /// Channels requested from the capture device. Downmixed to mono.
    pub input_channels: u16,
    /// Channels of the playback device. The mono bus is copied to each.
    pub output_channels: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            input_device: None,
            output_device: None,
            buffer_size: 256,
            input_channels: 1,
            output_channels: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.engine.sample_rate, 48000);
        assert_eq!(config.bands.frequencies.len(), 20);
        assert_eq!(config.bands.q, 12.0);
        assert_eq!(config.gain.noise_threshold, 0.05);
        assert_eq!(config.output_limiter.threshold_db, -3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml(
            r#"
[gain]
rise_ms = 2.0

[devices]
output_device = "Speakers"
"#,
        )
        .unwrap();
        assert_eq!(config.gain.rise_ms, 2.0);
        assert_eq!(config.gain.fall_ms, 50.0);
        assert_eq!(config.devices.output_device.as_deref(), Some("Speakers"));
        assert_eq!(config.engine, EngineSettings::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = EngineConfig::default();
        config.bands.frequencies = vec![300.0, 900.0, 2700.0];
        config.modulation.echo_delay_ms = 250.0;
        let toml_str = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_bad_type_is_parse_error() {
        let err = EngineConfig::from_toml("[engine]\nsample_rate = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}

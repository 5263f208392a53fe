//! Integration tests for loading and saving engine configuration files.

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use vocodex_config::{ConfigError, EngineConfig};

#[test]
fn save_creates_parent_dirs_and_roundtrips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("config.toml");

    let mut config = EngineConfig::default();
    config.gain.noise_threshold = 0.08;
    config.devices.input_device = Some("USB Mic".to_string());
    config.save(&path).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn load_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_or_default_validates_explicit_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[bands]\nfrequencies = [100.0, 30000.0]\nq = 500.0").unwrap();

    let err = EngineConfig::load_or_default(Some(file.path())).unwrap_err();
    let problems = err.problems();
    assert_eq!(problems.len(), 2, "{problems:?}");
    assert!(problems.iter().any(|p| p.contains("bands.frequencies[1]")));
    assert!(problems.iter().any(|p| p.contains("bands.q")));
}

#[test]
fn load_or_default_accepts_partial_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[modulation]\necho_delay_ms = 150.0").unwrap();

    let config = EngineConfig::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.modulation.echo_delay_ms, 150.0);
    assert_eq!(config.modulation.vibrato_max_hz, 20.0);
}

#[test]
fn malformed_toml_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[engine\nsample_rate = 48000").unwrap();
    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse(_)));
}

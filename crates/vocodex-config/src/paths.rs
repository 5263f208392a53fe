//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/vocodex/`
//! - macOS: `~/Library/Application Support/vocodex/`
//! - Windows: `%APPDATA%\vocodex\`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "vocodex";

/// File name of the engine configuration inside [`user_config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the engine configuration file used when none is given explicitly.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

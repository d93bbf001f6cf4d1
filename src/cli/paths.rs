//! Path utilities for wearwolf.
//!
//! All state lives under `~/.wearwolf/`:
//! - `~/.wearwolf/config.toml` - main configuration

use std::path::PathBuf;

/// Returns the wearwolf home directory (`~/.wearwolf/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wearwolf")
}

/// Returns the default config file path (`~/.wearwolf/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

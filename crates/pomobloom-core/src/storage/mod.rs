mod config;

pub use config::{Config, NotificationsConfig, SoundConfig, WindowConfig};

use std::path::PathBuf;

/// Returns `~/.config/pomobloom[-dev]/` based on POMOBLOOM_ENV.
///
/// Set POMOBLOOM_ENV=dev to use development data directory.
/// The directory is not created; nothing is written until a config is saved.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOBLOOM_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("pomobloom-dev")
    } else {
        base_dir.join("pomobloom")
    }
}

mod config;

pub use config::{
    ClockConfig, Config, IdentityBackend, IdentityConfig, LoggingConfig, RemoteConfig,
    ENV_ANON_KEY, ENV_REMOTE_URL,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Environment variable pointing the data directory somewhere else entirely.
pub const ENV_HOME: &str = "PUREPATH_HOME";

/// Returns `~/.config/purepath[-dev|-test]/` based on PUREPATH_ENV.
///
/// Set PUREPATH_ENV=dev to use development data directory.
/// PUREPATH_HOME, when set, is used as-is.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os(ENV_HOME) {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PUREPATH_ENV").unwrap_or_else(|_| "production".to_string());

            match env.as_str() {
                "dev" => base_dir.join("purepath-dev"),
                "test" => base_dir.join("purepath-test"),
                _ => base_dir.join("purepath"),
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

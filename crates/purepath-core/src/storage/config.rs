//! TOML-based application configuration.
//!
//! Stores:
//! - Remote record store endpoint and credentials
//! - Identity slot backend (file or OS keyring)
//! - Clock tick interval
//! - Default log filter
//!
//! Configuration is stored at `~/.config/purepath/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::identity::{FileSlot, IdentitySlot, KeyringSlot};

/// Environment variable overriding `remote.url`.
pub const ENV_REMOTE_URL: &str = "PUREPATH_REMOTE_URL";
/// Environment variable overriding `remote.anon_key`.
pub const ENV_ANON_KEY: &str = "PUREPATH_ANON_KEY";

/// Remote record store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://<project>.supabase.co`.
    #[serde(default)]
    pub url: String,
    /// Publishable (anon) API key.
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Upper bound on the startup fetch, including the first-use create.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    File,
    Keyring,
}

/// Identity slot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_backend")]
    pub backend: IdentityBackend,
}

/// Clock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Logging configuration. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/purepath/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_table() -> String {
    "streaks".into()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_identity_backend() -> IdentityBackend {
    IdentityBackend::File
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_log_filter() -> String {
    "warn".into()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: default_table(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            backend: default_identity_backend(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl IdentityConfig {
    /// Open the configured identity slot. File slots live in `dir`.
    pub fn open_slot(&self, dir: &Path) -> Box<dyn IdentitySlot> {
        match self.backend {
            IdentityBackend::File => Box::new(FileSlot::in_dir(dir)),
            IdentityBackend::Keyring => Box::new(KeyringSlot::new()),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config location inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default (written back to disk).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values that would make the store unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("remote.fetch_timeout_secs", self.remote.fetch_timeout_secs),
            ("remote.request_timeout_secs", self.remote.request_timeout_secs),
            ("clock.tick_interval_ms", self.clock.tick_interval_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if self.remote.table.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "remote.table".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Apply `PUREPATH_REMOTE_URL` / `PUREPATH_ANON_KEY` overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_REMOTE_URL) {
            self.remote.url = url;
        }
        if let Ok(key) = std::env::var(ENV_ANON_KEY) {
            self.remote.anon_key = key;
        }
        self
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.remote.table, "streaks");
        assert_eq!(parsed.identity.backend, IdentityBackend::File);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [remote]
            url = "https://example.supabase.co"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.remote.url, "https://example.supabase.co");
        assert_eq!(parsed.remote.fetch_timeout_secs, 10);
        assert_eq!(parsed.clock.tick_interval_ms, 1000);
        assert_eq!(parsed.logging.filter, "warn");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("remote.table").as_deref(), Some("streaks"));
        assert_eq!(cfg.get("remote.fetch_timeout_secs").as_deref(), Some("10"));
        assert_eq!(cfg.get("identity.backend").as_deref(), Some("file"));
        assert!(cfg.get("remote.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("remote.url", "https://demo.supabase.co").unwrap();
        cfg.set("remote.fetch_timeout_secs", "3").unwrap();
        cfg.set("identity.backend", "keyring").unwrap();

        assert_eq!(cfg.remote.url, "https://demo.supabase.co");
        assert_eq!(cfg.remote.fetch_timeout_secs, 3);
        assert_eq!(cfg.identity.backend, IdentityBackend::Keyring);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("remote.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("clock.tick_interval_ms", "soon").is_err());
        assert!(cfg.set("identity.backend", "floppy").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_zero_timeouts() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("remote.fetch_timeout_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.remote.fetch_timeout_secs, 10);
    }

    #[test]
    fn set_rejects_whole_section() {
        let mut cfg = Config::default();
        assert!(cfg.set("remote", "{}").is_err());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("remote.anon_key", "sb_publishable_test").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.remote.anon_key, "sb_publishable_test");
    }

    #[test]
    fn load_from_corrupt_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[remote\nurl = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn remote_configured_requires_url() {
        let mut cfg = Config::default();
        assert!(!cfg.remote.is_configured());
        cfg.remote.url = "https://x.supabase.co".into();
        assert!(cfg.remote.is_configured());
    }
}

//! Core error types for purepath-core.
//!
//! Local failures (validation, configuration, identity slot I/O) are
//! returned to the caller. Remote failures are mostly swallowed and logged
//! by [`crate::sync::SyncedStore`], but the store clients still report them
//! precisely so the store can tell "not found" apart from "unavailable".

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for purepath-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote record store errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Identity slot errors
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Private key shorter than the minimum after trimming.
    #[error("Private key must be at least {min} characters (got {actual})")]
    IdentityTooShort { min: usize, actual: usize },
}

/// Errors reported by a [`crate::remote::RecordStore`].
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No record exists for the key. Expected on first use.
    #[error("Record not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Remote store rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("Rate limited")]
    RateLimited,

    #[error("Remote API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend unreachable for reasons other than transport (used by test stores).
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid remote URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound)
    }
}

/// Errors from the durable identity slot.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

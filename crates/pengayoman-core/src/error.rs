//! Core error types for pengayoman-core.
//!
//! Most failures in this crate degrade to a safe default instead of reaching
//! the UI, but the underlying operations still report typed errors so the
//! degrading call sites can log what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pengayoman-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote prayer API errors
    #[error("Prayer API error: {0}")]
    PrayerApi(#[from] PrayerApiError),

    /// Ad SDK errors
    #[error("Ad error: {0}")]
    Ad(#[from] AdError),

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

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open storage at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Storage is locked")]
    Locked,

    /// Storage backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
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

/// Remote prayer API errors.
#[derive(Error, Debug)]
pub enum PrayerApiError {
    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint URL could not be built
    #[error("Invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Ad SDK errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// SDK initialization failed
    #[error("Ad SDK initialization failed: {0}")]
    InitFailed(String),

    /// Ad request could not be issued
    #[error("Ad load failed for {surface}: {message}")]
    LoadFailed { surface: String, message: String },

    /// Show call was rejected by the SDK
    #[error("Ad show failed for {surface}: {message}")]
    ShowFailed { surface: String, message: String },

    /// Request configuration could not be applied
    #[error("Ad request configuration rejected: {0}")]
    ConfigurationRejected(String),

    /// No tokio runtime to schedule reloads on
    #[error("No async runtime available for ad reload scheduling")]
    NoRuntime,
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Unavailable("disk full".into()).into();
        assert_eq!(err.to_string(), "Storage error: Storage unavailable: disk full");
    }

    #[test]
    fn ad_error_formats_surface() {
        let err = AdError::LoadFailed {
            surface: "rewarded".into(),
            message: "no fill".into(),
        };
        assert_eq!(err.to_string(), "Ad load failed for rewarded: no fill");
    }
}

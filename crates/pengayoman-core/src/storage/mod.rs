mod config;
pub mod database;
mod memory;

pub use config::{AdsConfig, Config, PrayerApiConfig, RewardConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Durable string-keyed storage that survives app restarts.
///
/// Implementations take `&self` so a single store can be shared behind an
/// `Arc` by every service of an [`AppContext`](crate::AppContext).
pub trait KvStore: Send + Sync {
    /// Get a value, `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/pengayoman[-dev]/` based on PENGAYOMAN_ENV.
///
/// Set PENGAYOMAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let dir = if is_dev_env() {
        base_dir.join("pengayoman-dev")
    } else {
        base_dir.join("pengayoman")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Whether PENGAYOMAN_ENV selects the development build.
pub fn is_dev_env() -> bool {
    std::env::var("PENGAYOMAN_ENV")
        .map(|v| v == "dev")
        .unwrap_or(false)
}

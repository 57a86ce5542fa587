//! Persistence: the key-value store seam, its key space and implementations,
//! plus the TOML configuration file.

mod config;
pub mod keys;
pub mod memory;
pub mod sqlite;

pub use config::{Config, DayConfig, LimitsConfig};
pub use keys::StorageKey;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Durable string storage keyed by string. No cross-key transactions.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Delete several keys. Stops at the first failure.
    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `TIMRE_DATA_DIR` overrides the location entirely. Otherwise this is
/// `~/.config/timre/`, or `~/.config/timre-dev/` when `TIMRE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TIMRE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMRE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timre-dev")
            } else {
                base_dir.join("timre")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

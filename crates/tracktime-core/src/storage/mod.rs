//! Durable state: key-value backends, the activity persistence adapter,
//! and TOML configuration.

mod config;
pub mod database;
mod memory;
pub mod persistence;

pub use config::{ActivitiesConfig, Config, StorageConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use persistence::{PersistenceAdapter, STORAGE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// A string-keyed, string-valued medium local to the user.
///
/// Writes overwrite; there are no partial updates.
pub trait KeyValueStore: Send {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `TRACKTIME_DATA_DIR` wins when set. Otherwise `~/.config/tracktime[-dev]/`,
/// where `TRACKTIME_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("TRACKTIME_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TRACKTIME_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tracktime-dev")
            } else {
                base_dir.join("tracktime")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(StorageError::DataDir)?;
    Ok(dir)
}

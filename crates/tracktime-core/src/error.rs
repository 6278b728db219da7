//! Core error types for tracktime-core.
//!
//! Intent failures (`ActivityError`) are recoverable at the point of the
//! offending call and are meant to be rendered by the presentation layer.
//! Persistence failures never cross the load boundary; save failures are
//! logged by the store.

use std::path::PathBuf;
use thiserror::Error;

use crate::activity::ActivityId;

/// Core error type for tracktime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected activity intent
    #[error(transparent)]
    Activity(#[from] ActivityError),

    /// Persistence-related errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of a single activity intent. State is unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActivityError {
    /// Another activity already accrues time.
    #[error("Only one timer can run at a time; stop '{running_name}' first")]
    ConcurrentTimer {
        running_id: ActivityId,
        running_name: String,
    },

    /// Manual time edit was negative or not a finite number.
    #[error("Invalid time value {value}: must be a finite, non-negative number of minutes")]
    InvalidTime { value: f64 },

    /// The activity is running and the operation needs it stopped.
    #[error("Activity {id} is running; stop it first")]
    Running { id: ActivityId },

    /// No activity with this id.
    #[error("No activity with id {id}")]
    NotFound { id: ActivityId },
}

/// Key-value persistence errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Stored value could not be decoded into activity records.
    #[error("Failed to decode stored activities under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Activity records could not be encoded.
    #[error("Failed to encode activities: {0}")]
    Encode(#[source] serde_json::Error),

    /// Backend read/write failed.
    #[error("Storage backend failed: {0}")]
    Storage(#[from] StorageError),
}

/// Key-value backend errors.
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
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
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
    fn concurrent_timer_message_names_running_activity() {
        let err = ActivityError::ConcurrentTimer {
            running_id: ActivityId::new("a"),
            running_name: "Writing".into(),
        };
        assert_eq!(
            err.to_string(),
            "Only one timer can run at a time; stop 'Writing' first"
        );
    }

    #[test]
    fn activity_error_converts_into_core_error() {
        let err: CoreError = ActivityError::NotFound {
            id: ActivityId::new("missing"),
        }
        .into();
        assert!(matches!(err, CoreError::Activity(ActivityError::NotFound { .. })));
        assert_eq!(err.to_string(), "No activity with id missing");
    }
}

//! Error types for the fallible boundaries (storage, save files, config)
//!
//! Not-found conditions inside the simulation are not errors; they surface as
//! `bool`/`Option`/outcome values instead.

/// Failure reported by a [`Storage`](crate::platform::Storage) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend refused or failed the operation.
    #[error("storage backend failed on '{key}': {reason}")]
    Backend { key: String, reason: String },
}

/// Failure while saving or restoring persisted simulation state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to (de)serialize '{key}': {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("save '{key}' has version {found}, expected {expected}")]
    VersionMismatch {
        key: String,
        found: u32,
        expected: u32,
    },
}

/// Failure while parsing tuning/configuration data.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

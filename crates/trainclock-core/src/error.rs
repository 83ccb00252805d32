//! Core error types for trainclock-core.
//!
//! Engine commands never fail: an invalid command is ignored and reported as
//! `None`. Errors only come from the edges of the library (configuration,
//! catalog data, persistence and audio playback).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for trainclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog (presets and roster) errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Audio playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
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

    /// The background writer has shut down
    #[error("Session writer is no longer running")]
    WriterClosed,
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

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    ParseFailed(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Duplicate preset id: {0}")]
    DuplicatePreset(String),
}

/// Audio playback errors. Always logged by the dispatcher, never propagated
/// into timer state.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No asset configured for cue '{0}'")]
    MissingAsset(String),

    #[error("Playback of {location} failed: {message}")]
    PlaybackFailed { location: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseBusy => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

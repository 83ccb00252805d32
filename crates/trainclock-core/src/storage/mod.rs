mod config;
pub mod database;
pub mod writer;

pub use config::{AudioConfig, Config, IntervalConfig, YoYoConfig};
pub use database::{Database, SessionRecord};
pub use writer::BackgroundStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::yoyo::TestSession;

/// Receives every completed Yo-Yo test session.
pub trait SessionStore: Send {
    /// # Errors
    /// Returns an error if the session could not be persisted or queued.
    fn save_session(&self, session: &TestSession) -> Result<()>;
}

/// Returns `~/.config/trainclock[-dev]/` based on TRAINCLOCK_ENV.
///
/// Set TRAINCLOCK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TRAINCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("trainclock-dev")
    } else {
        base_dir.join("trainclock")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

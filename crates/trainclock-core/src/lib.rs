//! # Trainclock Core Library
//!
//! Core logic for two training timers: a configurable interval-workout timer
//! and the Yo-Yo Intermittent Recovery Test Level 1. The `trainclock` CLI is
//! a thin terminal front end over the same library.
//!
//! ## Architecture
//!
//! - **Engines**: wall-clock-based state machines. The caller invokes
//!   `tick()` periodically; elapsed time is always re-derived from the clock,
//!   never accumulated from tick counts
//! - **Events**: every command and tick reports what changed as [`Event`]s,
//!   including the audio cues to play
//! - **Audio**: [`CueDispatcher`] maps cue events onto an [`AudioPlayer`]
//! - **Storage**: TOML configuration and SQLite persistence of completed tests
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: interval workout engine
//! - [`YoYoTimer`]: Yo-Yo IR1 test engine
//! - [`Catalog`]: workout presets and athlete roster
//! - [`Config`]: application configuration
//! - [`Database`]: test session persistence

pub mod audio;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod events;
pub mod interval;
pub mod storage;
pub mod yoyo;

pub use audio::{AudioAsset, AudioPlayer, Cue, CueDispatcher, SilentPlayer};
pub use catalog::{Catalog, Player};
pub use clock::{format_clock, now_ms, Stopwatch, Timeline};
pub use error::{AudioError, CatalogError, ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use interval::{IntervalTimer, PhaseSchedule, PhaseType, TimerStatus, WorkoutPreset};
pub use storage::{BackgroundStore, Config, Database, SessionStore};
pub use yoyo::{AthleteStatus, ShuttleTable, TestSession, YoYoSnapshot, YoYoTimer};

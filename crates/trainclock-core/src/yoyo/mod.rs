//! Yo-Yo Intermittent Recovery Test Level 1.

mod athlete;
mod beeps;
mod engine;
mod protocol;
mod session;

pub use athlete::{AthleteResult, AthleteStatus, FailureOutcome};
pub use beeps::{BeepCue, BeepMachine, BeepState};
pub use engine::{YoYoSnapshot, YoYoTimer};
pub use protocol::{ShuttleInfo, ShuttleTable, YOYO_IR1_PROTOCOL};
pub use session::{SessionStatus, TestSession};

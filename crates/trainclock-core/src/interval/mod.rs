//! Interval workouts: phase schedule, timer engine and audio cue selection.

mod cues;
mod engine;
mod schedule;

pub use cues::{select_cues, IntervalCue};
pub use engine::{IntervalState, IntervalTimer, TimerStatus};
pub use schedule::{
    generate_phases, generate_phases_with_prepare, Exercise, ExerciseType, Phase, PhaseSchedule,
    PhaseType, Side, WorkoutPreset, PREPARE_SECS,
};

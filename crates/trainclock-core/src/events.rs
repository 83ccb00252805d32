use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{IntervalCue, PhaseType, TimerStatus};
use crate::yoyo::{AthleteStatus, BeepCue, TestSession};

/// Every state change in either engine produces an Event.
/// Front ends render them; the cue dispatcher turns cue-carrying events
/// into sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // ── Interval timer ──
    PresetSelected {
        preset_id: String,
        total_phases: usize,
        total_time: u32,
        at: DateTime<Utc>,
    },
    TimerStarted {
        phase_index: usize,
        at: DateTime<Utc>,
    },
    TimerPaused {
        current_time: f64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        current_time: f64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    TimerReset {
        phase_index: usize,
        current_time: f64,
        at: DateTime<Utc>,
    },
    PhaseSkipped {
        from_phase: usize,
        to_phase: usize,
        at: DateTime<Utc>,
    },
    /// The active phase changed. `cues` are the sounds to play, in order.
    PhaseChanged {
        from_phase: Option<usize>,
        to_phase: usize,
        phase_type: PhaseType,
        cues: Vec<IntervalCue>,
        at: DateTime<Utc>,
    },
    WorkoutFinished {
        total_time: u32,
        at: DateTime<Utc>,
    },
    /// Full state snapshot of the interval timer.
    StateSnapshot {
        status: TimerStatus,
        current_time: f64,
        phase_index: Option<usize>,
        phase_type: Option<PhaseType>,
        phase_label: String,
        phase_time_remaining: f64,
        total_time: u32,
        phase_progress: f64,
        workout_progress: f64,
        at: DateTime<Utc>,
    },

    // ── Yo-Yo test ──
    TestStarted {
        session_id: String,
        participants: usize,
        at: DateTime<Utc>,
    },
    TestPaused {
        elapsed_time: f64,
        at: DateTime<Utc>,
    },
    TestResumed {
        elapsed_time: f64,
        at: DateTime<Utc>,
    },
    TestReset {
        at: DateTime<Utc>,
    },
    ShuttleAdvanced {
        shuttle_index: usize,
        level: u32,
        shuttle: u32,
        speed: f64,
        at: DateTime<Utc>,
    },
    ShuttleCue {
        shuttle_index: usize,
        cue: BeepCue,
        at: DateTime<Utc>,
    },
    AthleteAdded {
        athlete_id: String,
        status: AthleteStatus,
        at: DateTime<Utc>,
    },
    AthleteWarned {
        athlete_id: String,
        shuttle_index: Option<usize>,
        at: DateTime<Utc>,
    },
    AthleteDroppedOut {
        athlete_id: String,
        drop_out_shuttle: u32,
        drop_out_time: f64,
        estimated_distance: u32,
        at: DateTime<Utc>,
    },
    AthleteStatusChanged {
        athlete_id: String,
        status: AthleteStatus,
        at: DateTime<Utc>,
    },
    TestCompleted {
        session: Box<TestSession>,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::PresetSelected { at, .. }
            | Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerStopped { at }
            | Event::TimerReset { at, .. }
            | Event::PhaseSkipped { at, .. }
            | Event::PhaseChanged { at, .. }
            | Event::WorkoutFinished { at, .. }
            | Event::StateSnapshot { at, .. }
            | Event::TestStarted { at, .. }
            | Event::TestPaused { at, .. }
            | Event::TestResumed { at, .. }
            | Event::TestReset { at }
            | Event::ShuttleAdvanced { at, .. }
            | Event::ShuttleCue { at, .. }
            | Event::AthleteAdded { at, .. }
            | Event::AthleteWarned { at, .. }
            | Event::AthleteDroppedOut { at, .. }
            | Event::AthleteStatusChanged { at, .. }
            | Event::TestCompleted { at, .. } => *at,
        }
    }
}

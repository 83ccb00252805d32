//! Per-shuttle beep sequencing: horn at the start, a short turn signal at
//! the midpoint, a fanfare at the end.

use serde::{Deserialize, Serialize};

use super::protocol::ShuttleInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeepCue {
    /// Long air horn at the shuttle start.
    Horn,
    /// Short signal at the turning point.
    Turn,
    /// Fanfare when the shuttle ends.
    Fanfare,
}

impl BeepCue {
    pub fn name(&self) -> &'static str {
        match self {
            BeepCue::Horn => "horn",
            BeepCue::Turn => "turn",
            BeepCue::Fanfare => "fanfare",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeepState {
    #[default]
    None,
    Start,
    Turn,
    Finish,
}

/// Fires each cue at most once per shuttle, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeepMachine {
    state: BeepState,
    shuttle_index: Option<usize>,
}

impl BeepMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BeepState {
        self.state
    }

    pub fn tracked_shuttle(&self) -> Option<usize> {
        self.shuttle_index
    }

    /// Follow `index`; switching shuttles re-arms the machine.
    pub fn track(&mut self, index: usize) {
        if self.shuttle_index != Some(index) {
            self.shuttle_index = Some(index);
            self.state = BeepState::None;
        }
    }

    /// Advance at most one step for elapsed time `t`.
    pub fn step(&mut self, shuttle: &ShuttleInfo, t: f64) -> Option<BeepCue> {
        let (next, cue) = match self.state {
            BeepState::None if t >= shuttle.start_time => (BeepState::Start, BeepCue::Horn),
            BeepState::Start if t >= shuttle.turn_time() => (BeepState::Turn, BeepCue::Turn),
            BeepState::Turn if t >= shuttle.end_time => (BeepState::Finish, BeepCue::Fanfare),
            _ => return None,
        };
        self.state = next;
        Some(cue)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

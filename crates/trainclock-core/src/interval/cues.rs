//! Audio cue selection for phase transitions.

use serde::{Deserialize, Serialize};

use super::schedule::{Phase, PhaseType, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalCue {
    Start,
    End,
    Rest,
    Finish,
    Transition,
    SideChange,
}

impl IntervalCue {
    pub fn name(&self) -> &'static str {
        match self {
            IntervalCue::Start => "start",
            IntervalCue::End => "end",
            IntervalCue::Rest => "rest",
            IntervalCue::Finish => "finish",
            IntervalCue::Transition => "transition",
            IntervalCue::SideChange => "side-change",
        }
    }
}

/// Cues to fire when the active phase changes from `previous` to `next`.
///
/// Returns nothing when the phase index did not change. The type cue comes
/// first, followed by the set-change and side-change cues.
pub fn select_cues(previous: Option<&Phase>, next: &Phase) -> Vec<IntervalCue> {
    if previous.map(|p| p.phase_index) == Some(next.phase_index) {
        return Vec::new();
    }

    let mut cues = Vec::new();
    match next.phase_type {
        t if t.is_effort() => cues.push(IntervalCue::Start),
        PhaseType::Rest => cues.push(IntervalCue::Rest),
        PhaseType::Finished => cues.push(IntervalCue::Finish),
        _ => {}
    }

    if let Some(prev) = previous {
        if prev.set_number != next.set_number {
            cues.push(IntervalCue::Transition);
        }
        if prev.side != Side::None && next.side != Side::None && prev.side != next.side {
            cues.push(IntervalCue::SideChange);
        }
    }
    cues
}

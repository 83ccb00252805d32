//! Workout descriptions and the phase schedule generated from them.

use serde::{Deserialize, Serialize};

use crate::clock::{Span, Timeline};

/// Seconds of preparation before the first exercise.
pub const PREPARE_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Work,
    Hold,
    Reps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseType {
    Prepare,
    Work,
    Hold,
    Reps,
    Rest,
    Finished,
}

impl PhaseType {
    /// Work, hold and reps phases are the "effort" phases.
    pub fn is_effort(&self) -> bool {
        matches!(self, PhaseType::Work | PhaseType::Hold | PhaseType::Reps)
    }
}

impl From<ExerciseType> for PhaseType {
    fn from(t: ExerciseType) -> Self {
        match t {
            ExerciseType::Work => PhaseType::Work,
            ExerciseType::Hold => PhaseType::Hold,
            ExerciseType::Reps => PhaseType::Reps,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub sets: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    /// Seconds per set (per side for side-specific exercises).
    pub duration: u32,
    /// Seconds of rest after each set (and after each side).
    #[serde(default)]
    pub rest_after: u32,
    #[serde(default)]
    pub side_specific: bool,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl WorkoutPreset {
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

/// One timed segment of the flattened workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub phase_type: PhaseType,
    pub name: String,
    /// Seconds.
    pub duration: u32,
    pub side: Side,
    pub set_number: u32,
    pub total_sets: u32,
    pub exercise_index: usize,
    pub phase_index: usize,
    pub total_phases: usize,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Generate the schedule with the standard preparation time.
pub fn generate_phases(preset: &WorkoutPreset) -> Vec<Phase> {
    generate_phases_with_prepare(preset, PREPARE_SECS)
}

/// Expand a preset into its flat, ordered phase list.
///
/// `prepare`, then per exercise and per set either `left, rest?, right, rest?`
/// or `effort, rest?`, then a zero-length `finished`. Indices are assigned in
/// a second pass.
pub fn generate_phases_with_prepare(preset: &WorkoutPreset, prepare_secs: u32) -> Vec<Phase> {
    let mut phases = vec![Phase {
        phase_type: PhaseType::Prepare,
        name: "Get Ready!".into(),
        duration: prepare_secs,
        side: Side::None,
        set_number: 1,
        total_sets: preset.total_sets(),
        exercise_index: 0,
        phase_index: 0,
        total_phases: 0,
        instructions: Some(format!(
            "The workout will begin in {prepare_secs} seconds."
        )),
    }];

    for (exercise_index, exercise) in preset.exercises.iter().enumerate() {
        let effort = |side: Side, set: u32| Phase {
            phase_type: exercise.exercise_type.into(),
            name: exercise.name.clone(),
            duration: exercise.duration,
            side,
            set_number: set,
            total_sets: exercise.sets,
            exercise_index,
            phase_index: 0,
            total_phases: 0,
            instructions: exercise.instructions.clone(),
        };
        let rest = |set: u32| Phase {
            phase_type: PhaseType::Rest,
            name: "Rest".into(),
            duration: exercise.rest_after,
            side: Side::None,
            set_number: set,
            total_sets: exercise.sets,
            exercise_index,
            phase_index: 0,
            total_phases: 0,
            instructions: None,
        };

        for set in 1..=exercise.sets {
            let sides: &[Side] = if exercise.side_specific {
                &[Side::Left, Side::Right]
            } else {
                &[Side::None]
            };
            for &side in sides {
                phases.push(effort(side, set));
                if exercise.rest_after > 0 {
                    phases.push(rest(set));
                }
            }
        }
    }

    let (last_index, last_sets) = preset
        .exercises
        .iter()
        .enumerate()
        .last()
        .map(|(i, e)| (i, e.sets))
        .unwrap_or((0, 0));
    phases.push(Phase {
        phase_type: PhaseType::Finished,
        name: "Workout Complete!".into(),
        duration: 0,
        side: Side::None,
        set_number: last_sets,
        total_sets: last_sets,
        exercise_index: last_index,
        phase_index: 0,
        total_phases: 0,
        instructions: None,
    });

    let total_phases = phases.len();
    for (i, phase) in phases.iter_mut().enumerate() {
        phase.phase_index = i;
        phase.total_phases = total_phases;
    }
    phases
}

/// A generated phase list with its cumulative start offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    phases: Vec<Phase>,
    /// `starts[i]` = sum of the durations of phases `0..i`.
    starts: Vec<u32>,
    total_secs: u32,
}

impl PhaseSchedule {
    pub fn new(phases: Vec<Phase>) -> Self {
        let mut starts = Vec::with_capacity(phases.len());
        let mut acc = 0u32;
        for phase in &phases {
            starts.push(acc);
            acc = acc.saturating_add(phase.duration);
        }
        Self {
            phases,
            starts,
            total_secs: acc,
        }
    }

    pub fn from_preset(preset: &WorkoutPreset, prepare_secs: u32) -> Self {
        Self::new(generate_phases_with_prepare(preset, prepare_secs))
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn first(&self) -> Option<&Phase> {
        self.phases.first()
    }

    pub fn last(&self) -> Option<&Phase> {
        self.phases.last()
    }

    /// Sum of all phase durations, in seconds.
    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    /// Cumulative start offset of phase `index`.
    pub fn start_of(&self, index: usize) -> Option<u32> {
        self.starts.get(index).copied()
    }

    /// Cumulative end offset of phase `index`.
    pub fn end_of(&self, index: usize) -> Option<u32> {
        let phase = self.phases.get(index)?;
        Some(self.starts[index].saturating_add(phase.duration))
    }

    /// First phase of the set containing `index`: walk backwards while the
    /// previous phase shares the same exercise and set number.
    pub fn set_start(&self, index: usize) -> usize {
        let mut target = index.min(self.phases.len().saturating_sub(1));
        while target > 0 {
            let current = &self.phases[target];
            let previous = &self.phases[target - 1];
            if previous.exercise_index != current.exercise_index
                || previous.set_number != current.set_number
            {
                break;
            }
            target -= 1;
        }
        target
    }
}

impl Timeline for PhaseSchedule {
    fn len(&self) -> usize {
        self.phases.len()
    }

    fn span(&self, index: usize) -> Option<Span> {
        Some(Span {
            start: f64::from(self.start_of(index)?),
            end: f64::from(self.end_of(index)?),
        })
    }
}

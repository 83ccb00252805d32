//! Interval timer engine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` on every frame of
//! its render loop.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Running <-> Paused
//!            |
//!            v
//!         Finished
//! stop: any -> Ready (first phase)
//! reset: any -> Ready (first phase of the current set)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::new();
//! timer.select_preset(preset);
//! timer.start();
//! // In a loop:
//! for event in timer.tick() { dispatcher.dispatch(&event); }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cues::select_cues;
use super::schedule::{Phase, PhaseSchedule, WorkoutPreset, PREPARE_SECS};
use crate::clock::{now_ms, Stopwatch, Timeline};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Ready,
    Running,
    Paused,
    Finished,
}

/// Read-only view handed to presentation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalState {
    pub status: TimerStatus,
    /// Seconds elapsed in the whole workout.
    pub current_time: f64,
    pub active_phase: Option<Phase>,
    pub phase_time_remaining: f64,
    pub total_time: u32,
    pub phases: Vec<Phase>,
    pub selected_preset: Option<WorkoutPreset>,
}

/// Core interval timer.
///
/// Elapsed time comes from a [`Stopwatch`], never from counting ticks, so a
/// throttled render loop only delays updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    preset: Option<WorkoutPreset>,
    schedule: PhaseSchedule,
    status: TimerStatus,
    current_time: f64,
    active_index: Option<usize>,
    phase_time_remaining: f64,
    stopwatch: Stopwatch,
    /// Phase index the last `PhaseChanged` event was emitted for.
    #[serde(default)]
    announced_index: Option<usize>,
    prepare_secs: u32,
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::with_prepare_secs(PREPARE_SECS)
    }

    /// Create a timer whose schedules open with `prepare_secs` of preparation.
    pub fn with_prepare_secs(prepare_secs: u32) -> Self {
        Self {
            preset: None,
            schedule: PhaseSchedule::default(),
            status: TimerStatus::Ready,
            current_time: 0.0,
            active_index: None,
            phase_time_remaining: 0.0,
            stopwatch: Stopwatch::new(),
            announced_index: None,
            prepare_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn active_phase(&self) -> Option<&Phase> {
        self.active_index.and_then(|i| self.schedule.phase(i))
    }

    pub fn phase_time_remaining(&self) -> f64 {
        self.phase_time_remaining
    }

    pub fn total_time(&self) -> u32 {
        self.schedule.total_secs()
    }

    pub fn phases(&self) -> &[Phase] {
        self.schedule.phases()
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    pub fn selected_preset(&self) -> Option<&WorkoutPreset> {
        self.preset.as_ref()
    }

    /// 0.0 .. 1.0 progress within the active phase.
    ///
    /// With no active phase, or a zero-length one such as `finished`, the
    /// progress is 0.
    pub fn phase_progress(&self) -> f64 {
        match self.active_phase() {
            Some(phase) if phase.duration > 0 => {
                let duration = f64::from(phase.duration);
                (1.0 - self.phase_time_remaining / duration).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// 0.0 .. 1.0 progress across the whole workout.
    pub fn workout_progress(&self) -> f64 {
        let total = self.total_time();
        if total == 0 {
            return 0.0;
        }
        (self.current_time / f64::from(total)).clamp(0.0, 1.0)
    }

    pub fn state(&self) -> IntervalState {
        IntervalState {
            status: self.status,
            current_time: self.current_time,
            active_phase: self.active_phase().cloned(),
            phase_time_remaining: self.phase_time_remaining,
            total_time: self.total_time(),
            phases: self.schedule.phases().to_vec(),
            selected_preset: self.preset.clone(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let phase = self.active_phase();
        Event::StateSnapshot {
            status: self.status,
            current_time: self.current_time,
            phase_index: self.active_index,
            phase_type: phase.map(|p| p.phase_type),
            phase_label: phase.map(|p| p.name.clone()).unwrap_or_default(),
            phase_time_remaining: self.phase_time_remaining,
            total_time: self.total_time(),
            phase_progress: self.phase_progress(),
            workout_progress: self.workout_progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn select_preset(&mut self, preset: WorkoutPreset) -> Option<Event> {
        self.schedule = PhaseSchedule::from_preset(&preset, self.prepare_secs);
        let event = Event::PresetSelected {
            preset_id: preset.id.clone(),
            total_phases: self.schedule.len(),
            total_time: self.schedule.total_secs(),
            at: Utc::now(),
        };
        self.preset = Some(preset);
        self.rewind_to_first_phase();
        // a fresh schedule has no previous phase to announce against
        self.announced_index = self.active_index;
        Some(event)
    }

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now: u64) -> Option<Event> {
        match self.status {
            TimerStatus::Ready | TimerStatus::Paused if !self.schedule.is_empty() => {
                let resumed = self.status == TimerStatus::Paused;
                self.status = TimerStatus::Running;
                self.stopwatch.start_at(now);
                if resumed {
                    Some(Event::TimerResumed {
                        current_time: self.current_time,
                        at: Utc::now(),
                    })
                } else {
                    Some(Event::TimerStarted {
                        phase_index: self.active_index.unwrap_or(0),
                        at: Utc::now(),
                    })
                }
            }
            _ => {
                tracing::debug!(status = ?self.status, "start ignored");
                None
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now: u64) -> Option<Event> {
        if self.status != TimerStatus::Running {
            tracing::debug!(status = ?self.status, "pause ignored");
            return None;
        }
        self.stopwatch.pause_at(now);
        self.status = TimerStatus::Paused;
        Some(Event::TimerPaused {
            current_time: self.current_time,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    /// Continue from a pause with a fresh wall-clock reference.
    pub fn resume_at(&mut self, now: u64) -> Option<Event> {
        if self.status != TimerStatus::Paused {
            tracing::debug!(status = ?self.status, "resume ignored");
            return None;
        }
        self.start_at(now)
    }

    /// Back to the first phase of the current preset, `Ready`. The phase
    /// change is announced on the next tick.
    pub fn stop(&mut self) -> Option<Event> {
        if self.schedule.is_empty() {
            return None;
        }
        self.rewind_to_first_phase();
        Some(Event::TimerStopped { at: Utc::now() })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_at(now_ms())
    }

    /// Rewind to the start of the current set, `Ready`.
    pub fn reset_at(&mut self, now: u64) -> Option<Event> {
        let active = self.active_index?;
        let target = self.schedule.set_start(active);
        let start = f64::from(self.schedule.start_of(target)?);

        self.stopwatch.pause_at(now);
        self.stopwatch.seek_at(start, now);
        self.status = TimerStatus::Ready;
        self.current_time = start;
        self.active_index = Some(target);
        self.phase_time_remaining = self
            .schedule
            .phase(target)
            .map(|p| f64::from(p.duration))
            .unwrap_or(0.0);

        Some(Event::TimerReset {
            phase_index: target,
            current_time: start,
            at: Utc::now(),
        })
    }

    pub fn skip(&mut self) -> Option<Event> {
        self.skip_at(now_ms())
    }

    /// Jump to the end of the active phase, as if that time had elapsed.
    pub fn skip_at(&mut self, now: u64) -> Option<Event> {
        let from = self.active_index?;
        let end = f64::from(self.schedule.end_of(from)?);
        self.stopwatch.seek_at(end, now);
        self.apply_time(end, now);
        let to = self.active_index?;
        if to == from {
            return None;
        }
        Some(Event::PhaseSkipped {
            from_phase: from,
            to_phase: to,
            at: Utc::now(),
        })
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Advance with the render loop.
    ///
    /// While running, elapsed time is re-derived from the wall clock. In any
    /// status, a change of the active phase since the last announcement
    /// yields a `PhaseChanged` event carrying its audio cues.
    pub fn tick_at(&mut self, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        let was_finished = self.status == TimerStatus::Finished;

        if self.status == TimerStatus::Running {
            let new_time = self.stopwatch.elapsed_secs_at(now).max(self.current_time);
            self.apply_time(new_time, now);
        }

        if self.active_index != self.announced_index {
            if let Some(next) = self.active_phase() {
                let previous = self.announced_index.and_then(|i| self.schedule.phase(i));
                let cues = select_cues(previous, next);
                tracing::debug!(
                    from = ?self.announced_index,
                    to = next.phase_index,
                    phase = ?next.phase_type,
                    "phase changed"
                );
                events.push(Event::PhaseChanged {
                    from_phase: self.announced_index,
                    to_phase: next.phase_index,
                    phase_type: next.phase_type,
                    cues,
                    at: Utc::now(),
                });
            }
            self.announced_index = self.active_index;
        }

        if !was_finished && self.status == TimerStatus::Finished {
            events.push(Event::WorkoutFinished {
                total_time: self.total_time(),
                at: Utc::now(),
            });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Recompute phase membership for `new_time`.
    fn apply_time(&mut self, new_time: f64, now: u64) {
        let total = f64::from(self.schedule.total_secs());
        if new_time >= total {
            self.status = TimerStatus::Finished;
            self.current_time = total;
            self.active_index = self.schedule.len().checked_sub(1);
            self.phase_time_remaining = 0.0;
            self.stopwatch.pause_at(now);
            self.stopwatch.seek_at(total, now);
            return;
        }

        let index = self
            .schedule
            .segment_at(new_time)
            .or(self.active_index)
            .unwrap_or(0);
        let end = self.schedule.end_of(index).map(f64::from).unwrap_or(total);
        self.active_index = Some(index);
        self.phase_time_remaining = (end - new_time).max(0.0);
        self.current_time = new_time;
    }

    fn rewind_to_first_phase(&mut self) {
        self.status = TimerStatus::Ready;
        self.current_time = 0.0;
        self.stopwatch.reset();
        self.active_index = if self.schedule.is_empty() { None } else { Some(0) };
        self.phase_time_remaining = self
            .schedule
            .first()
            .map(|p| f64::from(p.duration))
            .unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::cues::IntervalCue;
    use crate::interval::schedule::{Exercise, ExerciseType, PhaseType, Side};

    fn side_plank() -> WorkoutPreset {
        WorkoutPreset {
            id: "side".into(),
            name: "Side plank".into(),
            description: String::new(),
            exercises: vec![Exercise {
                name: "Side Forearm Plank".into(),
                exercise_type: ExerciseType::Hold,
                sets: 2,
                reps: None,
                duration: 30,
                rest_after: 15,
                side_specific: true,
                instructions: None,
            }],
        }
    }

    fn running_timer() -> IntervalTimer {
        let mut timer = IntervalTimer::new();
        timer.select_preset(side_plank());
        timer.start_at(0);
        timer
    }

    #[test]
    fn select_preset_prepares_first_phase() {
        let mut timer = IntervalTimer::new();
        assert!(timer.active_phase().is_none());
        timer.select_preset(side_plank());
        assert_eq!(timer.status(), TimerStatus::Ready);
        assert_eq!(timer.total_time(), 190);
        assert_eq!(timer.phases().len(), 10);
        assert_eq!(timer.active_phase().map(|p| p.phase_type), Some(PhaseType::Prepare));
        assert_eq!(timer.phase_time_remaining(), 10.0);
    }

    #[test]
    fn start_without_preset_is_ignored() {
        let mut timer = IntervalTimer::new();
        assert!(timer.start_at(0).is_none());
        assert_eq!(timer.status(), TimerStatus::Ready);
    }

    #[test]
    fn tick_maps_elapsed_time_to_phase() {
        let mut timer = running_timer();
        timer.tick_at(12_500);
        let phase = timer.active_phase().unwrap();
        assert_eq!(phase.phase_index, 1);
        assert_eq!(phase.side, Side::Left);
        assert!((timer.phase_time_remaining() - 27.5).abs() < 1e-9);
        assert!((timer.current_time() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn phase_change_carries_cues() {
        let mut timer = running_timer();
        assert!(timer.tick_at(5_000).is_empty());
        let events = timer.tick_at(10_000);
        match events.as_slice() {
            [Event::PhaseChanged { to_phase, cues, .. }] => {
                assert_eq!(*to_phase, 1);
                assert_eq!(cues, &vec![IntervalCue::Start]);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn missed_ticks_do_not_desynchronize() {
        let mut timer = running_timer();
        timer.tick_at(1_000);
        // render loop throttled for 60s
        timer.tick_at(61_000);
        assert!((timer.current_time() - 61.0).abs() < 1e-9);
        assert_eq!(timer.active_phase().unwrap().phase_index, 3);
    }

    #[test]
    fn finishing_clamps_to_last_phase() {
        let mut timer = running_timer();
        let events = timer.tick_at(500_000);
        assert_eq!(timer.status(), TimerStatus::Finished);
        assert_eq!(timer.current_time(), 190.0);
        assert_eq!(timer.phase_time_remaining(), 0.0);
        assert_eq!(
            timer.active_phase().map(|p| p.phase_type),
            Some(PhaseType::Finished)
        );
        assert!(events.iter().any(|e| matches!(e, Event::WorkoutFinished { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::PhaseChanged { cues, .. } if cues.contains(&IntervalCue::Finish)
        )));
        assert!(timer.start_at(600_000).is_none());
    }

    #[test]
    fn pause_freezes_time() {
        let mut timer = running_timer();
        timer.tick_at(4_000);
        timer.pause_at(4_000);
        timer.tick_at(30_000);
        assert_eq!(timer.current_time(), 4.0);
        timer.resume_at(100_000);
        timer.tick_at(100_000);
        assert_eq!(timer.current_time(), 4.0);
        timer.tick_at(101_000);
        assert_eq!(timer.current_time(), 5.0);
    }

    #[test]
    fn skip_advances_exactly_one_phase() {
        let mut timer = running_timer();
        timer.tick_at(2_000);
        let event = timer.skip_at(2_000);
        assert!(matches!(
            event,
            Some(Event::PhaseSkipped { from_phase: 0, to_phase: 1, .. })
        ));
        assert_eq!(timer.current_time(), 10.0);
        // continues from the new position
        timer.tick_at(3_000);
        assert!((timer.current_time() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn skip_from_last_rest_finishes() {
        let mut timer = running_timer();
        timer.tick_at(180_000);
        assert_eq!(timer.active_phase().unwrap().phase_index, 8);
        timer.skip_at(180_000);
        assert_eq!(timer.status(), TimerStatus::Finished);
        assert_eq!(timer.active_phase().unwrap().phase_index, 9);
        assert!(timer.skip_at(180_000).is_none());
    }

    #[test]
    fn reset_returns_to_start_of_current_set() {
        let mut timer = running_timer();
        // mid-rest after the right side of set 2: 10 + 90 + 30 + 15 + 30 + 5
        timer.tick_at(180_000);
        let phase = timer.active_phase().unwrap().clone();
        assert_eq!((phase.phase_type, phase.set_number), (PhaseType::Rest, 2));

        timer.reset_at(180_000);
        let target = timer.active_phase().unwrap();
        assert_eq!(timer.status(), TimerStatus::Ready);
        assert_eq!(target.phase_index, 5);
        assert_eq!((target.exercise_index, target.set_number), (0, 2));
        assert_eq!(target.side, Side::Left);
        assert_eq!(timer.current_time(), 100.0);
        assert_eq!(timer.phase_time_remaining(), 30.0);

        // restart continues from the set start
        timer.start_at(200_000);
        timer.tick_at(201_000);
        assert!((timer.current_time() - 101.0).abs() < 1e-9);
    }

    fn two_plain_sets() -> WorkoutPreset {
        WorkoutPreset {
            id: "plain".into(),
            name: "Plain".into(),
            description: String::new(),
            exercises: vec![Exercise {
                name: "Squat".into(),
                exercise_type: ExerciseType::Reps,
                sets: 2,
                reps: Some(10),
                duration: 30,
                rest_after: 15,
                side_specific: false,
                instructions: None,
            }],
        }
    }

    #[test]
    fn stop_returns_to_first_phase() {
        let mut timer = running_timer();
        timer.tick_at(50_000);
        timer.stop();
        assert_eq!(timer.status(), TimerStatus::Ready);
        assert_eq!(timer.current_time(), 0.0);
        assert_eq!(timer.active_phase().unwrap().phase_index, 0);
    }

    #[test]
    fn stop_from_second_set_announces_transition() {
        let mut timer = IntervalTimer::new();
        timer.select_preset(two_plain_sets());
        timer.start_at(0);
        // 10 + 30 + 15 = 55: set 2 work
        timer.tick_at(60_000);
        let phase = timer.active_phase().unwrap();
        assert_eq!((phase.phase_index, phase.set_number), (3, 2));

        timer.stop();
        let events = timer.tick_at(61_000);
        match events.as_slice() {
            [Event::PhaseChanged { from_phase, to_phase, phase_type, cues, .. }] => {
                assert_eq!(*from_phase, Some(3));
                assert_eq!(*to_phase, 0);
                assert_eq!(*phase_type, PhaseType::Prepare);
                assert_eq!(cues, &vec![IntervalCue::Transition]);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        // announced once
        assert!(timer.tick_at(62_000).is_empty());
    }

    #[test]
    fn stop_from_first_set_announces_without_cues() {
        let mut timer = IntervalTimer::new();
        timer.select_preset(two_plain_sets());
        timer.start_at(0);
        timer.tick_at(20_000);
        assert_eq!(timer.active_phase().unwrap().set_number, 1);

        timer.stop();
        let events = timer.tick_at(21_000);
        match events.as_slice() {
            [Event::PhaseChanged { to_phase: 0, cues, .. }] => assert!(cues.is_empty()),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn select_preset_is_silent() {
        let mut timer = IntervalTimer::new();
        timer.select_preset(side_plank());
        assert!(timer.tick_at(0).is_empty());
    }

    #[test]
    fn progress_without_active_phase_is_zero() {
        let timer = IntervalTimer::new();
        assert_eq!(timer.phase_progress(), 0.0);
        assert_eq!(timer.workout_progress(), 0.0);

        let mut timer = running_timer();
        timer.tick_at(15_000);
        assert!((timer.phase_progress() - 5.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let mut timer = IntervalTimer::new();
        timer.select_preset(side_plank());
        match timer.snapshot() {
            Event::StateSnapshot {
                status,
                phase_index,
                total_time,
                ..
            } => {
                assert_eq!(status, TimerStatus::Ready);
                assert_eq!(phase_index, Some(0));
                assert_eq!(total_time, 190);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}

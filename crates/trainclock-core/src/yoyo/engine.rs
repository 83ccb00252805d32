//! Yo-Yo IR1 test engine.
//!
//! Same wall-clock model as the interval timer, driven by the fixed shuttle
//! table instead of a generated schedule. The caller invokes `tick()` at a
//! fixed period (100 ms by default); every tick re-derives the elapsed time,
//! the current and next shuttle, the beep cue and the athletes' credited
//! distance from scratch.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::athlete::{AthleteResult, AthleteStatus, FailureOutcome};
use super::beeps::BeepMachine;
use super::protocol::{ShuttleInfo, ShuttleTable};
use super::session::{SessionStatus, TestSession};
use crate::clock::{format_clock, now_ms, Stopwatch};
use crate::events::Event;
use crate::storage::SessionStore;

/// Read-only view handed to presentation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoYoSnapshot {
    pub elapsed_time: f64,
    pub formatted_time: String,
    pub is_running: bool,
    pub is_paused: bool,
    pub is_resting: bool,
    /// Seconds until the next shuttle starts, while resting.
    pub pause_time_remaining: f64,
    pub current_shuttle: Option<ShuttleInfo>,
    pub next_shuttle: Option<ShuttleInfo>,
    pub shuttle_index: Option<usize>,
    pub test_session: Option<TestSession>,
    pub athletes: Vec<AthleteResult>,
    pub enable_audio: bool,
}

pub struct YoYoTimer {
    table: ShuttleTable,
    stopwatch: Stopwatch,
    elapsed_time: f64,
    is_running: bool,
    is_paused: bool,
    shuttle_index: Option<usize>,
    beeps: BeepMachine,
    enable_audio: bool,
    /// Athletes outside a live session: registered before a test, or carried
    /// over from the last completed one.
    roster: Vec<AthleteResult>,
    session: Option<TestSession>,
    store: Option<Box<dyn SessionStore>>,
}

impl Default for YoYoTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl YoYoTimer {
    pub fn new() -> Self {
        Self::with_table(ShuttleTable::ir1())
    }

    pub fn with_table(table: ShuttleTable) -> Self {
        Self {
            table,
            stopwatch: Stopwatch::new(),
            elapsed_time: 0.0,
            is_running: false,
            is_paused: false,
            shuttle_index: None,
            beeps: BeepMachine::new(),
            enable_audio: true,
            roster: Vec::new(),
            session: None,
            store: None,
        }
    }

    /// Hand completed sessions to `store`.
    pub fn with_store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn shuttle_index(&self) -> Option<usize> {
        self.shuttle_index
    }

    pub fn current_shuttle(&self) -> Option<&'static ShuttleInfo> {
        self.table.current(self.elapsed_time)
    }

    pub fn next_shuttle(&self) -> Option<&'static ShuttleInfo> {
        self.table.next(self.elapsed_time)
    }

    /// Between the end of the current shuttle and the start of the next.
    pub fn is_resting(&self) -> bool {
        if !self.is_running || self.is_paused {
            return false;
        }
        match (self.current_shuttle(), self.next_shuttle()) {
            (Some(current), Some(_)) => self.elapsed_time > current.end_time,
            _ => false,
        }
    }

    pub fn pause_time_remaining(&self) -> f64 {
        match self.next_shuttle() {
            Some(next) if self.is_resting() => next.start_time - self.elapsed_time,
            _ => 0.0,
        }
    }

    pub fn test_session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    pub fn athletes(&self) -> &[AthleteResult] {
        match self.live_session() {
            Some(session) => &session.results,
            None => &self.roster,
        }
    }

    pub fn athlete(&self, athlete_id: &str) -> Option<&AthleteResult> {
        self.athletes().iter().find(|a| a.id == athlete_id)
    }

    pub fn enable_audio(&self) -> bool {
        self.enable_audio
    }

    pub fn table(&self) -> &ShuttleTable {
        &self.table
    }

    pub fn snapshot(&self) -> YoYoSnapshot {
        YoYoSnapshot {
            elapsed_time: self.elapsed_time,
            formatted_time: format_clock(self.elapsed_time),
            is_running: self.is_running,
            is_paused: self.is_paused,
            is_resting: self.is_resting(),
            pause_time_remaining: self.pause_time_remaining(),
            current_shuttle: self.current_shuttle().copied(),
            next_shuttle: self.next_shuttle().copied(),
            shuttle_index: self.shuttle_index,
            test_session: self.session.clone(),
            athletes: self.athletes().to_vec(),
            enable_audio: self.enable_audio,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_test(&mut self) -> Option<Event> {
        self.start_test_at(now_ms())
    }

    /// Activate every registered athlete and start the clock.
    ///
    /// Ignored while a test is running or when nobody is registered.
    pub fn start_test_at(&mut self, now: u64) -> Option<Event> {
        if self.is_running {
            tracing::debug!("start_test ignored: test already running");
            return None;
        }
        if self.athletes().is_empty() {
            tracing::debug!("start_test ignored: no athletes");
            return None;
        }

        let results: Vec<AthleteResult> = self
            .athletes()
            .iter()
            .map(|a| AthleteResult::new(a.id.clone(), a.name.clone(), AthleteStatus::Active))
            .collect();
        self.roster.clear();
        let session = TestSession::new(now, results);
        let event = Event::TestStarted {
            session_id: session.id.clone(),
            participants: session.participants.len(),
            at: Utc::now(),
        };
        self.session = Some(session);

        self.elapsed_time = 0.0;
        self.shuttle_index = None;
        self.beeps.reset();
        self.stopwatch.reset();
        self.stopwatch.start_at(now);
        self.is_running = true;
        self.is_paused = false;
        Some(event)
    }

    pub fn pause_test(&mut self) -> Option<Event> {
        self.pause_test_at(now_ms())
    }

    pub fn pause_test_at(&mut self, now: u64) -> Option<Event> {
        if !self.is_running || self.is_paused {
            return None;
        }
        self.stopwatch.pause_at(now);
        self.is_paused = true;
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::Paused;
        }
        Some(Event::TestPaused {
            elapsed_time: self.elapsed_time,
            at: Utc::now(),
        })
    }

    pub fn resume_test(&mut self) -> Option<Event> {
        self.resume_test_at(now_ms())
    }

    /// Continue with a fresh wall-clock reference, keeping elapsed time.
    pub fn resume_test_at(&mut self, now: u64) -> Option<Event> {
        if !self.is_running || !self.is_paused {
            return None;
        }
        self.stopwatch.resume_at(now);
        self.is_paused = false;
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::InProgress;
        }
        Some(Event::TestResumed {
            elapsed_time: self.elapsed_time,
            at: Utc::now(),
        })
    }

    /// Drop the session and every athlete.
    pub fn reset_test(&mut self) -> Option<Event> {
        self.stopwatch.reset();
        self.elapsed_time = 0.0;
        self.is_running = false;
        self.is_paused = false;
        self.shuttle_index = None;
        self.beeps.reset();
        self.roster.clear();
        self.session = None;
        Some(Event::TestReset { at: Utc::now() })
    }

    /// Register an athlete: `Active` when a test is under way, `Waiting`
    /// otherwise. Duplicate ids are ignored.
    pub fn add_athlete(&mut self, id: &str, name: &str) -> Option<Event> {
        if self.athlete(id).is_some() {
            tracing::debug!(athlete = id, "add_athlete ignored: duplicate id");
            return None;
        }
        let status = if self.live_session().is_some() {
            AthleteStatus::Active
        } else {
            AthleteStatus::Waiting
        };
        let athlete = AthleteResult::new(id, name, status);
        match self.live_session_mut() {
            Some(session) => {
                session.participants.push(athlete.id.clone());
                session.results.push(athlete);
            }
            None => self.roster.push(athlete),
        }
        Some(Event::AthleteAdded {
            athlete_id: id.to_string(),
            status,
            at: Utc::now(),
        })
    }

    /// Report that an athlete missed the line: first a warning, then out.
    pub fn mark_failure(&mut self, athlete_id: &str) -> Option<Event> {
        let shuttle_index = self.shuttle_index;
        let elapsed = self.elapsed_time;
        let table = self.table;
        let athlete = self.athlete_mut(athlete_id)?;

        let outcome = athlete.register_failure(shuttle_index, elapsed, &table);
        match outcome {
            Some(FailureOutcome::Warned) => Some(Event::AthleteWarned {
                athlete_id: athlete_id.to_string(),
                shuttle_index,
                at: Utc::now(),
            }),
            Some(FailureOutcome::DroppedOut {
                drop_out_shuttle,
                estimated_distance,
            }) => {
                tracing::info!(athlete = athlete_id, drop_out_shuttle, estimated_distance, "athlete dropped out");
                Some(Event::AthleteDroppedOut {
                    athlete_id: athlete_id.to_string(),
                    drop_out_shuttle,
                    drop_out_time: elapsed,
                    estimated_distance,
                    at: Utc::now(),
                })
            }
            None => {
                tracing::debug!(athlete = athlete_id, status = ?athlete.status, "mark_failure ignored");
                None
            }
        }
    }

    /// Override an athlete's status directly.
    pub fn update_athlete_status(&mut self, athlete_id: &str, status: AthleteStatus) -> Option<Event> {
        let athlete = self.athlete_mut(athlete_id)?;
        athlete.status = status;
        Some(Event::AthleteStatusChanged {
            athlete_id: athlete_id.to_string(),
            status,
            at: Utc::now(),
        })
    }

    pub fn set_enable_audio(&mut self, enabled: bool) {
        self.enable_audio = enabled;
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Periodic tick. Does nothing unless a test is running and unpaused.
    pub fn tick_at(&mut self, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.is_running || self.is_paused {
            return events;
        }

        let t = self.stopwatch.elapsed_secs_at(now).max(self.elapsed_time);
        self.elapsed_time = t;

        let current = self.table.current_index(t);
        if let Some(index) = current.filter(|&i| Some(i) != self.shuttle_index) {
            self.advance_shuttle(index, &mut events);
        }

        if let Some(index) = self.shuttle_index {
            if let Some(shuttle) = self.table.get(index) {
                if let Some(cue) = self.beeps.step(shuttle, t) {
                    if self.enable_audio {
                        events.push(Event::ShuttleCue {
                            shuttle_index: index,
                            cue,
                            at: Utc::now(),
                        });
                    }
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.elapsed_time = t;
            session.current_shuttle = self.shuttle_index;
        }

        let finished = match (self.table.current(t), self.table.next(t)) {
            (Some(current), None) => t > current.end_time,
            _ => false,
        };
        if finished {
            events.extend(self.complete_test_at(now));
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The session still under way. A completed session is frozen as it
    /// was handed to the store.
    fn live_session(&self) -> Option<&TestSession> {
        self.session
            .as_ref()
            .filter(|s| s.status != SessionStatus::Completed)
    }

    fn live_session_mut(&mut self) -> Option<&mut TestSession> {
        self.session
            .as_mut()
            .filter(|s| s.status != SessionStatus::Completed)
    }

    fn athlete_mut(&mut self, athlete_id: &str) -> Option<&mut AthleteResult> {
        if self.live_session().is_some() {
            return self
                .live_session_mut()?
                .results
                .iter_mut()
                .find(|a| a.id == athlete_id);
        }
        self.roster.iter_mut().find(|a| a.id == athlete_id)
    }

    /// Track a new shuttle and credit running athletes with the one just
    /// completed. Dropped-out athletes keep their banked distance.
    fn advance_shuttle(&mut self, index: usize, events: &mut Vec<Event>) {
        self.shuttle_index = Some(index);
        self.beeps.track(index);

        let credited = self.table.estimated_distance(index as i64 - 1);
        if let Some(session) = self.session.as_mut() {
            for athlete in session.results.iter_mut() {
                athlete.credit(credited);
            }
        }

        if let Some(shuttle) = self.table.get(index) {
            tracing::debug!(index, level = shuttle.level, shuttle = shuttle.shuttle, "shuttle advanced");
            events.push(Event::ShuttleAdvanced {
                shuttle_index: index,
                level: shuttle.level,
                shuttle: shuttle.shuttle,
                speed: shuttle.speed,
                at: Utc::now(),
            });
        }
    }

    /// Freeze the session, complete everyone still running and hand the
    /// result to the store.
    fn complete_test_at(&mut self, now: u64) -> Option<Event> {
        self.stopwatch.pause_at(now);
        self.is_running = false;
        self.is_paused = false;

        let final_distance = self.table.last().map(|s| s.distance).unwrap_or(0);
        let session = self.session.as_mut()?;
        for athlete in session.results.iter_mut() {
            athlete.complete(final_distance);
        }
        session.status = SessionStatus::Completed;
        session.elapsed_time = self.elapsed_time;
        let session = session.clone();
        self.roster = session.results.clone();

        tracing::info!(
            session = %session.id,
            participants = session.participants.len(),
            "test completed"
        );
        if let Some(store) = &self.store {
            if let Err(e) = store.save_session(&session) {
                tracing::warn!(session = %session.id, error = %e, "failed to persist test session");
            }
        }

        Some(Event::TestCompleted {
            session: Box::new(session),
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yoyo::beeps::BeepCue;

    fn ms(secs: f64) -> u64 {
        (secs * 1000.0).round() as u64
    }

    fn started(ids: &[&str]) -> YoYoTimer {
        let mut timer = YoYoTimer::new();
        for id in ids {
            timer.add_athlete(id, &id.to_uppercase());
        }
        timer.start_test_at(0);
        timer
    }

    #[test]
    fn start_requires_athletes() {
        let mut timer = YoYoTimer::new();
        assert!(timer.start_test_at(0).is_none());
        assert!(!timer.is_running());
        assert!(timer.tick_at(1_000).is_empty());
    }

    #[test]
    fn athletes_wait_until_start() {
        let mut timer = YoYoTimer::new();
        timer.add_athlete("eray", "Eray");
        assert_eq!(timer.athletes()[0].status, AthleteStatus::Waiting);
        timer.start_test_at(0);
        assert_eq!(timer.athletes()[0].status, AthleteStatus::Active);
        timer.add_athlete("late", "Late");
        assert_eq!(timer.athlete("late").unwrap().status, AthleteStatus::Active);
        assert_eq!(timer.test_session().unwrap().participants, vec!["eray", "late"]);
        assert!(timer.add_athlete("late", "Again").is_none());
    }

    #[test]
    fn first_tick_advances_to_shuttle_zero_with_horn() {
        let mut timer = started(&["a"]);
        let events = timer.tick_at(100);
        assert_eq!(timer.shuttle_index(), Some(0));
        assert!(events.iter().any(|e| matches!(e, Event::ShuttleAdvanced { shuttle_index: 0, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ShuttleCue { cue: BeepCue::Horn, .. })));
    }

    #[test]
    fn recovery_window_is_resting() {
        let mut timer = started(&["a"]);
        timer.tick_at(ms(20.0));
        assert!(timer.is_resting());
        assert!((timer.pause_time_remaining() - 4.4).abs() < 1e-6);
        assert_eq!(timer.current_shuttle().map(|s| s.level), Some(5));
        assert_eq!(timer.next_shuttle().map(|s| s.level), Some(9));

        timer.pause_test_at(ms(20.0));
        assert!(!timer.is_resting());
        assert_eq!(timer.pause_time_remaining(), 0.0);
    }

    #[test]
    fn distance_is_credited_on_shuttle_advance_only() {
        let mut timer = started(&["a"]);
        timer.tick_at(ms(1.0));
        assert_eq!(timer.athletes()[0].estimated_distance, 0);
        // recovery after shuttle 0: no credit yet
        timer.tick_at(ms(20.0));
        assert_eq!(timer.athletes()[0].estimated_distance, 0);
        timer.tick_at(ms(25.0));
        assert_eq!(timer.shuttle_index(), Some(1));
        assert_eq!(timer.athletes()[0].estimated_distance, 40);
    }

    #[test]
    fn drop_out_keeps_last_completed_distance() {
        let mut timer = started(&["a", "b"]);
        let table = *timer.table();
        let at = |i: usize| ms(table.get(i).unwrap().start_time + 1.0);

        timer.tick_at(at(4));
        assert_eq!(timer.shuttle_index(), Some(4));
        assert!(matches!(timer.mark_failure("a"), Some(Event::AthleteWarned { .. })));
        assert_eq!(timer.athlete("a").unwrap().estimated_distance, 160);

        timer.tick_at(at(5));
        let event = timer.mark_failure("a");
        assert!(matches!(
            event,
            Some(Event::AthleteDroppedOut { drop_out_shuttle: 6, estimated_distance: 200, .. })
        ));
        let a = timer.athlete("a").unwrap();
        assert_eq!(a.status, AthleteStatus::DroppedOut);
        assert_eq!(a.estimated_distance, table.estimated_distance(4));

        // later shuttles credit only the athlete still running
        timer.tick_at(at(8));
        assert_eq!(timer.athlete("a").unwrap().estimated_distance, 200);
        assert_eq!(timer.athlete("b").unwrap().estimated_distance, table.estimated_distance(7));
        assert!(timer.mark_failure("a").is_none());
    }

    #[test]
    fn pause_and_resume_preserve_elapsed() {
        let mut timer = started(&["a"]);
        timer.tick_at(ms(30.0));
        timer.pause_test_at(ms(30.0));
        assert_eq!(timer.test_session().unwrap().status, SessionStatus::Paused);
        assert!(timer.tick_at(ms(500.0)).is_empty());
        timer.resume_test_at(ms(500.0));
        timer.tick_at(ms(500.0));
        assert!((timer.elapsed_time() - 30.0).abs() < 1e-9);
        timer.tick_at(ms(501.0));
        assert!((timer.elapsed_time() - 31.0).abs() < 1e-9);
    }

    #[test]
    fn audio_disabled_suppresses_cues_without_replaying_them() {
        let mut timer = started(&["a"]);
        timer.set_enable_audio(false);
        let events = timer.tick_at(100);
        assert!(!events.iter().any(|e| matches!(e, Event::ShuttleCue { .. })));
        timer.set_enable_audio(true);
        // horn already consumed for shuttle 0
        assert!(!timer
            .tick_at(200)
            .iter()
            .any(|e| matches!(e, Event::ShuttleCue { cue: BeepCue::Horn, .. })));
    }

    #[test]
    fn completing_the_table_finishes_the_test() {
        let mut timer = started(&["a", "b"]);
        timer.tick_at(ms(10.0));
        timer.mark_failure("b");
        timer.mark_failure("b");

        let events = timer.tick_at(ms(2_000.0));
        assert!(!timer.is_running());
        let completed = events.iter().find_map(|e| match e {
            Event::TestCompleted { session, .. } => Some(session.clone()),
            _ => None,
        });
        let session = completed.expect("test completed");
        assert_eq!(session.status, SessionStatus::Completed);
        let a = session.result("a").unwrap();
        assert_eq!(a.status, AthleteStatus::Completed);
        assert_eq!(a.estimated_distance, 3640);
        assert!(a.completed);
        let b = session.result("b").unwrap();
        assert_eq!(b.status, AthleteStatus::DroppedOut);
        assert_eq!(b.estimated_distance, 0);
    }

    #[test]
    fn completed_session_is_frozen() {
        let mut timer = started(&["a"]);
        timer.tick_at(ms(2_000.0));
        let stored = timer.test_session().unwrap().clone();
        assert_eq!(stored.status, SessionStatus::Completed);

        let added = timer.add_athlete("late", "Late");
        assert!(matches!(
            added,
            Some(Event::AthleteAdded { status: AthleteStatus::Waiting, .. })
        ));
        timer.update_athlete_status("a", AthleteStatus::Warned);
        assert_eq!(timer.test_session(), Some(&stored));
        assert_eq!(timer.athlete("late").unwrap().status, AthleteStatus::Waiting);
        assert_eq!(timer.athlete("a").unwrap().status, AthleteStatus::Warned);

        // the next test runs everyone on the roster
        timer.start_test_at(3_000_000);
        let session = timer.test_session().unwrap();
        assert_eq!(session.participants, vec!["a", "late"]);
        assert!(session.results.iter().all(|r| r.status == AthleteStatus::Active));
    }

    #[test]
    fn reset_clears_everything() {
        let mut timer = started(&["a"]);
        timer.tick_at(ms(50.0));
        timer.reset_test();
        assert!(timer.athletes().is_empty());
        assert!(timer.test_session().is_none());
        assert_eq!(timer.elapsed_time(), 0.0);
        assert_eq!(timer.shuttle_index(), None);
    }

    #[test]
    fn update_status_overrides() {
        let mut timer = started(&["a"]);
        assert!(timer.update_athlete_status("a", AthleteStatus::Warned).is_some());
        assert_eq!(timer.athlete("a").unwrap().status, AthleteStatus::Warned);
        assert!(timer.update_athlete_status("zz", AthleteStatus::Active).is_none());
    }
}

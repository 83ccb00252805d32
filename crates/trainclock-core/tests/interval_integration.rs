//! Integration tests for the interval timer.
//!
//! Drives the engine with explicit timestamps through whole presets from the
//! bundled catalog, and checks schedule properties over generated presets.

use proptest::prelude::*;
use trainclock_core::interval::{
    generate_phases, Exercise, ExerciseType, IntervalCue, PhaseSchedule, PhaseType,
};
use trainclock_core::{Catalog, CueDispatcher, Event, IntervalTimer, SilentPlayer, TimerStatus, WorkoutPreset};

fn run_to_end(timer: &mut IntervalTimer, step_ms: u64, start: u64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut now = start;
    while timer.status() != TimerStatus::Finished {
        now += step_ms;
        events.extend(timer.tick_at(now));
        assert!(now < start + 3_600_000, "timer never finished");
    }
    events
}

fn phase_changes(events: &[Event]) -> Vec<(Option<usize>, usize, Vec<IntervalCue>)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseChanged {
                from_phase,
                to_phase,
                cues,
                ..
            } => Some((*from_phase, *to_phase, cues.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn tabata_runs_every_phase_in_order() {
    let catalog = Catalog::bundled().unwrap();
    let mut timer = IntervalTimer::new();
    timer.select_preset(catalog.preset("tabata").unwrap().clone());
    assert_eq!(timer.total_time(), 250);
    timer.start_at(0);

    let events = run_to_end(&mut timer, 100, 0);
    let changes = phase_changes(&events);
    let last = timer.phases().len() - 1;

    let visited: Vec<usize> = changes.iter().map(|(_, to, _)| *to).collect();
    assert_eq!(visited, (1..=last).collect::<Vec<_>>());
    assert_eq!(changes[0].2, vec![IntervalCue::Start]);
    assert_eq!(changes[1].2, vec![IntervalCue::Rest]);
    // rest of set 1 -> work of set 2
    assert_eq!(changes[2].2, vec![IntervalCue::Start, IntervalCue::Transition]);
    assert_eq!(changes.last().unwrap().2, vec![IntervalCue::Finish]);

    let finished = events
        .iter()
        .filter(|e| matches!(e, Event::WorkoutFinished { .. }))
        .count();
    assert_eq!(finished, 1);
    assert_eq!(timer.current_time(), 250.0);
    assert_eq!(timer.workout_progress(), 1.0);
}

#[test]
fn throttled_ticks_skip_phases_but_announce_the_landing_one() {
    let catalog = Catalog::bundled().unwrap();
    let mut timer = IntervalTimer::new();
    timer.select_preset(catalog.preset("drill-1").unwrap().clone());
    timer.start_at(0);

    // prepare 10, work 30, rest 10, work 30, rest 10 = 90 s
    let events = run_to_end(&mut timer, 45_000, 0);
    let changes = phase_changes(&events);
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].0, Some(0));
    assert_eq!(changes[0].1, 2);
    assert_eq!(changes[0].2, vec![IntervalCue::Rest]);
    assert_eq!(changes[1].0, Some(2));
    assert_eq!(changes[1].1, timer.phases().len() - 1);
}

#[test]
fn long_pause_does_not_consume_workout_time() {
    let catalog = Catalog::bundled().unwrap();
    let mut timer = IntervalTimer::new();
    timer.select_preset(catalog.preset("hiit-basic").unwrap().clone());
    timer.start_at(0);
    timer.tick_at(20_000);
    timer.pause_at(20_000);

    timer.tick_at(3_620_000);
    assert_eq!(timer.status(), TimerStatus::Paused);
    assert!((timer.current_time() - 20.0).abs() < 1e-9);

    timer.resume_at(3_620_000);
    timer.tick_at(3_625_000);
    assert!((timer.current_time() - 25.0).abs() < 1e-9);
}

#[test]
fn skip_then_reset_returns_to_set_start() {
    let catalog = Catalog::bundled().unwrap();
    let mut timer = IntervalTimer::new();
    timer.select_preset(catalog.preset("stability-core").unwrap().clone());
    timer.start_at(0);
    timer.tick_at(1_000);

    // prepare -> plank set 1 -> rest -> plank set 2
    timer.skip_at(1_000);
    timer.skip_at(1_000);
    timer.skip_at(1_000);
    let phase = timer.active_phase().unwrap().clone();
    assert_eq!(phase.phase_type, PhaseType::Hold);
    assert_eq!(phase.set_number, 2);

    timer.tick_at(5_000);
    timer.reset_at(5_000);
    assert_eq!(timer.status(), TimerStatus::Ready);
    assert_eq!(timer.active_phase().unwrap().phase_index, phase.phase_index);
    assert_eq!(timer.phase_time_remaining(), 30.0);
}

#[test]
fn dispatcher_consumes_phase_events() {
    let catalog = Catalog::bundled().unwrap();
    let mut timer = IntervalTimer::new();
    timer.select_preset(catalog.preset("drill-1").unwrap().clone());
    timer.start_at(0);
    let events = run_to_end(&mut timer, 500, 0);

    let mut dispatcher = CueDispatcher::new(Box::new(SilentPlayer), Default::default());
    let expected: usize = phase_changes(&events).iter().map(|(_, _, cues)| cues.len()).sum();
    assert_eq!(dispatcher.dispatch_all(&events), expected);
}

fn exercise_strategy() -> impl Strategy<Value = Exercise> {
    (
        prop_oneof![
            Just(ExerciseType::Work),
            Just(ExerciseType::Hold),
            Just(ExerciseType::Reps)
        ],
        1u32..5,
        1u32..90,
        0u32..30,
        any::<bool>(),
    )
        .prop_map(|(exercise_type, sets, duration, rest_after, side_specific)| Exercise {
            name: "Generated".into(),
            exercise_type,
            sets,
            reps: None,
            duration,
            rest_after,
            side_specific,
            instructions: None,
        })
}

fn preset_strategy() -> impl Strategy<Value = WorkoutPreset> {
    prop::collection::vec(exercise_strategy(), 0..5).prop_map(|exercises| WorkoutPreset {
        id: "generated".into(),
        name: "Generated".into(),
        description: String::new(),
        exercises,
    })
}

proptest! {
    #[test]
    fn generation_is_deterministic(preset in preset_strategy()) {
        prop_assert_eq!(generate_phases(&preset), generate_phases(&preset));
    }

    #[test]
    fn total_time_is_prepare_plus_effort_plus_rest(preset in preset_strategy()) {
        let schedule = PhaseSchedule::from_preset(&preset, 10);
        let expected: u32 = 10 + preset
            .exercises
            .iter()
            .map(|e| {
                let sides = if e.side_specific { 2 } else { 1 };
                e.sets * sides * (e.duration + e.rest_after)
            })
            .sum::<u32>();
        prop_assert_eq!(schedule.total_secs(), expected);

        let phases = schedule.phases();
        prop_assert_eq!(phases.first().map(|p| p.phase_type), Some(PhaseType::Prepare));
        prop_assert_eq!(phases.last().map(|p| p.phase_type), Some(PhaseType::Finished));
        for (i, phase) in phases.iter().enumerate() {
            prop_assert_eq!(phase.phase_index, i);
            prop_assert_eq!(phase.total_phases, phases.len());
        }
    }

    #[test]
    fn time_and_phase_never_go_backwards(
        preset in preset_strategy(),
        steps in prop::collection::vec(0u64..20_000, 1..60),
    ) {
        let mut timer = IntervalTimer::new();
        timer.select_preset(preset);
        timer.start_at(0);

        let mut now = 0;
        let mut last_time = 0.0;
        let mut last_index = 0;
        for step in steps {
            now += step;
            timer.tick_at(now);
            let index = timer.active_phase().map(|p| p.phase_index).unwrap_or(0);
            prop_assert!(timer.current_time() >= last_time);
            prop_assert!(index >= last_index);
            prop_assert!(timer.current_time() <= f64::from(timer.total_time()));
            last_time = timer.current_time();
            last_index = index;
        }
    }
}

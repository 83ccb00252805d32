use std::time::Duration;

use trainclock_core::interval::{Phase, Side};
use trainclock_core::{format_clock, Catalog, Config, CueDispatcher, Event, IntervalTimer, TimerStatus};

use crate::bell::BellPlayer;
use crate::console::{end_status_line, print_json_line, status_line, Input};

const HELP: &str = "commands: p pause/resume, s skip, r reset set, x stop, q quit";

pub async fn run(preset_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = Catalog::for_config(&config)?;
    let preset = catalog.preset(preset_id)?.clone();

    let mut timer = IntervalTimer::with_prepare_secs(config.interval.prepare_secs);
    let mut dispatcher = CueDispatcher::new(Box::new(BellPlayer), config.audio.clone());
    let mut input = Input::stdin();
    let mut frames = tokio::time::interval(Duration::from_millis(config.interval.frame_ms));

    let name = preset.name.clone();
    let mut pending: Vec<Event> = timer.select_preset(preset).into_iter().collect();
    if !json {
        println!("{name} - {}", format_clock(f64::from(timer.total_time())));
        println!("{HELP}");
    }
    pending.extend(timer.start());

    let mut last_rendered = String::new();
    loop {
        tokio::select! {
            _ = frames.tick() => {
                pending.extend(timer.tick());
            }
            line = input.next() => {
                let event = match line.as_str() {
                    "p" if timer.status() == TimerStatus::Running => timer.pause(),
                    "p" => timer.start(),
                    "s" => timer.skip(),
                    "r" => timer.reset(),
                    "x" => timer.stop(),
                    "q" => break,
                    _ => {
                        eprintln!("{HELP}");
                        None
                    }
                };
                pending.extend(event);
            }
        }

        for event in pending.drain(..) {
            dispatcher.dispatch(&event);
            if json {
                print_json_line(&event)?;
            } else {
                report(&timer, &event, &mut last_rendered);
            }
        }

        if !json {
            let line = render(&timer);
            if line != last_rendered {
                status_line(&line);
                last_rendered = line;
            }
        }
        if timer.status() == TimerStatus::Finished {
            break;
        }
    }

    if !json {
        end_status_line();
    }
    Ok(())
}

fn describe(phase: &Phase) -> String {
    let side = match phase.side {
        Side::None => String::new(),
        Side::Left => " - left".into(),
        Side::Right => " - right".into(),
    };
    format!(
        "{}{} (set {}/{})",
        phase.name, side, phase.set_number, phase.total_sets
    )
}

fn render(timer: &IntervalTimer) -> String {
    let Some(phase) = timer.active_phase() else {
        return String::new();
    };
    let paused = if timer.status() == TimerStatus::Paused { "  [paused]" } else { "" };
    format!(
        "{}  {}  {:>3.0}%{}",
        describe(phase),
        format_clock(timer.phase_time_remaining().ceil()),
        timer.workout_progress() * 100.0,
        paused
    )
}

fn report(timer: &IntervalTimer, event: &Event, last_rendered: &mut String) {
    let message = match event {
        Event::PhaseChanged { to_phase, .. } => timer
            .schedule()
            .phase(*to_phase)
            .map(|p| format!("> {}", describe(p))),
        Event::PhaseSkipped { from_phase, to_phase, .. } => {
            Some(format!("skipped phase {from_phase} -> {to_phase}"))
        }
        Event::TimerReset { phase_index, .. } => Some(format!("reset to phase {phase_index}")),
        Event::TimerStopped { .. } => Some("stopped".into()),
        Event::WorkoutFinished { total_time, .. } => Some(format!(
            "workout complete in {}",
            format_clock(f64::from(*total_time))
        )),
        _ => None,
    };
    if let Some(message) = message {
        if !last_rendered.is_empty() {
            end_status_line();
            last_rendered.clear();
        }
        println!("{message}");
    }
}

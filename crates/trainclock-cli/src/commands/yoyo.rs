use std::time::Duration;

use trainclock_core::yoyo::TestSession;
use trainclock_core::{
    AthleteStatus, BackgroundStore, Catalog, Config, CueDispatcher, Database, Event, YoYoTimer,
};

use crate::bell::BellPlayer;
use crate::console::{end_status_line, print_json_line, status_line, Input};

const HELP: &str =
    "commands: f <id> failure, p pause, r resume, a <id> <name> add, s <id> <status> set status, q quit";

pub async fn run(
    athletes: Vec<String>,
    no_audio: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = Catalog::for_config(&config)?;
    let store = BackgroundStore::spawn(Database::open()?)?;

    let mut timer = YoYoTimer::new().with_store(Box::new(store));
    timer.set_enable_audio(config.yoyo.enable_audio && !no_audio);

    let mut pending: Vec<Event> = Vec::new();
    if athletes.is_empty() {
        for player in &catalog.players {
            pending.extend(timer.add_athlete(&player.id, &player.name));
        }
    } else {
        for id in &athletes {
            let player = catalog.player(id)?;
            pending.extend(timer.add_athlete(&player.id, &player.name));
        }
    }

    let mut dispatcher = CueDispatcher::new(Box::new(BellPlayer), config.audio.clone());
    let mut input = Input::stdin();
    let mut ticks = tokio::time::interval(Duration::from_millis(config.yoyo.tick_ms));

    if !json {
        println!("Yo-Yo IR1 - {} athletes", timer.athletes().len());
        println!("{HELP}");
    }
    pending.extend(timer.start_test());

    let mut completed: Option<TestSession> = None;
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                pending.extend(timer.tick());
            }
            line = input.next() => {
                let mut parts = line.split_whitespace();
                let event = match (parts.next(), parts.next()) {
                    (Some("f"), Some(id)) => timer.mark_failure(id),
                    (Some("p"), _) => timer.pause_test(),
                    (Some("r"), _) => timer.resume_test(),
                    (Some("a"), Some(id)) => {
                        let name = parts.collect::<Vec<_>>().join(" ");
                        let name = if name.is_empty() { id.to_string() } else { name };
                        timer.add_athlete(id, &name)
                    }
                    (Some("s"), Some(id)) => match parts.next().map(str::parse::<AthleteStatus>) {
                        Some(Ok(status)) => timer.update_athlete_status(id, status),
                        Some(Err(e)) => {
                            eprintln!("{e}");
                            None
                        }
                        None => None,
                    },
                    (Some("q"), _) => break,
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
            if let Event::TestCompleted { session, .. } = &event {
                completed = Some((**session).clone());
            }
            if json {
                print_json_line(&event)?;
            } else {
                report(&event);
            }
        }

        if completed.is_some() {
            break;
        }
        if !json {
            status_line(&render(&timer));
        }
    }

    if !json {
        end_status_line();
        if let Some(session) = &completed {
            print_results(session);
        }
    }
    // dropping the engine flushes the background store
    drop(timer);
    Ok(())
}

fn render(timer: &YoYoTimer) -> String {
    let snapshot = timer.snapshot();
    let shuttle = snapshot
        .current_shuttle
        .map(|s| s.label())
        .unwrap_or_else(|| "waiting".into());
    let state = if snapshot.is_paused {
        "paused".to_string()
    } else if snapshot.is_resting {
        format!("recovery {:.1}s", snapshot.pause_time_remaining)
    } else {
        "running".to_string()
    };
    let running = snapshot.athletes.iter().filter(|a| a.status.is_running()).count();
    format!(
        "{}  {}  {}  {} running",
        snapshot.formatted_time, shuttle, state, running
    )
}

fn report(event: &Event) {
    let message = match event {
        Event::AthleteAdded { athlete_id, status, .. } => {
            format!("{athlete_id} added ({})", status.as_str())
        }
        Event::AthleteWarned { athlete_id, .. } => format!("{athlete_id} warned"),
        Event::AthleteDroppedOut {
            athlete_id,
            drop_out_shuttle,
            estimated_distance,
            ..
        } => format!("{athlete_id} out at shuttle {drop_out_shuttle}, {estimated_distance} m"),
        Event::AthleteStatusChanged { athlete_id, status, .. } => {
            format!("{athlete_id} is now {}", status.as_str())
        }
        Event::TestPaused { .. } => "paused".into(),
        Event::TestResumed { .. } => "resumed".into(),
        _ => return,
    };
    end_status_line();
    println!("{message}");
}

fn print_results(session: &TestSession) {
    println!("session {}", session.id);
    let mut results: Vec<_> = session.results.iter().collect();
    results.sort_by(|a, b| b.estimated_distance.cmp(&a.estimated_distance));
    for r in results {
        println!(
            "{:<12} {:<12} {:>5} m  {}",
            r.name,
            r.status.as_str(),
            r.estimated_distance,
            r.drop_out_shuttle
                .map(|s| format!("out at shuttle {s}"))
                .unwrap_or_default()
        );
    }
    println!("average {:.0} m", session.average_distance());
}

use trainclock_core::{format_clock, Database};

pub fn run(limit: usize, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    if let Some(id) = session {
        let session = db
            .load_session(&id)?
            .ok_or_else(|| format!("no such session: {id}"))?;
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    let records = db.recent_sessions(limit)?;
    if records.is_empty() {
        println!("no sessions recorded");
        return Ok(());
    }
    for r in records {
        println!(
            "{}  {}  {:<11} {}  {} athletes  best {} m",
            r.id,
            r.date.format("%Y-%m-%d %H:%M"),
            r.status,
            format_clock(r.elapsed_time),
            r.participants,
            r.best_distance
        );
    }
    Ok(())
}

use trainclock_core::interval::{PhaseSchedule, Side};
use trainclock_core::{format_clock, Catalog, Config};

pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = Catalog::for_config(&config)?;

    for preset in &catalog.presets {
        let schedule = PhaseSchedule::from_preset(preset, config.interval.prepare_secs);
        println!(
            "{:<20} {:<28} {:>3} phases  {}",
            preset.id,
            preset.name,
            schedule.phases().len(),
            format_clock(f64::from(schedule.total_secs()))
        );
    }
    Ok(())
}

pub fn schedule(preset_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = Catalog::for_config(&config)?;
    let preset = catalog.preset(preset_id)?;
    let schedule = PhaseSchedule::from_preset(preset, config.interval.prepare_secs);

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    println!("{} ({})", preset.name, preset.id);
    for (i, phase) in schedule.phases().iter().enumerate() {
        let side = match phase.side {
            Side::None => "",
            Side::Left => " (left)",
            Side::Right => " (right)",
        };
        println!(
            "{:>3}  {}  {:<9} {:>4}s  set {}/{}  {}{}",
            i,
            format_clock(f64::from(schedule.start_of(i).unwrap_or(0))),
            format!("{:?}", phase.phase_type).to_lowercase(),
            phase.duration,
            phase.set_number,
            phase.total_sets,
            phase.name,
            side
        );
    }
    println!("total {}", format_clock(f64::from(schedule.total_secs())));
    Ok(())
}

use trainclock_core::yoyo::YOYO_IR1_PROTOCOL;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&YOYO_IR1_PROTOCOL[..])?);
        return Ok(());
    }

    println!("{:>3}  {:>5}  {:>7}  {:>8}  {:>8}  {:>6}", "#", "L-S", "km/h", "start", "end", "metres");
    for (i, s) in YOYO_IR1_PROTOCOL.iter().enumerate() {
        println!(
            "{:>3}  {:>5}  {:>7.1}  {:>8.2}  {:>8.2}  {:>6}",
            i + 1,
            format!("{}-{}", s.level, s.shuttle),
            s.speed,
            s.start_time,
            s.end_time,
            s.distance
        );
    }
    Ok(())
}

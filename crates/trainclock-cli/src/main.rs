use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod bell;
mod commands;
mod console;

#[derive(Parser)]
#[command(name = "trainclock", version, about = "Interval workout timer and Yo-Yo IR1 test")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List workout presets
    Presets,
    /// Print the phase schedule of a preset
    Schedule {
        /// Preset id (see `trainclock presets`)
        preset: String,
        /// Print phases as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run an interval workout in the terminal
    Interval {
        /// Preset id
        preset: String,
        /// Print every event as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Print the Yo-Yo IR1 shuttle table
    Shuttles {
        /// Print shuttles as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a Yo-Yo IR1 test
    Yoyo {
        /// Roster ids to enter (default: the whole roster)
        athletes: Vec<String>,
        /// Disable beeps
        #[arg(long)]
        no_audio: bool,
        /// Print every event as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Show persisted Yo-Yo sessions
    History {
        /// Number of sessions to list
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Show the results of one session
        #[arg(long)]
        session: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = std::env::var("TRAINCLOCK_LOG")
        .map_or_else(|_| EnvFilter::new("warn"), EnvFilter::new);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Presets => commands::presets::list(),
        Commands::Schedule { preset, json } => commands::presets::schedule(&preset, json),
        Commands::Interval { preset, json } => commands::interval::run(&preset, json).await,
        Commands::Shuttles { json } => commands::shuttles::run(json),
        Commands::Yoyo {
            athletes,
            no_audio,
            json,
        } => commands::yoyo::run(athletes, no_audio, json).await,
        Commands::History { limit, session } => commands::history::run(limit, session),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

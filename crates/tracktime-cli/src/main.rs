use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tracktime", version, about = "Activity time tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List activities and their accrued time
    List {
        /// Print the full state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an activity
    Add {
        /// Name of the new activity (defaults to the configured name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename an activity
    Rename {
        /// List position (1-based) or id
        activity: String,
        name: String,
    },
    /// Overwrite an activity's accrued minutes
    SetTime {
        /// List position (1-based) or id
        activity: String,
        #[arg(allow_negative_numbers = true)]
        minutes: String,
    },
    /// Reset an activity's accrued time to zero
    Clear {
        /// List position (1-based) or id
        activity: String,
    },
    /// Delete an activity
    Delete {
        /// List position (1-based) or id
        activity: String,
    },
    /// Interactive session with a live timer
    Session {
        /// Start this activity as soon as the session opens
        #[arg(long)]
        start: Option<String>,
        /// Emit every event, ticks included, as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TRACKTIME_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::List { json } => commands::activity::list(json),
        Commands::Add { name } => commands::activity::add(name),
        Commands::Rename { activity, name } => commands::activity::rename(&activity, name),
        Commands::SetTime { activity, minutes } => commands::activity::set_time(&activity, &minutes),
        Commands::Clear { activity } => commands::activity::clear(&activity),
        Commands::Delete { activity } => commands::activity::delete(&activity),
        Commands::Session { start, json } => commands::session::run(start, json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

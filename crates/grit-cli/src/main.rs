//! grit CLI - offline and live front end for the grit dirt engine.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grit")]
#[command(author, version, about = "Probabilistic bit-crush and feedback delay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the engine
    Process(commands::process::ProcessArgs),

    /// Run the engine live between an input and an output device
    Realtime(commands::realtime::RealtimeArgs),

    /// List audio devices
    Devices(commands::devices::DevicesArgs),

    /// Show the live parameters and their ranges
    Params,

    /// List, show, save, and delete parameter presets
    Presets(commands::presets::PresetsArgs),

    /// Create, show, and check setup files
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Realtime(args) => commands::realtime::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Params => commands::params::run(),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

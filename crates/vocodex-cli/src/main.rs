//! Vocodex CLI - Command-line interface for the vocodex channel vocoder.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vocodex")]
#[command(author, version, about = "Vocodex channel vocoder", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML). Defaults to the platform config
    /// file when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vocode an audio file into a WAV
    Process(commands::process::ProcessArgs),

    /// Run the vocoder on live audio devices
    Live(commands::live::LiveArgs),

    /// Decode, resample and normalize an audio file into a WAV
    Decode(commands::decode::DecodeArgs),

    /// List audio devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    // also installs the `log` bridge that symphonia reports through
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Process(args) => commands::process::run(args, config),
        Commands::Live(args) => commands::live::run(args, config),
        Commands::Decode(args) => commands::decode::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
    }
}

//! modgraph CLI - render, play and inspect signal-flow patches.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modgraph")]
#[command(author, version, about = "Modular signal-flow synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a project to a WAV file
    Render(commands::render::RenderArgs),

    /// Play a project on an audio device
    Play(commands::play::PlayArgs),

    /// Check a project's structure and report cycles
    Check(commands::check::CheckArgs),

    /// Print evaluated samples at given times
    Probe(commands::probe::ProbeArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),

    /// Show the active module schema
    Schema(commands::schema::SchemaArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Probe(args) => commands::probe::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Schema(args) => commands::schema::run(args),
    }
}

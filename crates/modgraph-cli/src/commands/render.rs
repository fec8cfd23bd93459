//! Offline rendering command.

use super::common::{
    default_wav_path, load_config, load_project, load_schema, parse_seconds, prepared_renderer,
    print_warning,
};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use modgraph_io::{WavSpec, render_to_wav_with_progress};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Project file (JSON)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Output WAV file (defaults to the project name with .wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Duration in seconds
    #[arg(short, long, default_value = "5.0", value_parser = parse_seconds)]
    duration: f64,

    /// Sample rate in Hz (defaults to the engine config)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Number of output channels (defaults to the engine config)
    #[arg(long)]
    channels: Option<u16>,

    /// Bit depth: 16, 24, or 32 (float)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Engine config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = load_schema(&config)?;
    let project = load_project(&args.project)?;

    let sample_rate = args.sample_rate.unwrap_or(config.sample_rate);
    let channels = args.channels.unwrap_or(config.channels);
    if sample_rate == 0 {
        anyhow::bail!("Sample rate must be greater than 0");
    }
    if channels == 0 {
        anyhow::bail!("Channel count must be greater than 0");
    }
    let output = args
        .output
        .unwrap_or_else(|| default_wav_path(&args.project));
    let frames = (args.duration * f64::from(sample_rate)).round() as u64;

    let (mut renderer, warning) =
        prepared_renderer(f64::from(sample_rate), schema, project.description());
    if let Some(warning) = &warning {
        print_warning(warning);
        eprintln!("Rendering silence.");
    }

    println!(
        "Rendering {} -> {}",
        args.project.display(),
        output.display()
    );
    println!(
        "  {} module(s), {} connection(s), {:.2}s at {} Hz, {} channel(s)",
        project.modules.len(),
        project.connection_count(),
        args.duration,
        sample_rate,
        channels
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(frames)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: args.bit_depth,
    };
    render_to_wav_with_progress(&mut renderer, frames, spec, &output, |done| {
        pb.set_position(done);
    })?;
    pb.finish_and_clear();

    println!("Wrote {} frames to {}", frames, output.display());
    Ok(())
}

//! Real-time playback command.

use super::common::{load_config, load_project, load_schema, parse_seconds, print_warning};
use clap::Args;
use modgraph_core::{Patch, Renderer};
use modgraph_io::{AudioBackend, BackendStreamConfig, CpalBackend, GraphBridge};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How often the control loop wakes to check for warnings and Ctrl+C.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args)]
pub struct PlayArgs {
    /// Project file (JSON)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Output device (index, exact name, or partial name)
    #[arg(short = 'o', long)]
    device: Option<String>,

    /// Stop after this many seconds (plays until Ctrl+C otherwise)
    #[arg(short, long, value_parser = parse_seconds)]
    duration: Option<f64>,

    /// MIDI note number driving every MIDI module (69 = A4 = 440 Hz)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=127))]
    note: Option<u8>,

    /// Engine config file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = load_schema(&config)?;
    let project = load_project(&args.project)?;
    let mut patch: Patch = project.to_patch(Arc::clone(&schema))?;

    if let Some(note) = args.note {
        let driven = patch.set_midi_note(note);
        if driven == 0 {
            eprintln!("Warning: --note given but the project has no MIDI module");
        }
    }

    let backend = CpalBackend::new();
    let stream_config = BackendStreamConfig {
        sample_rate: config.sample_rate,
        buffer_size: config.buffer_size,
        channels: config.channels,
        device_name: args.device.or(config.output_device),
    };
    let sample_rate = backend.actual_sample_rate(&stream_config);

    let (control, endpoint) =
        GraphBridge::new(Renderer::with_schema(f64::from(sample_rate), schema)).split();
    control.send(patch.to_command());

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let _stream = backend.build_output_stream(
        &stream_config,
        endpoint.into_output_callback(usize::from(stream_config.channels)),
        Box::new(|err: &str| tracing::error!("output stream error: {err}")),
    )?;

    println!(
        "Playing {} ({} module(s), {} Hz, {} channel(s))... Press Ctrl+C to stop.",
        args.project.display(),
        patch.module_count(),
        sample_rate,
        stream_config.channels
    );

    let started = Instant::now();
    let limit = args.duration.map(Duration::from_secs_f64);
    while running.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        if let Some(notification) = control.notification_timeout(POLL_INTERVAL) {
            print_warning(&notification);
        }
    }

    println!("Done!");
    Ok(())
}

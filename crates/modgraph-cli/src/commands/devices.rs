//! Audio device listing command.

use clap::Args;
use modgraph_io::{AudioBackend, CpalBackend};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices ({})", backend.name());
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, default
        );
    }
    println!();
    println!("Tip: Use device index or partial name with --device:");
    println!("  modgraph play patch.json --device 0");
    println!("  modgraph play patch.json --device \"USB\"");

    Ok(())
}

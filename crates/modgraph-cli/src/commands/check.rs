//! Project structure check command.

use super::common::{load_config, load_project, load_schema};
use clap::Args;
use modgraph_core::Renderer;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Project file (JSON)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Engine config file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = load_schema(&config)?;
    let project = load_project(&args.project)?;

    println!("Project: {}", args.project.display());
    println!("  Modules:     {}", project.modules.len());
    println!("  Connections: {}", project.connection_count());

    // Patch rules: known kinds, declared ports, no self-loops.
    let rules = project.to_patch(schema.clone());
    match &rules {
        Ok(_) => println!("  Patch rules: ok"),
        Err(e) => println!("  Patch rules: {e}"),
    }

    let mut renderer = Renderer::with_schema(f64::from(config.sample_rate), schema);
    let report = renderer.reconcile(project.description());
    if report.self_loops_skipped > 0 {
        println!("  Self-loops skipped: {}", report.self_loops_skipped);
    }

    if !report.valid {
        println!("  Cycle:       yes");
        anyhow::bail!("{}", modgraph_core::CYCLE_WARNING);
    }
    println!("  Cycle:       no");

    if let Err(e) = rules {
        anyhow::bail!("invalid project: {e}");
    }
    Ok(())
}

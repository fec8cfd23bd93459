//! Point evaluation command.

use super::common::{load_config, load_project, load_schema, prepared_renderer, print_warning};
use clap::Args;
use modgraph_core::{Evaluator, NodeId};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProbeArgs {
    /// Project file (JSON)
    #[arg(value_name = "PROJECT")]
    project: PathBuf,

    /// Times in seconds to evaluate at
    #[arg(short, long = "time", value_name = "SECONDS", num_args = 1.., required = true)]
    times: Vec<f64>,

    /// Evaluate one node's output instead of the mixed output
    #[arg(short, long)]
    node: Option<String>,

    /// Engine config file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: ProbeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = load_schema(&config)?;
    let project = load_project(&args.project)?;

    let (renderer, warning) =
        prepared_renderer(f64::from(config.sample_rate), schema, project.description());
    if let Some(warning) = &warning {
        print_warning(warning);
    }

    let store = renderer.store();
    let node = match &args.node {
        Some(id) => {
            if store.node(id).is_none() {
                anyhow::bail!("Node '{}' not found in {}", id, args.project.display());
            }
            Some(NodeId::new(id))
        }
        None => None,
    };

    let mut evaluator = Evaluator::new();
    for &time in &args.times {
        let value = match &node {
            Some(id) => evaluator.evaluate_node(store, id, time),
            None => evaluator.evaluate(store, time),
        };
        println!("{time}\t{value}");
    }
    Ok(())
}

//! Module schema display command.

use super::common::load_config;
use clap::Args;
use modgraph_config::SchemaFile;
use modgraph_core::ModuleSchema;
use std::path::PathBuf;

#[derive(Args)]
pub struct SchemaArgs {
    /// Schema file to merge over the built-in modules (overrides the config)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print as a TOML schema file instead of a table
    #[arg(long)]
    toml: bool,

    /// Engine config file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: SchemaArgs) -> anyhow::Result<()> {
    let schema: ModuleSchema = match &args.file {
        Some(path) => SchemaFile::load(path)?.to_schema(),
        None => load_config(args.config.as_deref())?.module_schema()?,
    };

    if args.toml {
        print!("{}", SchemaFile::from_schema(&schema).to_toml()?);
        return Ok(());
    }

    println!("{:<8} {:<8} {:>6} {:>7} {:>5}", "KIND", "NAME", "INPUTS", "OUTPUTS", "MAX");
    for (kind, spec) in schema.iter() {
        let max = spec
            .max_instances
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        println!(
            "{:<8} {:<8} {:>6} {:>7} {:>5}",
            kind, spec.name, spec.inputs, spec.outputs, max
        );
    }
    Ok(())
}

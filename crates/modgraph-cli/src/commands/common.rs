//! Shared CLI helpers used across multiple commands.

use modgraph_config::{EngineConfig, Project, default_config_path};
use modgraph_core::{GraphDescription, ModuleSchema, Notification, Renderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads the engine config from `path`, or from the user config file when
/// `path` is `None` (defaults if that file does not exist).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default(default_config_path())?,
    };
    tracing::debug!(?config, "engine config loaded");
    Ok(config)
}

/// Resolves the module schema the config asks for.
pub fn load_schema(config: &EngineConfig) -> anyhow::Result<Arc<ModuleSchema>> {
    Ok(Arc::new(config.module_schema()?))
}

/// Loads a project file, naming the file in the error.
pub fn load_project(path: &Path) -> anyhow::Result<Project> {
    Project::load(path).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

/// A renderer with `description` already applied.
///
/// Returns the cycle warning, if any, alongside.
pub fn prepared_renderer(
    sample_rate: f64,
    schema: Arc<ModuleSchema>,
    description: GraphDescription,
) -> (Renderer, Option<Notification>) {
    let mut renderer = Renderer::with_schema(sample_rate, schema);
    let warning = renderer.handle(modgraph_core::Command::PushGraph(description));
    (renderer, warning)
}

/// Print a render-side warning to stderr.
pub fn print_warning(notification: &Notification) {
    eprintln!("Warning: {}", notification.message());
}

/// Parse a non-negative number of seconds for clap's `value_parser`.
pub fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid duration: '{}' (expected seconds)", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Invalid duration: '{}' (must be >= 0)", s));
    }
    Ok(value)
}

/// Default output path: the project path with a `.wav` extension.
pub fn default_wav_path(project: &Path) -> PathBuf {
    project.with_extension("wav")
}

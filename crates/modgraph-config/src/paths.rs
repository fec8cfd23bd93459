//! Platform-specific paths for configuration and projects.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/modgraph/` (Linux), `~/Library/Application Support/modgraph/` (macOS), `%APPDATA%\modgraph\` (Windows)
//! - **Projects**: `projects/` under the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use modgraph_config::paths;
//!
//! println!("Config file: {:?}", paths::default_config_path());
//! ```

use std::path::PathBuf;

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "modgraph";

/// Engine configuration file name.
const CONFIG_FILE: &str = "config.toml";

/// Module schema override file name.
const SCHEMA_FILE: &str = "modules.toml";

/// Subdirectory name for saved projects.
const PROJECTS_SUBDIR: &str = "projects";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default engine configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Returns the default module schema override file path.
pub fn default_schema_path() -> PathBuf {
    user_config_dir().join(SCHEMA_FILE)
}

/// Returns the user projects directory.
pub fn user_projects_dir() -> PathBuf {
    user_config_dir().join(PROJECTS_SUBDIR)
}

/// Ensure the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    Ok(dir)
}

/// Lists `.json` project files in the user projects directory, sorted by name.
pub fn list_user_projects() -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(user_projects_dir()) else {
        return Vec::new();
    };
    let mut projects: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    projects.sort();
    projects
}

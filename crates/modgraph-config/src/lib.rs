//! File formats and configuration for modgraph.
//!
//! This crate turns files and messages into the plain data types of
//! `modgraph-core`, and back.
//!
//! # Features
//!
//! - **Projects**: Load and save patches as JSON ([`Project`])
//! - **Wire Messages**: JSON shapes of the control/render messages ([`WireCommand`], [`WireNotification`])
//! - **Module Schema**: Port-count overrides from TOML ([`SchemaFile`])
//! - **Engine Config**: Sample rate, buffer size, device selection ([`EngineConfig`])
//! - **Paths**: Platform-specific config and project directories
//!
//! # Example
//!
//! ```rust,no_run
//! use modgraph_config::{EngineConfig, Project, default_config_path};
//!
//! let config = EngineConfig::load_or_default(default_config_path()).unwrap();
//! let project = Project::load("patch.json").unwrap();
//!
//! let mut renderer = modgraph_core::Renderer::new(f64::from(config.sample_rate));
//! renderer.handle(modgraph_core::Command::PushGraph(project.description()));
//! ```

mod engine;
mod error;
mod project;
mod schema_file;
mod wire;

/// Platform-specific paths for configuration and projects.
pub mod paths;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use paths::{
    default_config_path, default_schema_path, ensure_user_config_dir, list_user_projects,
    user_config_dir, user_projects_dir,
};
pub use project::{Position, Project, ProjectModule};
pub use schema_file::{ModuleEntry, SchemaFile};
pub use wire::{WireCommand, WireGraph, WireModule, WireNotification};

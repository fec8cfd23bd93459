//! Integration tests for modgraph-config.
//!
//! These tests verify file round trips on disk and feed loaded data through
//! the core engine.

use std::sync::Arc;

use modgraph_config::{
    ConfigError, EngineConfig, Project, SchemaFile, WireCommand, WireNotification,
};
use modgraph_core::{Command, ModuleKind, Patch, PortId, Renderer};
use tempfile::TempDir;

fn add_patch() -> Patch {
    let mut patch = Patch::new();
    let five = patch.add_module(ModuleKind::Constant).unwrap();
    let three = patch.add_module(ModuleKind::Constant).unwrap();
    let add = patch.add_module(ModuleKind::Add).unwrap();
    let out = patch.add_module(ModuleKind::Output).unwrap();
    patch.set_content(&five, "5").unwrap();
    patch.set_content(&three, "3").unwrap();
    patch
        .connect(PortId::output(five, 0), PortId::input(add.clone(), 0))
        .unwrap();
    patch
        .connect(PortId::output(three, 0), PortId::input(add.clone(), 1))
        .unwrap();
    patch
        .connect(PortId::output(add, 0), PortId::input(out, 0))
        .unwrap();
    patch
}

/// Save a project, load it back, and render it.
#[test]
fn test_project_file_round_trip_renders() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("patch.json");

    Project::from_patch(&add_patch()).save(&path).unwrap();
    let loaded = Project::load(&path).unwrap();
    assert_eq!(loaded.modules.len(), 4);
    assert_eq!(loaded.connection_count(), 3);

    let mut renderer = Renderer::new(44100.0);
    assert!(
        renderer
            .handle(Command::PushGraph(loaded.description()))
            .is_none()
    );
    assert_eq!(renderer.next_sample(), 8.0);
}

/// A cyclic project still loads; the engine reports the cycle.
#[test]
fn test_cyclic_project_loads_and_warns() {
    let json = r#"{
        "modules": [
            {"nodeId": "add-node-0", "moduleId": "Add", "position": {"left": "0px", "top": "0px"}, "contents": ""},
            {"nodeId": "mul-node-1", "moduleId": "Mul", "position": {"left": "0px", "top": "0px"}, "contents": ""}
        ],
        "connections": [
            ["add-node-0-output-0", ["mul-node-1-input-0"]],
            ["mul-node-1-output-0", ["add-node-0-input-0"]]
        ]
    }"#;
    let project = Project::from_json(json).unwrap();
    let mut renderer = Renderer::new(44100.0);
    let note = renderer
        .handle(Command::PushGraph(project.description()))
        .unwrap();
    let wire = WireNotification::from(&note).to_json().unwrap();
    assert!(wire.contains("\"type\":\"warning\""));
}

/// Engine config pointing at a schema file changes port validation.
#[test]
fn test_engine_config_with_schema_file() {
    let dir = TempDir::new().unwrap();
    let schema_path = dir.path().join("modules.toml");
    std::fs::write(&schema_path, "[modules.Add]\ninputs = 3\noutputs = 1\n").unwrap();

    let config = EngineConfig {
        schema: Some(schema_path),
        ..EngineConfig::default()
    };
    let config_path = dir.path().join("config.toml");
    config.save(&config_path).unwrap();

    let loaded = EngineConfig::load(&config_path).unwrap();
    assert_eq!(loaded, config);
    let schema = Arc::new(loaded.module_schema().unwrap());

    let mut patch = Patch::with_schema(schema);
    let c = patch.add_module(ModuleKind::Constant).unwrap();
    let add = patch.add_module(ModuleKind::Add).unwrap();
    assert!(
        patch
            .connect(PortId::output(c, 0), PortId::input(add, 2))
            .is_ok()
    );
}

#[test]
fn test_missing_files() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(
        Project::load(&missing),
        Err(ConfigError::ReadFile { .. })
    ));
    assert_eq!(
        EngineConfig::load_or_default(dir.path().join("nope.toml")).unwrap(),
        EngineConfig::default()
    );
    assert!(SchemaFile::load(dir.path().join("nope.toml")).is_err());
}

/// Wire snapshots drive the renderer like in-process commands do.
#[test]
fn test_wire_push_matches_patch_command() {
    let patch = add_patch();
    let json = WireCommand::from(&patch.to_command()).to_json().unwrap();
    let command: Command = WireCommand::from_json(&json).unwrap().into();
    assert_eq!(command, patch.to_command());
}

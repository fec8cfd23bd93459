//! Project file format (JSON).

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::sync::Arc;

use modgraph_core::{GraphDescription, ModuleKind, ModuleSchema, NodeId, Patch, PortId};

use crate::error::ConfigError;

/// Editor placement of a module. Opaque to the engine; carried through
/// load/save untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    /// CSS left offset, e.g. `"120px"`.
    #[serde(default)]
    pub left: String,
    /// CSS top offset, e.g. `"48px"`.
    #[serde(default)]
    pub top: String,
}

/// One saved module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModule {
    /// Node id, e.g. `"sin-node-3"`.
    pub node_id: String,
    /// Module kind wire name, e.g. `"Sin"`.
    pub module_id: String,
    /// Editor placement.
    #[serde(default)]
    pub position: Position,
    /// Content payload. Older files store numbers here.
    #[serde(default, deserialize_with = "deserialize_contents")]
    pub contents: String,
}

/// A saved patch.
///
/// # JSON Format
///
/// ```json
/// {
///   "modules": [
///     { "nodeId": "const-node-0", "moduleId": "Const",
///       "position": { "left": "40px", "top": "60px" }, "contents": "2" },
///     { "nodeId": "sin-node-1", "moduleId": "Sin",
///       "position": { "left": "200px", "top": "60px" }, "contents": "" }
///   ],
///   "connections": [
///     ["const-node-0-output-0", ["sin-node-1-input-0"]]
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Modules in placement order.
    #[serde(default)]
    pub modules: Vec<ProjectModule>,
    /// `[source port, [destination ports]]` pairs.
    #[serde(default)]
    pub connections: Vec<(String, Vec<String>)>,
}

/// Accepts a string, a number, or null for `contents`.
fn deserialize_contents<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Contents {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Contents::deserialize(deserializer)? {
        Contents::Text(text) => text,
        Contents::Number(number) => number.to_string(),
        Contents::Null(()) => String::new(),
    })
}

impl Project {
    /// Load a project from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_json(&content)
    }

    /// Parse a project from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the project as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Graph snapshot for the engine, taken verbatim from the file.
    ///
    /// No patch rules are applied; the engine itself tolerates dangling or
    /// malformed entries.
    pub fn description(&self) -> GraphDescription {
        let mut description = GraphDescription::new();
        for module in &self.modules {
            description = description.with_node(
                module.node_id.clone(),
                ModuleKind::from_name(&module.module_id),
                module.contents.clone(),
            );
        }
        for (source, dests) in &self.connections {
            description
                .connections
                .entry(source.clone())
                .or_default()
                .extend(dests.iter().cloned());
        }
        description
    }

    /// Rebuilds an editable [`Patch`], enforcing the patch rules on every
    /// saved connection.
    pub fn to_patch(&self, schema: Arc<ModuleSchema>) -> Result<Patch, ConfigError> {
        let mut patch = Patch::with_schema(schema);
        for module in &self.modules {
            patch.insert_module(
                NodeId::new(&module.node_id),
                ModuleKind::from_name(&module.module_id),
                module.contents.clone(),
            );
        }
        for (source, dests) in &self.connections {
            let output =
                PortId::parse(source).ok_or_else(|| ConfigError::InvalidPort(source.clone()))?;
            for dest in dests {
                let input =
                    PortId::parse(dest).ok_or_else(|| ConfigError::InvalidPort(dest.clone()))?;
                patch.connect(output.clone(), input)?;
            }
        }
        Ok(patch)
    }

    /// Captures a patch. Positions are left empty.
    pub fn from_patch(patch: &Patch) -> Self {
        let modules = patch
            .modules()
            .map(|(id, module)| ProjectModule {
                node_id: id.to_string(),
                module_id: module.kind.name().to_string(),
                position: Position::default(),
                contents: module.content.clone(),
            })
            .collect();
        let connections = patch
            .connections()
            .map(|(output, inputs)| {
                (
                    output.to_string(),
                    inputs.iter().map(ToString::to_string).collect(),
                )
            })
            .collect();
        Self {
            modules,
            connections,
        }
    }

    /// Number of saved connections.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|(_, dests)| dests.len()).sum()
    }
}

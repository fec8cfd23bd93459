//! JSON wire format for control ↔ render messages.
//!
//! Mirrors the message shapes used by the browser editor, so snapshots can be
//! captured from (or replayed into) either side:
//!
//! ```json
//! {"command": "reset"}
//! {"command": "pushGraph", "args": {
//!     "activeModules": {"const-node-0": {"moduleId": "Const", "contents": "2"}},
//!     "connections": {"const-node-0-output-0": ["out-node-1-input-0"]}}}
//! {"type": "warning", "message": "Cycle detected, please address this before continuing."}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use modgraph_core::{Command, GraphDescription, ModuleKind, NodeDescriptor, Notification};

use crate::error::ConfigError;

/// One entry of `activeModules`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireModule {
    /// Module kind wire name.
    pub module_id: String,
    /// Content payload.
    #[serde(default)]
    pub contents: String,
}

/// Payload of a `pushGraph` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireGraph {
    /// Node id → module.
    #[serde(default)]
    pub active_modules: BTreeMap<String, WireModule>,
    /// Source port → destination ports.
    #[serde(default)]
    pub connections: BTreeMap<String, Vec<String>>,
}

/// Control → render message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", content = "args", rename_all = "camelCase")]
pub enum WireCommand {
    /// Clear graph and baseline.
    Reset,
    /// Reconcile against a snapshot.
    PushGraph(WireGraph),
}

/// Render → control message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireNotification {
    /// User-facing warning.
    Warning {
        /// Text to show.
        message: String,
    },
}

impl WireCommand {
    /// Parse a command from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl WireNotification {
    /// Parse a notification from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&GraphDescription> for WireGraph {
    fn from(description: &GraphDescription) -> Self {
        Self {
            active_modules: description
                .nodes
                .iter()
                .map(|(id, node)| {
                    (
                        id.clone(),
                        WireModule {
                            module_id: node.kind.name().to_string(),
                            contents: node.content.clone(),
                        },
                    )
                })
                .collect(),
            connections: description.connections.clone(),
        }
    }
}

impl From<WireGraph> for GraphDescription {
    fn from(graph: WireGraph) -> Self {
        Self {
            nodes: graph
                .active_modules
                .into_iter()
                .map(|(id, module)| {
                    let kind = ModuleKind::from_name(&module.module_id);
                    (id, NodeDescriptor::new(kind, module.contents))
                })
                .collect(),
            connections: graph.connections,
        }
    }
}

impl From<&Command> for WireCommand {
    fn from(command: &Command) -> Self {
        match command {
            Command::Reset => Self::Reset,
            Command::PushGraph(description) => Self::PushGraph(description.into()),
        }
    }
}

impl From<WireCommand> for Command {
    fn from(command: WireCommand) -> Self {
        match command {
            WireCommand::Reset => Self::Reset,
            WireCommand::PushGraph(graph) => Self::PushGraph(graph.into()),
        }
    }
}

impl From<&Notification> for WireNotification {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::Warning { message } => Self::Warning {
                message: message.clone(),
            },
        }
    }
}

impl From<WireNotification> for Notification {
    fn from(notification: WireNotification) -> Self {
        match notification {
            WireNotification::Warning { message } => Self::Warning { message },
        }
    }
}

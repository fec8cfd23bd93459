//! Messages exchanged between the control and render contexts.
//!
//! The control side sends [`Command`]s carrying full [`GraphDescription`]
//! snapshots; the render side answers with [`Notification`]s. Both directions
//! carry owned data only. Nothing is shared between the two contexts.

use std::collections::BTreeMap;

use crate::schema::ModuleKind;

/// Message sent when a reconciliation leaves the graph cyclic.
pub const CYCLE_WARNING: &str = "Cycle detected, please address this before continuing.";

/// Kind and content of one node in a [`GraphDescription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Module kind.
    pub kind: ModuleKind,
    /// Raw content payload (numeric literal for constant and MIDI nodes).
    pub content: String,
}

impl NodeDescriptor {
    /// Creates a descriptor.
    pub fn new(kind: ModuleKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// A full snapshot of the desired graph.
///
/// `connections` maps each source output port to the destination input ports
/// it feeds, all in wire form (`{nodeId}-output-{i}` → `[{nodeId}-input-{j}]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDescription {
    /// Node id → descriptor.
    pub nodes: BTreeMap<String, NodeDescriptor>,
    /// Source port → destination ports.
    pub connections: BTreeMap<String, Vec<String>>,
}

impl GraphDescription {
    /// Creates an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a node. Builder style.
    #[must_use]
    pub fn with_node(
        mut self,
        id: impl Into<String>,
        kind: ModuleKind,
        content: impl Into<String>,
    ) -> Self {
        self.nodes.insert(id.into(), NodeDescriptor::new(kind, content));
        self
    }

    /// Adds a connection from `source` to `dest`. Builder style.
    #[must_use]
    pub fn with_connection(mut self, source: impl Into<String>, dest: impl Into<String>) -> Self {
        self.connections
            .entry(source.into())
            .or_default()
            .push(dest.into());
        self
    }

    /// Flattens the connection map into `(source, dest)` pairs.
    pub fn connection_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.connections.iter().flat_map(|(source, dests)| {
            dests
                .iter()
                .map(move |dest| (source.as_str(), dest.as_str()))
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of `(source, dest)` pairs.
    pub fn connection_count(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }

    /// Returns `true` if there are no nodes and no connections.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connection_count() == 0
    }
}

/// Control → render messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Clear the graph and the reconciliation baseline.
    Reset,
    /// Reconcile the render-side graph against this snapshot.
    PushGraph(GraphDescription),
}

/// Render → control messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A user-facing warning, e.g. [`CYCLE_WARNING`].
    Warning {
        /// Human-readable text.
        message: String,
    },
}

impl Notification {
    /// The warning emitted after a reconciliation that produced a cycle.
    pub fn cycle_detected() -> Self {
        Self::Warning {
            message: CYCLE_WARNING.to_string(),
        }
    }

    /// Returns the message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Warning { message } => message,
        }
    }
}

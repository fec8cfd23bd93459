//! Control-side patch model.
//!
//! [`Patch`] is the desired graph as the user edits it, independent of any
//! UI. It enforces the interaction rules the render side never checks:
//! per-kind instance limits, ports declared by the schema, no self-loops, and
//! one source per input (connecting an input detaches it from its previous
//! source). Each edit is followed by [`Patch::to_command`], whose snapshot
//! the render side reconciles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::graph::{NodeId, PortDirection, PortId};
use crate::message::{Command, GraphDescription, NodeDescriptor};
use crate::schema::{ModuleKind, ModuleSchema};

/// Errors from [`Patch`] edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The module kind is not in the schema.
    UnknownModule(String),
    /// The kind already has its maximum number of instances.
    InstanceLimit {
        /// Kind name.
        kind: String,
        /// Configured limit.
        max: u32,
    },
    /// No module with this id.
    NodeNotFound(NodeId),
    /// The port is not declared by its module's schema entry, or faces the wrong way.
    InvalidPort(PortId),
    /// The connection would feed a module's output back into itself.
    SelfLoop(NodeId),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModule(kind) => write!(f, "unknown module kind {kind:?}"),
            Self::InstanceLimit { kind, max } => {
                write!(f, "module {kind:?} is limited to {max} instance(s)")
            }
            Self::NodeNotFound(id) => write!(f, "module {id} not found"),
            Self::InvalidPort(port) => write!(f, "invalid port {port}"),
            Self::SelfLoop(id) => write!(f, "cannot connect module {id} to itself"),
        }
    }
}

impl std::error::Error for PatchError {}

/// Frequency in Hz for a MIDI note number (A4 = 69 = 440 Hz). Note 0 maps to 0.
pub fn midi_note_to_freq(note: u8) -> f64 {
    if note == 0 {
        return 0.0;
    }
    440.0 * libm::pow(2.0, (f64::from(note) - 69.0) / 12.0)
}

/// The control side's editable graph.
#[derive(Debug, Clone)]
pub struct Patch {
    schema: Arc<ModuleSchema>,
    modules: BTreeMap<NodeId, NodeDescriptor>,
    /// Output port → input ports it feeds.
    connections: BTreeMap<PortId, BTreeSet<PortId>>,
    next_id: u64,
}

impl Patch {
    /// Creates an empty patch using the built-in schema.
    pub fn new() -> Self {
        Self::with_schema(Arc::new(ModuleSchema::builtin()))
    }

    /// Creates an empty patch validated against `schema`.
    pub fn with_schema(schema: Arc<ModuleSchema>) -> Self {
        Self {
            schema,
            modules: BTreeMap::new(),
            connections: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Returns the schema.
    pub fn schema(&self) -> &ModuleSchema {
        &self.schema
    }

    /// Places a new module and returns its generated id (`sin-node-3`, ...).
    ///
    /// # Errors
    ///
    /// [`PatchError::UnknownModule`] if the schema lacks the kind,
    /// [`PatchError::InstanceLimit`] if the kind's `max_instances` is reached.
    pub fn add_module(&mut self, kind: ModuleKind) -> Result<NodeId, PatchError> {
        let spec = self
            .schema
            .spec(&kind)
            .ok_or_else(|| PatchError::UnknownModule(kind.name().to_string()))?;

        if let Some(max) = spec.max_instances {
            let count = self.modules.values().filter(|m| m.kind == kind).count();
            if count >= usize::try_from(max).unwrap_or(usize::MAX) {
                return Err(PatchError::InstanceLimit {
                    kind: kind.name().to_string(),
                    max,
                });
            }
        }

        let stem = spec.name.to_lowercase();
        let id = loop {
            let candidate = NodeId::new(format!("{stem}-node-{}", self.next_id));
            self.next_id += 1;
            if !self.modules.contains_key(&candidate) {
                break candidate;
            }
        };
        self.modules
            .insert(id.clone(), NodeDescriptor::new(kind, String::new()));
        Ok(id)
    }

    /// Inserts a module under a caller-chosen id, replacing any existing one.
    ///
    /// Used when restoring a saved project; no instance limit is applied.
    /// Later generated ids skip past any `-node-N` suffix seen here.
    pub fn insert_module(&mut self, id: NodeId, kind: ModuleKind, content: impl Into<String>) {
        if let Some(n) = id
            .as_str()
            .rsplit_once("-node-")
            .and_then(|(_, n)| n.parse::<u64>().ok())
        {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
        self.modules.insert(id, NodeDescriptor::new(kind, content));
    }

    /// Removes a module and every connection touching its ports.
    ///
    /// # Errors
    ///
    /// [`PatchError::NodeNotFound`] if no module has this id.
    pub fn remove_module(&mut self, id: &NodeId) -> Result<(), PatchError> {
        if self.modules.remove(id).is_none() {
            return Err(PatchError::NodeNotFound(id.clone()));
        }
        self.connections.retain(|output, inputs| {
            inputs.retain(|input| input.node() != id);
            output.node() != id && !inputs.is_empty()
        });
        Ok(())
    }

    /// Connects `output` to `input`.
    ///
    /// The input is first detached from whichever output fed it. Outputs fan
    /// out freely.
    ///
    /// # Errors
    ///
    /// [`PatchError::NodeNotFound`] for a missing module,
    /// [`PatchError::InvalidPort`] for a port the schema does not declare,
    /// [`PatchError::SelfLoop`] if both ports belong to the same module.
    pub fn connect(&mut self, output: PortId, input: PortId) -> Result<(), PatchError> {
        self.check_port(&output, PortDirection::Output)?;
        self.check_port(&input, PortDirection::Input)?;
        if output.node() == input.node() {
            return Err(PatchError::SelfLoop(output.node().clone()));
        }

        self.detach_input(&input);
        self.connections.entry(output).or_default().insert(input);
        Ok(())
    }

    /// Removes the connection from `output` to `input`. Returns `true` if it existed.
    pub fn disconnect(&mut self, output: &PortId, input: &PortId) -> bool {
        let Some(inputs) = self.connections.get_mut(output) else {
            return false;
        };
        let removed = inputs.remove(input);
        if inputs.is_empty() {
            self.connections.remove(output);
        }
        removed
    }

    /// Removes every connection from `output`. Returns how many were removed.
    pub fn clear_output(&mut self, output: &PortId) -> usize {
        self.connections.remove(output).map_or(0, |inputs| inputs.len())
    }

    /// Replaces a module's content payload.
    ///
    /// # Errors
    ///
    /// [`PatchError::NodeNotFound`] if no module has this id.
    pub fn set_content(
        &mut self,
        id: &NodeId,
        content: impl Into<String>,
    ) -> Result<(), PatchError> {
        let module = self
            .modules
            .get_mut(id)
            .ok_or_else(|| PatchError::NodeNotFound(id.clone()))?;
        module.content = content.into();
        Ok(())
    }

    /// Sets every MIDI module's content to the frequency of `note`.
    ///
    /// Returns the number of modules updated.
    pub fn set_midi_note(&mut self, note: u8) -> usize {
        let content = midi_note_to_freq(note).to_string();
        let mut updated = 0;
        for module in self.modules.values_mut() {
            if module.kind == ModuleKind::Midi {
                module.content.clone_from(&content);
                updated += 1;
            }
        }
        updated
    }

    // --- Queries ---

    /// Looks up a module.
    pub fn module(&self, id: &str) -> Option<&NodeDescriptor> {
        self.modules.get(id)
    }

    /// Iterates modules in id order.
    pub fn modules(&self) -> impl Iterator<Item = (&NodeId, &NodeDescriptor)> {
        self.modules.iter()
    }

    /// Number of modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Iterates connections as `(output, inputs)` in port order.
    pub fn connections(&self) -> impl Iterator<Item = (&PortId, &BTreeSet<PortId>)> {
        self.connections.iter()
    }

    /// Number of individual connections.
    pub fn connection_count(&self) -> usize {
        self.connections.values().map(BTreeSet::len).sum()
    }

    /// Returns the output currently feeding `input`.
    pub fn source_of(&self, input: &PortId) -> Option<&PortId> {
        self.connections
            .iter()
            .find(|(_, inputs)| inputs.contains(input))
            .map(|(output, _)| output)
    }

    /// Snapshot of the patch for the render side.
    pub fn description(&self) -> GraphDescription {
        GraphDescription {
            nodes: self
                .modules
                .iter()
                .map(|(id, module)| (id.to_string(), module.clone()))
                .collect(),
            connections: self
                .connections
                .iter()
                .map(|(output, inputs)| {
                    (
                        output.to_string(),
                        inputs.iter().map(ToString::to_string).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Wraps [`description`](Self::description) in a push command.
    pub fn to_command(&self) -> Command {
        Command::PushGraph(self.description())
    }

    fn check_port(&self, port: &PortId, direction: PortDirection) -> Result<(), PatchError> {
        let module = self
            .modules
            .get(port.node())
            .ok_or_else(|| PatchError::NodeNotFound(port.node().clone()))?;
        let declared = match direction {
            PortDirection::Input => self.schema.inputs(&module.kind),
            PortDirection::Output => self.schema.outputs(&module.kind),
        };
        if port.direction() != direction || port.index() >= declared {
            return Err(PatchError::InvalidPort(port.clone()));
        }
        Ok(())
    }

    fn detach_input(&mut self, input: &PortId) {
        self.connections.retain(|_, inputs| {
            inputs.remove(input);
            !inputs.is_empty()
        });
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new()
    }
}

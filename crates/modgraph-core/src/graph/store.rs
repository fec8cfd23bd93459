//! Graph store: node and connection storage, mutation API, cycle detection.
//!
//! [`GraphStore`] is the render side's copy of the signal graph. It is mutated
//! only by the [`Reconciler`](crate::Reconciler) (or by [`compile`](GraphStore::compile)
//! for full snapshot loads) and read by the evaluator once per sample.
//!
//! Every operation is permissive: unknown ids are no-ops, connections to
//! missing nodes are inert, and structural invalidity (a cycle) is recorded in
//! the validity flag instead of being reported as an error. A half-edited graph
//! never faults the render path.

use std::collections::HashMap;
use std::sync::Arc;

use crate::message::GraphDescription;
use crate::schema::{ModuleKind, ModuleSchema};

use super::node::{Node, NodeId};
use super::port::PortId;

/// DFS colouring for [`GraphStore::detect_cycle`].
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Authoritative set of nodes and port-level connections.
///
/// Connections are keyed by destination port, so an input port has at most
/// one source; connecting a second source overwrites the first. An output
/// port may feed any number of inputs.
#[derive(Debug, Clone)]
pub struct GraphStore {
    schema: Arc<ModuleSchema>,
    nodes: HashMap<NodeId, Node>,
    /// Destination input port → source output port.
    connections: HashMap<PortId, PortId>,
    valid: bool,
}

impl GraphStore {
    /// Creates an empty store using the built-in module schema.
    pub fn new() -> Self {
        Self::with_schema(Arc::new(ModuleSchema::builtin()))
    }

    /// Creates an empty store using `schema` for declared port counts.
    pub fn with_schema(schema: Arc<ModuleSchema>) -> Self {
        Self {
            schema,
            nodes: HashMap::new(),
            connections: HashMap::new(),
            valid: true,
        }
    }

    /// Returns the module schema.
    pub fn schema(&self) -> &ModuleSchema {
        &self.schema
    }

    // --- Mutations ---

    /// Clears all nodes and connections and marks the graph valid.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.valid = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_reset");
    }

    /// Inserts or overwrites the node keyed by `id`.
    ///
    /// Existing connections that reference `id` are left untouched, so
    /// replacing a node's kind or content keeps its wiring.
    pub fn add_node(&mut self, id: NodeId, kind: ModuleKind, content: &str) {
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, kind = %kind, "graph_add");
        let node = Node::new(id.clone(), kind, content);
        self.nodes.insert(id, node);
    }

    /// Removes a node and every connection touching any of its ports.
    ///
    /// No-op if the id is absent (connections owned by the id are still
    /// swept, so stale wiring left behind by an earlier overwrite goes away).
    pub fn remove_node(&mut self, id: &str) {
        self.nodes.remove(id);
        self.connections
            .retain(|dest, source| dest.node().as_str() != id && source.node().as_str() != id);
        #[cfg(feature = "tracing")]
        tracing::debug!(node = id, "graph_remove");
    }

    /// Connects `source` to `dest`, replacing any connection already feeding `dest`.
    pub fn add_connection(&mut self, source: PortId, dest: PortId) {
        #[cfg(feature = "tracing")]
        tracing::debug!(%source, %dest, "graph_connect");
        self.connections.insert(dest, source);
    }

    /// Removes the connection into `dest`, but only if it still comes from `source`.
    ///
    /// A connection that has since been superseded by a different source is
    /// left alone.
    pub fn remove_connection(&mut self, source: &PortId, dest: &PortId) {
        if self.connections.get(dest) == Some(source) {
            self.connections.remove(dest);
            #[cfg(feature = "tracing")]
            tracing::debug!(%source, %dest, "graph_disconnect");
        }
    }

    /// Replaces the whole graph with `description` and recomputes validity.
    ///
    /// Used for full snapshot loads (e.g. opening a project). Incremental
    /// updates go through the [`Reconciler`](crate::Reconciler) instead.
    /// Port strings that do not parse are skipped.
    pub fn compile(&mut self, description: &GraphDescription) -> bool {
        self.reset();
        for (id, node) in &description.nodes {
            self.add_node(NodeId::new(id), node.kind.clone(), &node.content);
        }
        for (source, dest) in description.connection_pairs() {
            if let (Some(source), Some(dest)) = (PortId::parse(source), PortId::parse(dest)) {
                self.add_connection(source, dest);
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(source, dest, "compile: skipping malformed port id");
            }
        }
        self.validate()
    }

    // --- Validity ---

    /// Returns `true` if the node-level graph contains a cycle.
    ///
    /// Builds a node adjacency list from the port-level connections (an edge
    /// from the source's owner to the destination's owner) and runs an
    /// iterative three-colour depth-first search. Edges touching a missing node
    /// are ignored. A self-loop is a cycle of length one.
    pub fn detect_cycle(&self) -> bool {
        let ids: Vec<&str> = self.nodes.keys().map(NodeId::as_str).collect();
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (dest, source) in &self.connections {
            if let (Some(&from), Some(&to)) = (
                index.get(source.node().as_str()),
                index.get(dest.node().as_str()),
            ) {
                adjacency[from].push(to);
            }
        }

        let mut marks = vec![Mark::Unvisited; ids.len()];
        // (node, index of the next neighbour to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..ids.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                if let Some(&next) = adjacency[node].get(cursor) {
                    frame.1 += 1;
                    match marks[next] {
                        Mark::InProgress => return true,
                        Mark::Unvisited => {
                            marks[next] = Mark::InProgress;
                            stack.push((next, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
        false
    }

    /// Recomputes the validity flag from [`detect_cycle`](Self::detect_cycle).
    ///
    /// Call once after each batch of mutations. Returns the new validity.
    pub fn validate(&mut self) -> bool {
        self.valid = !self.detect_cycle();
        self.valid
    }

    /// Overrides the validity flag.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Returns `true` if the graph was acyclic at the last validation.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    // --- Queries ---

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterates all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns the output port feeding `dest`, if any.
    pub fn source_of(&self, dest: &PortId) -> Option<&PortId> {
        self.connections.get(dest)
    }

    /// Iterates connections as `(source, dest)` pairs in unspecified order.
    pub fn connections(&self) -> impl Iterator<Item = (&PortId, &PortId)> {
        self.connections.iter().map(|(dest, source)| (source, dest))
    }

    /// Owner of the output feeding input `index` of `node`.
    #[inline]
    pub(crate) fn input_source(&self, node: &NodeId, index: u32) -> Option<&NodeId> {
        self.connections
            .get(&PortId::input(node.clone(), index))
            .map(PortId::node)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(node: &str) -> PortId {
        PortId::output(node, 0)
    }

    fn inp(node: &str, index: u32) -> PortId {
        PortId::input(node, index)
    }

    fn chain() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node("c".into(), ModuleKind::Constant, "2");
        store.add_node("s".into(), ModuleKind::Sine, "");
        store.add_node("o".into(), ModuleKind::Output, "");
        store.add_connection(out("c"), inp("s", 0));
        store.add_connection(out("s"), inp("o", 0));
        store
    }

    #[test]
    fn test_add_nodes_and_connections() {
        let store = chain();
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.connection_count(), 2);
        assert_eq!(store.source_of(&inp("s", 0)), Some(&out("c")));
        assert!(store.is_valid());
    }

    #[test]
    fn test_add_node_overwrites_and_keeps_wiring() {
        let mut store = chain();
        store.add_node("c".into(), ModuleKind::Constant, "7");
        assert_eq!(store.node("c").unwrap().value(), 7.0);
        assert_eq!(store.connection_count(), 2);
    }

    #[test]
    fn test_one_source_per_input() {
        let mut store = chain();
        store.add_node("c2".into(), ModuleKind::Constant, "3");
        store.add_connection(out("c2"), inp("s", 0));
        assert_eq!(store.connection_count(), 2);
        assert_eq!(store.source_of(&inp("s", 0)), Some(&out("c2")));
    }

    #[test]
    fn test_fan_out() {
        let mut store = chain();
        store.add_node("s2".into(), ModuleKind::Square, "");
        store.add_connection(out("c"), inp("s2", 0));
        assert_eq!(store.connection_count(), 3);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut store = chain();
        store.remove_node("s");
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.connection_count(), 0);
    }

    #[test]
    fn test_remove_node_exact_owner_only() {
        let mut store = GraphStore::new();
        store.add_node("a".into(), ModuleKind::Constant, "1");
        store.add_node("ab".into(), ModuleKind::Sine, "");
        store.add_node("o".into(), ModuleKind::Output, "");
        store.add_connection(out("ab"), inp("o", 0));
        store.remove_node("a");
        assert_eq!(store.connection_count(), 1);
    }

    #[test]
    fn test_remove_unknown_node_is_noop() {
        let mut store = chain();
        store.remove_node("missing");
        store.remove_node("missing");
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.connection_count(), 2);
    }

    #[test]
    fn test_remove_connection_requires_matching_source() {
        let mut store = chain();
        store.remove_connection(&out("o"), &inp("s", 0));
        assert_eq!(store.connection_count(), 2);
        store.remove_connection(&out("c"), &inp("s", 0));
        assert_eq!(store.connection_count(), 1);
        assert!(store.source_of(&inp("s", 0)).is_none());
    }

    #[test]
    fn test_cycle_detection_direct() {
        let mut store = GraphStore::new();
        store.add_node("a".into(), ModuleKind::Add, "");
        store.add_node("b".into(), ModuleKind::Add, "");
        store.add_connection(out("a"), inp("b", 0));
        assert!(!store.detect_cycle());
        store.add_connection(out("b"), inp("a", 0));
        assert!(store.detect_cycle());
        assert!(!store.validate());
        assert!(!store.is_valid());
    }

    #[test]
    fn test_cycle_detection_indirect() {
        let mut store = chain();
        store.add_node("m".into(), ModuleKind::Multiply, "");
        store.add_connection(out("s"), inp("m", 0));
        store.add_connection(out("m"), inp("s", 0));
        assert!(store.detect_cycle());
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut store = GraphStore::new();
        store.add_node("a".into(), ModuleKind::Add, "");
        store.add_connection(out("a"), inp("a", 1));
        assert!(store.detect_cycle());
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let mut store = GraphStore::new();
        for id in ["c", "l", "r", "sum"] {
            store.add_node(id.into(), ModuleKind::Add, "");
        }
        store.add_connection(out("c"), inp("l", 0));
        store.add_connection(out("c"), inp("r", 0));
        store.add_connection(out("l"), inp("sum", 0));
        store.add_connection(out("r"), inp("sum", 1));
        assert!(!store.detect_cycle());
    }

    #[test]
    fn test_disconnected_components() {
        let mut store = chain();
        store.add_node("x".into(), ModuleKind::Add, "");
        store.add_node("y".into(), ModuleKind::Add, "");
        store.add_connection(out("x"), inp("y", 0));
        assert!(!store.detect_cycle());
        store.add_connection(out("y"), inp("x", 0));
        assert!(store.detect_cycle());
    }

    #[test]
    fn test_edges_to_missing_nodes_ignored() {
        let mut store = GraphStore::new();
        store.add_node("a".into(), ModuleKind::Add, "");
        store.add_connection(out("ghost"), inp("a", 0));
        store.add_connection(out("a"), inp("ghost", 0));
        assert!(!store.detect_cycle());
    }

    #[test]
    fn test_reset() {
        let mut store = chain();
        store.add_connection(out("o"), inp("c", 0));
        store.validate();
        store.reset();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.connection_count(), 0);
        assert!(store.is_valid());
    }

    #[test]
    fn test_compile_from_description() {
        let description = GraphDescription::new()
            .with_node("c", ModuleKind::Constant, "5")
            .with_node("o", ModuleKind::Output, "")
            .with_connection("c-output-0", "o-input-0")
            .with_connection("bogus", "o-input-0");
        let mut store = chain();
        assert!(store.compile(&description));
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.connection_count(), 1);
    }

    #[test]
    fn test_compile_cyclic_description_is_invalid() {
        let description = GraphDescription::new()
            .with_node("a", ModuleKind::Add, "")
            .with_node("b", ModuleKind::Add, "")
            .with_connection("a-output-0", "b-input-0")
            .with_connection("b-output-0", "a-input-0");
        let mut store = GraphStore::new();
        assert!(!store.compile(&description));
        assert!(!store.is_valid());
    }
}

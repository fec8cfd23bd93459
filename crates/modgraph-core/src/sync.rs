//! Incremental reconciliation of graph snapshots into a [`GraphStore`].
//!
//! The control context sends complete snapshots; the render context must apply
//! them without tearing down the running graph. [`Reconciler`] keeps the last
//! applied snapshot and turns each new one into the minimal set of store
//! mutations:
//!
//! 1. Nodes only in the old snapshot are removed (cascading their
//!    connections); nodes only in the new one are added; nodes whose kind or
//!    content changed are overwritten in place.
//! 2. Connections are flattened to `(source, dest)` pairs on both sides and
//!    the set difference is applied one connection at a time.
//! 3. Validity is recomputed once, and the new snapshot becomes the baseline
//!    even when it is cyclic, so a later fix can be diffed against it.

use std::collections::BTreeSet;

use crate::graph::{GraphStore, NodeId, PortDirection, PortId};
use crate::message::GraphDescription;

/// Counts of the mutations applied by one [`Reconciler::reconcile`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Nodes newly inserted.
    pub nodes_added: usize,
    /// Existing nodes replaced because their kind or content changed.
    pub nodes_updated: usize,
    /// Nodes removed (with their connections).
    pub nodes_removed: usize,
    /// Connections applied.
    pub connections_added: usize,
    /// Connections retracted.
    pub connections_removed: usize,
    /// New pairs dropped because both ends belong to the same node.
    pub self_loops_skipped: usize,
    /// Validity of the store after the pass.
    pub valid: bool,
}

impl ReconcileReport {
    /// Total number of store mutations performed.
    pub fn changes(&self) -> usize {
        self.nodes_added
            + self.nodes_updated
            + self.nodes_removed
            + self.connections_added
            + self.connections_removed
    }

    /// Returns `true` if the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.changes() == 0
    }
}

/// Diffs incoming snapshots against the previously applied one.
///
/// Owns its baseline, so independent graphs (or tests) never share state.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    previous: GraphDescription,
}

impl Reconciler {
    /// Creates a reconciler with an empty baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last applied snapshot.
    pub fn previous(&self) -> &GraphDescription {
        &self.previous
    }

    /// Clears `store` and forgets the baseline.
    pub fn reset(&mut self, store: &mut GraphStore) {
        store.reset();
        self.previous = GraphDescription::default();
    }

    /// Applies the difference between the baseline and `desired` to `store`.
    pub fn reconcile(
        &mut self,
        store: &mut GraphStore,
        desired: GraphDescription,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // --- Nodes ---
        for id in self.previous.nodes.keys() {
            if !desired.nodes.contains_key(id) {
                store.remove_node(id);
                report.nodes_removed += 1;
            }
        }
        for (id, node) in &desired.nodes {
            match self.previous.nodes.get(id) {
                None => report.nodes_added += 1,
                Some(old) if old != node => report.nodes_updated += 1,
                Some(_) => continue,
            }
            store.add_node(NodeId::new(id), node.kind.clone(), &node.content);
        }

        // --- Connections ---
        let old_pairs: BTreeSet<(&str, &str)> = self.previous.connection_pairs().collect();
        let new_pairs: BTreeSet<(&str, &str)> = desired.connection_pairs().collect();

        for &(source, dest) in old_pairs.difference(&new_pairs) {
            if let Some((source, dest)) = parse_pair(source, dest) {
                if store.source_of(&dest) == Some(&source) {
                    report.connections_removed += 1;
                }
                store.remove_connection(&source, &dest);
            }
        }
        for &(source, dest) in new_pairs.difference(&old_pairs) {
            let Some((source, dest)) = parse_pair(source, dest) else {
                continue;
            };
            if source.node() == dest.node() {
                report.self_loops_skipped += 1;
                continue;
            }
            store.add_connection(source, dest);
            report.connections_added += 1;
        }

        report.valid = store.validate();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes_added = report.nodes_added,
            nodes_updated = report.nodes_updated,
            nodes_removed = report.nodes_removed,
            connections_added = report.connections_added,
            connections_removed = report.connections_removed,
            valid = report.valid,
            "reconcile"
        );

        self.previous = desired;
        report
    }
}

/// Parses a wire pair, requiring an output source and an input destination.
fn parse_pair(source: &str, dest: &str) -> Option<(PortId, PortId)> {
    match (PortId::parse(source), PortId::parse(dest)) {
        (Some(s), Some(d))
            if s.direction() == PortDirection::Output && d.direction() == PortDirection::Input =>
        {
            Some((s, d))
        }
        _ => {
            #[cfg(feature = "tracing")]
            tracing::warn!(source, dest, "reconcile: skipping malformed connection");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Evaluator;
    use crate::schema::ModuleKind;

    fn sine_patch() -> GraphDescription {
        GraphDescription::new()
            .with_node("c", ModuleKind::Constant, "2")
            .with_node("s", ModuleKind::Sine, "")
            .with_node("o", ModuleKind::Output, "")
            .with_connection("c-output-0", "s-input-0")
            .with_connection("s-output-0", "o-input-0")
    }

    #[test]
    fn test_first_push_adds_everything() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        let report = reconciler.reconcile(&mut store, sine_patch());
        assert_eq!(report.nodes_added, 3);
        assert_eq!(report.connections_added, 2);
        assert!(report.valid);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.connection_count(), 2);
    }

    #[test]
    fn test_unchanged_push_is_noop() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&mut store, sine_patch());
        let report = reconciler.reconcile(&mut store, sine_patch());
        assert!(report.is_noop());
        assert!(report.valid);
    }

    #[test]
    fn test_content_change_replaces_node() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&mut store, sine_patch());
        let edited = sine_patch().with_node("c", ModuleKind::Constant, "4");
        let report = reconciler.reconcile(&mut store, edited);
        assert_eq!(report.nodes_updated, 1);
        assert_eq!(report.connections_added, 0);
        assert_eq!(store.node("c").unwrap().value(), 4.0);
        assert_eq!(store.connection_count(), 2);
    }

    #[test]
    fn test_removed_node_cascades() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&mut store, sine_patch());

        let mut desired = sine_patch();
        desired.nodes.remove("s");
        desired.connections.clear();
        let report = reconciler.reconcile(&mut store, desired);
        assert_eq!(report.nodes_removed, 1);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.connection_count(), 0);
    }

    #[test]
    fn test_removed_connection_keeps_endpoints() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&mut store, sine_patch());

        let mut desired = sine_patch();
        desired.connections.remove("s-output-0");
        let report = reconciler.reconcile(&mut store, desired);
        assert_eq!(report.connections_removed, 1);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.connection_count(), 1);

        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&store, 0.125), 0.0);
        let probe = evaluator.evaluate_node(&store, &NodeId::new("s"), 0.125);
        assert!((probe - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_is_kept_and_reported() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        let cyclic = GraphDescription::new()
            .with_node("a", ModuleKind::Add, "")
            .with_node("b", ModuleKind::Add, "")
            .with_node("o", ModuleKind::Output, "")
            .with_connection("a-output-0", "b-input-0")
            .with_connection("b-output-0", "a-input-0")
            .with_connection("b-output-0", "o-input-0");
        let report = reconciler.reconcile(&mut store, cyclic.clone());
        assert!(!report.valid);
        assert_eq!(store.connection_count(), 3);
        assert_eq!(reconciler.previous(), &cyclic);

        let mut fixed = cyclic;
        fixed.connections.insert("b-output-0".into(), vec!["o-input-0".into()]);
        let report = reconciler.reconcile(&mut store, fixed);
        assert!(report.valid);
        assert_eq!(report.connections_removed, 1);
    }

    #[test]
    fn test_self_loop_skipped() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        let desired = GraphDescription::new()
            .with_node("a", ModuleKind::Add, "")
            .with_connection("a-output-0", "a-input-1");
        let report = reconciler.reconcile(&mut store, desired);
        assert_eq!(report.self_loops_skipped, 1);
        assert_eq!(store.connection_count(), 0);
        assert!(report.valid);
    }

    #[test]
    fn test_superseded_connection_not_retracted() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        let first = GraphDescription::new()
            .with_node("x", ModuleKind::Constant, "1")
            .with_node("y", ModuleKind::Constant, "2")
            .with_node("o", ModuleKind::Output, "")
            .with_connection("x-output-0", "o-input-0");
        reconciler.reconcile(&mut store, first);

        let second = GraphDescription::new()
            .with_node("x", ModuleKind::Constant, "1")
            .with_node("y", ModuleKind::Constant, "2")
            .with_node("o", ModuleKind::Output, "")
            .with_connection("y-output-0", "o-input-0");
        reconciler.reconcile(&mut store, second);

        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&store, 0.0), 2.0);
        assert_eq!(store.connection_count(), 1);
    }

    #[test]
    fn test_malformed_ports_ignored() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        let desired = GraphDescription::new()
            .with_node("a", ModuleKind::Add, "")
            .with_connection("garbage", "a-input-0")
            .with_connection("a-input-0", "a-output-0");
        let report = reconciler.reconcile(&mut store, desired);
        assert_eq!(report.connections_added, 0);
        assert_eq!(store.connection_count(), 0);
    }

    #[test]
    fn test_reset_clears_baseline() {
        let mut store = GraphStore::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&mut store, sine_patch());
        reconciler.reset(&mut store);
        assert_eq!(store.node_count(), 0);
        assert!(reconciler.previous().nodes.is_empty());
        let report = reconciler.reconcile(&mut store, sine_patch());
        assert_eq!(report.nodes_added, 3);
    }
}

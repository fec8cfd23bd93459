//! Node identity and the per-node record held by the graph store.
//!
//! A node is keyed by an opaque [`NodeId`] token chosen by the control side
//! (e.g. `"sin-node-3"`). The record bundles the node's [`ModuleKind`] with its
//! textual content payload and the numeric value parsed from that payload once,
//! at insertion time, so the evaluator never parses strings per sample.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::content::parse_content;
use crate::schema::ModuleKind;

/// Opaque identifier for a node in the signal graph.
///
/// Backed by a shared string so clones are a reference-count bump; the
/// evaluator clones ids into its per-pass cache without allocating.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Creates a node id from any string-like token.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", &*self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node record: identity, module kind, and content payload.
///
/// Nodes are never mutated in place. A content edit on the control side
/// arrives as a full replacement of the record under the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: ModuleKind,
    content: String,
    /// `content` parsed as a number (0 when not numeric).
    value: f64,
}

impl Node {
    /// Creates a node record, parsing `content` as a numeric literal.
    pub fn new(id: NodeId, kind: ModuleKind, content: impl Into<String>) -> Self {
        let content = content.into();
        let value = parse_content(&content);
        Self {
            id,
            kind,
            content,
            value,
        }
    }

    /// Returns the node's id.
    #[inline]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the node's module kind.
    #[inline]
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// Returns the raw content payload.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the content payload parsed as a number.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

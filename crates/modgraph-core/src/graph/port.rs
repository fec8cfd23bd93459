//! Port identifiers.
//!
//! Ports are the attachment points of connections. On the wire a port is a
//! string derived from its owning node: `{nodeId}-input-{index}` or
//! `{nodeId}-output-{index}`. [`PortId`] is the parsed form; the store keys
//! connections by it so that cascading removal and adjacency construction
//! compare owning node ids directly instead of string prefixes.

use std::fmt;

use super::node::NodeId;

/// Which side of a node a port sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortDirection {
    /// Receives a signal. At most one incoming connection.
    Input,
    /// Emits a signal. May fan out to any number of inputs.
    Output,
}

impl PortDirection {
    /// Separator between node id and index in the wire form.
    fn marker(self) -> &'static str {
        match self {
            Self::Input => "-input-",
            Self::Output => "-output-",
        }
    }
}

/// A parsed port identifier: owning node, direction, and index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    node: NodeId,
    direction: PortDirection,
    index: u32,
}

impl PortId {
    /// Input port `index` of `node`.
    pub fn input(node: impl Into<NodeId>, index: u32) -> Self {
        Self {
            node: node.into(),
            direction: PortDirection::Input,
            index,
        }
    }

    /// Output port `index` of `node`.
    pub fn output(node: impl Into<NodeId>, index: u32) -> Self {
        Self {
            node: node.into(),
            direction: PortDirection::Output,
            index,
        }
    }

    /// Parses the wire form `{nodeId}-input-{index}` / `{nodeId}-output-{index}`.
    ///
    /// The rightmost direction marker wins, so node ids may contain dashes
    /// (`"sin-node-0-output-0"` belongs to node `"sin-node-0"`). Returns `None`
    /// when no marker is present, the node part is empty, or the index is not
    /// a plain decimal integer.
    pub fn parse(port: &str) -> Option<Self> {
        let (pos, direction) = [PortDirection::Input, PortDirection::Output]
            .into_iter()
            .filter_map(|d| port.rfind(d.marker()).map(|pos| (pos, d)))
            .max_by_key(|&(pos, _)| pos)?;

        let node = &port[..pos];
        let digits = &port[pos + direction.marker().len()..];
        if node.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse().ok()?;

        Some(Self {
            node: NodeId::new(node),
            direction,
            index,
        })
    }

    /// Returns the owning node's id.
    #[inline]
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Returns the port direction.
    #[inline]
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Returns the port index on its node.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.node, self.direction.marker(), self.index)
    }
}

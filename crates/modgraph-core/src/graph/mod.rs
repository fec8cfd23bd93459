//! Signal graph model and per-sample evaluation.
//!
//! The graph module holds the render side's copy of the patch and computes one
//! mixed output sample per time value:
//!
//! - [`GraphStore`]: nodes, port-level connections and the validity flag.
//!   Mutated only between samples (reconciliation, snapshot loads).
//! - [`Evaluator`]: walks each output node's dependency chain for a given
//!   time, memoizing node values in an [`EvalCache`] for exactly one pass.
//!
//! # Architecture
//!
//! Connections are keyed by destination port: an input has at most one source,
//! an output may fan out. Structural errors never fault. A connection to a
//! missing node contributes 0, and a cycle clears the validity flag so the
//! evaluator returns silence until the cycle is removed.
//!
//! # Example
//!
//! ```rust
//! use modgraph_core::graph::{Evaluator, GraphStore, PortId};
//! use modgraph_core::ModuleKind;
//!
//! let mut store = GraphStore::new();
//! store.add_node("five".into(), ModuleKind::Constant, "5");
//! store.add_node("three".into(), ModuleKind::Constant, "3");
//! store.add_node("sum".into(), ModuleKind::Add, "");
//! store.add_node("out".into(), ModuleKind::Output, "");
//! store.add_connection(PortId::output("five", 0), PortId::input("sum", 0));
//! store.add_connection(PortId::output("three", 0), PortId::input("sum", 1));
//! store.add_connection(PortId::output("sum", 0), PortId::input("out", 0));
//! store.validate();
//!
//! let mut evaluator = Evaluator::new();
//! assert_eq!(evaluator.evaluate(&store, 0.5), 8.0);
//! ```

mod evaluate;
pub mod node;
pub mod port;
mod store;

pub use evaluate::{EvalCache, Evaluator};
pub use node::{Node, NodeId};
pub use port::{PortDirection, PortId};
pub use store::GraphStore;

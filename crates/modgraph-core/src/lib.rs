//! Modgraph Core - signal-flow graph and per-sample evaluation engine
//!
//! This crate holds the graph model shared by the control and render contexts
//! of a modular synthesizer. It performs no I/O; audio hosts, file formats and
//! the CLI live in sibling crates.
//!
//! # Core Abstractions
//!
//! ## Graph Model
//!
//! - [`GraphStore`] - Nodes, port-level connections and the validity flag
//! - [`NodeId`] / [`PortId`] - Node tokens and parsed `{node}-input-{i}` port ids
//! - [`ModuleKind`] - Closed set of node behaviours, one pure function each
//! - [`ModuleSchema`] - External port-count and instance-limit table
//!
//! ## Evaluation
//!
//! - [`Evaluator`] - Sums every output node's dependency chain for one time value
//! - [`EvalCache`] - Per-pass memoization, cleared between samples
//!
//! ## Synchronization
//!
//! - [`Reconciler`] - Turns snapshot-to-snapshot differences into store mutations
//! - [`Command`] / [`Notification`] - Control → render and render → control messages
//! - [`Renderer`] - Render-side owner of store, reconciler and sample clock
//!
//! ## Control Side
//!
//! - [`Patch`] - Editable desired graph enforcing interaction rules
//!
//! # Features
//!
//! - `tracing` - emit `tracing` events for graph mutations and reconciliation
//!
//! # Example
//!
//! ```rust
//! use modgraph_core::{Command, ModuleKind, Patch, PortId, Renderer};
//!
//! let mut patch = Patch::new();
//! let freq = patch.add_module(ModuleKind::Constant).unwrap();
//! let osc = patch.add_module(ModuleKind::Sine).unwrap();
//! let out = patch.add_module(ModuleKind::Output).unwrap();
//! patch.set_content(&freq, "440").unwrap();
//! patch.connect(PortId::output(freq, 0), PortId::input(osc.clone(), 0)).unwrap();
//! patch.connect(PortId::output(osc, 0), PortId::input(out, 0)).unwrap();
//!
//! let mut renderer = Renderer::new(48000.0);
//! assert!(renderer.handle(patch.to_command()).is_none());
//!
//! let mut buffer = [0.0_f32; 512];
//! renderer.process(&mut buffer, 2);
//! ```

pub mod content;
pub mod graph;
pub mod message;
pub mod patch;
pub mod render;
pub mod schema;
pub mod sync;

pub use content::parse_content;
pub use graph::{EvalCache, Evaluator, GraphStore, Node, NodeId, PortDirection, PortId};
pub use message::{CYCLE_WARNING, Command, GraphDescription, NodeDescriptor, Notification};
pub use patch::{Patch, PatchError, midi_note_to_freq};
pub use render::Renderer;
pub use schema::{ModuleKind, ModuleSchema, ModuleSpec};
pub use sync::{ReconcileReport, Reconciler};

//! Render loop: applies commands and produces sample buffers.
//!
//! [`Renderer`] is everything the render context owns. It receives
//! [`Command`]s between buffers, reconciles them into its [`GraphStore`], and
//! fills interleaved output buffers from the [`Evaluator`] one sample at a
//! time. Nothing here blocks or allocates per sample.

use std::sync::Arc;

use crate::graph::{Evaluator, GraphStore};
use crate::message::{Command, GraphDescription, Notification};
use crate::schema::ModuleSchema;
use crate::sync::{ReconcileReport, Reconciler};

/// Render-side state: graph, reconciler, evaluator and clock.
///
/// Time is derived from a frame counter (`frames / sample_rate`) rather than
/// accumulated, so it does not drift over long sessions. The clock stands
/// still while the graph is invalid.
#[derive(Debug, Clone)]
pub struct Renderer {
    store: GraphStore,
    reconciler: Reconciler,
    evaluator: Evaluator,
    sample_rate: f64,
    frames: u64,
}

impl Renderer {
    /// Creates a renderer with the built-in module schema.
    pub fn new(sample_rate: f64) -> Self {
        Self::with_schema(sample_rate, Arc::new(ModuleSchema::builtin()))
    }

    /// Creates a renderer whose store uses `schema`.
    pub fn with_schema(sample_rate: f64, schema: Arc<ModuleSchema>) -> Self {
        Self {
            store: GraphStore::with_schema(schema),
            reconciler: Reconciler::new(),
            evaluator: Evaluator::new(),
            sample_rate,
            frames: 0,
        }
    }

    /// Applies a command. Returns a notification for the control side, if any.
    ///
    /// `Reset` clears the graph and the reconciliation baseline but leaves
    /// the clock running. `PushGraph` reconciles and yields a cycle warning
    /// when the result is invalid.
    pub fn handle(&mut self, command: Command) -> Option<Notification> {
        match command {
            Command::Reset => {
                self.reconciler.reset(&mut self.store);
                None
            }
            Command::PushGraph(description) => {
                let report = self.reconcile(description);
                if report.valid {
                    None
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("cycle detected, output muted");
                    Some(Notification::cycle_detected())
                }
            }
        }
    }

    /// Reconciles a snapshot directly, returning the full report.
    pub fn reconcile(&mut self, description: GraphDescription) -> ReconcileReport {
        self.reconciler.reconcile(&mut self.store, description)
    }

    /// Computes the next sample and advances the clock.
    ///
    /// Returns 0 without advancing while the graph is invalid.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        if !self.store.is_valid() {
            return 0.0;
        }
        let sample = self.evaluator.evaluate(&self.store, self.time());
        self.frames += 1;
        sample
    }

    /// Fills an interleaved buffer, writing each sample to every channel.
    ///
    /// While the graph is invalid the whole buffer is zeroed. A trailing
    /// partial frame is zeroed as well.
    pub fn process(&mut self, buffer: &mut [f32], channels: usize) {
        if !self.store.is_valid() || channels == 0 {
            buffer.fill(0.0);
            return;
        }
        let mut frames = buffer.chunks_exact_mut(channels);
        for frame in &mut frames {
            #[allow(clippy::cast_possible_truncation)]
            let sample = self.next_sample() as f32;
            frame.fill(sample);
        }
        frames.into_remainder().fill(0.0);
    }

    /// Current time in seconds.
    #[inline]
    pub fn time(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let frames = self.frames as f64;
        frames / self.sample_rate
    }

    /// Number of frames rendered since creation.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns `true` if the graph is currently renderable.
    pub fn is_valid(&self) -> bool {
        self.store.is_valid()
    }

    /// Read access to the graph.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }
}

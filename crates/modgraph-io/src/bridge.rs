//! Control ↔ render message passing.
//!
//! The render context owns the [`Renderer`] outright. The control context
//! only ever sends it copies of the desired graph, and hears back through a
//! small bounded channel:
//!
//! ```text
//!  ControlHandle ── Command (unbounded) ──▶ RenderEndpoint ──▶ audio buffer
//!        ▲                                        │
//!        └──── Notification (bounded, lossy) ─────┘
//! ```
//!
//! The render side only uses `try_recv` / `try_send`, so an audio callback
//! never waits on the control side.

use crate::backend::OutputCallback;
use crossbeam_channel::{
    Receiver, RecvTimeoutError, Sender, TrySendError, bounded, unbounded,
};
use modgraph_core::{Command, GraphDescription, Notification, Renderer};
use std::time::Duration;

/// Pending notifications held before the render side starts dropping them.
pub const NOTIFICATION_CAPACITY: usize = 16;

/// A renderer split into its control and render halves.
#[derive(Debug)]
pub struct GraphBridge {
    control: ControlHandle,
    render: RenderEndpoint,
}

impl GraphBridge {
    /// Wraps `renderer`, which moves to the render half.
    pub fn new(renderer: Renderer) -> Self {
        let (command_tx, command_rx) = unbounded();
        let (notification_tx, notification_rx) = bounded(NOTIFICATION_CAPACITY);
        Self {
            control: ControlHandle {
                command_tx,
                notification_rx,
            },
            render: RenderEndpoint {
                renderer,
                command_rx,
                notification_tx,
                dropped_notifications: 0,
            },
        }
    }

    /// Splits into the control half and the render half.
    pub fn split(self) -> (ControlHandle, RenderEndpoint) {
        (self.control, self.render)
    }
}

/// Control-side half: sends commands, collects warnings.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    command_tx: Sender<Command>,
    notification_rx: Receiver<Notification>,
}

impl ControlHandle {
    /// Queues a command for the render side.
    ///
    /// Returns `false` once the render side has been dropped.
    pub fn send(&self, command: Command) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// Queues a full graph snapshot.
    pub fn push_graph(&self, description: GraphDescription) -> bool {
        self.send(Command::PushGraph(description))
    }

    /// Queues a reset.
    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }

    /// Next pending notification, if any.
    pub fn try_notification(&self) -> Option<Notification> {
        self.notification_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for a notification.
    ///
    /// Returns `None` on timeout or when the render side is gone.
    pub fn notification_timeout(&self, timeout: Duration) -> Option<Notification> {
        match self.notification_rx.recv_timeout(timeout) {
            Ok(notification) => Some(notification),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains every pending notification.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notification_rx.try_iter().collect()
    }

    /// Commands queued but not yet applied by the render side.
    pub fn pending_commands(&self) -> usize {
        self.command_tx.len()
    }
}

/// Render-side half, owned by the audio callback.
#[derive(Debug)]
pub struct RenderEndpoint {
    renderer: Renderer,
    command_rx: Receiver<Command>,
    notification_tx: Sender<Notification>,
    dropped_notifications: u64,
}

impl RenderEndpoint {
    /// Applies every queued command without blocking.
    ///
    /// Returns the number of commands applied.
    pub fn poll_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.command_rx.try_recv() {
            applied += 1;
            if let Some(notification) = self.renderer.handle(command) {
                self.publish(notification);
            }
        }
        applied
    }

    /// Applies queued commands, then fills an interleaved buffer.
    pub fn process(&mut self, buffer: &mut [f32], channels: usize) {
        self.poll_commands();
        self.renderer.process(buffer, channels);
    }

    /// Moves the endpoint into a boxed output callback for an
    /// [`AudioBackend`](crate::AudioBackend).
    pub fn into_output_callback(mut self, channels: usize) -> OutputCallback {
        Box::new(move |buffer: &mut [f32]| self.process(buffer, channels))
    }

    /// The wrapped renderer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Notifications discarded because the control side was not reading.
    pub fn dropped_notifications(&self) -> u64 {
        self.dropped_notifications
    }

    fn publish(&mut self, notification: Notification) {
        match self.notification_tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped_notifications += 1;
                tracing::warn!(
                    dropped = self.dropped_notifications,
                    "notification queue full, dropping warning"
                );
            }
            // Control side hung up; nobody left to tell.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgraph_core::{CYCLE_WARNING, ModuleKind};

    fn constant(value: &str) -> GraphDescription {
        GraphDescription::new()
            .with_node("const-node-0", ModuleKind::Constant, value)
            .with_node("out-node-1", ModuleKind::Output, "")
            .with_connection("const-node-0-output-0", "out-node-1-input-0")
    }

    fn cycle() -> GraphDescription {
        GraphDescription::new()
            .with_node("add-node-0", ModuleKind::Add, "")
            .with_node("mul-node-1", ModuleKind::Multiply, "")
            .with_connection("add-node-0-output-0", "mul-node-1-input-0")
            .with_connection("mul-node-1-output-0", "add-node-0-input-0")
    }

    #[test]
    fn test_commands_applied_on_next_buffer() {
        let (control, mut render) = GraphBridge::new(Renderer::new(100.0)).split();
        let mut buffer = [1.0f32; 4];

        render.process(&mut buffer, 2);
        assert_eq!(buffer, [0.0; 4]);

        assert!(control.push_graph(constant("0.5")));
        assert_eq!(control.pending_commands(), 1);
        render.process(&mut buffer, 2);
        assert_eq!(buffer, [0.5; 4]);
        assert_eq!(control.pending_commands(), 0);
        assert!(control.try_notification().is_none());
    }

    #[test]
    fn test_cycle_warning_reaches_control() {
        let (control, mut render) = GraphBridge::new(Renderer::new(100.0)).split();
        control.push_graph(cycle());
        assert_eq!(render.poll_commands(), 1);

        let warning = control.try_notification().unwrap();
        assert_eq!(warning.message(), CYCLE_WARNING);

        let mut buffer = [1.0f32; 8];
        render.process(&mut buffer, 2);
        assert_eq!(buffer, [0.0; 8]);
    }

    #[test]
    fn test_reset_then_push() {
        let (control, mut render) = GraphBridge::new(Renderer::new(100.0)).split();
        control.push_graph(constant("2"));
        control.reset();
        control.push_graph(constant("3"));
        assert_eq!(render.poll_commands(), 3);

        let mut buffer = [0.0f32; 1];
        render.process(&mut buffer, 1);
        assert_eq!(buffer, [3.0]);
        assert_eq!(render.renderer().store().node_count(), 2);
    }

    #[test]
    fn test_full_notification_queue_never_blocks() {
        let (control, mut render) = GraphBridge::new(Renderer::new(100.0)).split();
        for _ in 0..NOTIFICATION_CAPACITY + 3 {
            control.push_graph(cycle());
        }
        render.poll_commands();

        assert_eq!(render.dropped_notifications(), 3);
        assert_eq!(control.drain_notifications().len(), NOTIFICATION_CAPACITY);
    }

    #[test]
    fn test_send_after_render_dropped() {
        let (control, render) = GraphBridge::new(Renderer::new(100.0)).split();
        drop(render);
        assert!(!control.reset());
        assert!(
            control
                .notification_timeout(Duration::from_millis(1))
                .is_none()
        );
    }

    #[test]
    fn test_output_callback_runs_on_another_thread() {
        let (control, render) = GraphBridge::new(Renderer::new(100.0)).split();
        control.push_graph(constant("0.25"));
        let mut callback = render.into_output_callback(2);

        let buffer = std::thread::spawn(move || {
            let mut buffer = vec![0.0f32; 6];
            callback(&mut buffer);
            buffer
        })
        .join()
        .unwrap();
        assert_eq!(buffer, vec![0.25; 6]);
    }
}

//! Pluggable audio backend abstraction.
//!
//! [`AudioBackend`] keeps the render path independent of any platform audio
//! API. [`CpalBackend`](crate::CpalBackend) is the default; tests and
//! embedders can supply their own.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  modgraph play / embedders   │
//! └──────────────┬───────────────┘
//!                │ AudioBackend
//!        ┌───────┴────────┐
//!        ▼                ▼
//!  ┌───────────┐   ┌─────────────┐
//!  │CpalBackend│   │ custom/mock │
//!  └───────────┘   └─────────────┘
//! ```
//!
//! Callbacks are boxed so the trait stays object-safe, and streams come back
//! as a type-erased [`StreamHandle`] that stops playback when dropped.

use crate::{AudioDevice, Result};

/// Configuration for building an output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of interleaved output channels.
    pub channels: u16,
    /// Device name filter; the system default is used when `None`.
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream runs while this handle exists; dropping it stops playback.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wraps a backend-specific stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time audio thread and must fill the interleaved buffer
/// (`[L0, R0, L1, R1, ...]` for stereo). It must not block.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Stream error callback, receiving a human-readable message.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Platform audio API used to play a rendered graph.
pub trait AudioBackend: Send {
    /// Human-readable backend name (e.g. `"cpal"`).
    fn name(&self) -> &str;

    /// Lists output-capable devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The system default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Builds and starts an output stream.
    ///
    /// `callback` is invoked once per hardware buffer. The returned
    /// [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Sample rate the backend will actually run at for `config`.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}

//! Audio host integration for modgraph.
//!
//! This crate connects the engine in `modgraph-core` to the outside world:
//!
//! - **Backends**: [`AudioBackend`] abstracts the platform audio API;
//!   [`CpalBackend`] is the default implementation
//! - **Bridge**: [`GraphBridge`] splits a [`Renderer`](modgraph_core::Renderer)
//!   into a [`ControlHandle`] for the editing side and a [`RenderEndpoint`]
//!   owned by the audio callback
//! - **Offline rendering**: [`render_to_wav`] writes a patch to disk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modgraph_core::{Patch, Renderer};
//! use modgraph_io::{AudioBackend, BackendStreamConfig, CpalBackend, GraphBridge};
//!
//! let config = BackendStreamConfig::default();
//! let (control, endpoint) = GraphBridge::new(Renderer::new(f64::from(config.sample_rate))).split();
//!
//! let backend = CpalBackend::new();
//! let _stream = backend.build_output_stream(
//!     &config,
//!     endpoint.into_output_callback(usize::from(config.channels)),
//!     Box::new(|err: &str| eprintln!("Audio error: {err}")),
//! )?;
//!
//! control.send(patch.to_command());
//! ```

pub mod backend;
mod bridge;
pub mod cpal_backend;
mod device;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use bridge::{ControlHandle, GraphBridge, NOTIFICATION_CAPACITY, RenderEndpoint};
pub use cpal_backend::CpalBackend;
pub use device::{AudioDevice, default_output_device, find_output_device, list_devices};
pub use wav::{
    RENDER_BLOCK_FRAMES, WavInfo, WavSpec, read_wav, read_wav_info, render_to_wav,
    render_to_wav_with_progress,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

//! cpal-based audio backend.
//!
//! Wraps [cpal](https://crates.io/crates/cpal) for ALSA (Linux), CoreAudio
//! (macOS) and WASAPI (Windows) output.
//!
//! ```rust,ignore
//! use modgraph_io::{AudioBackend, BackendStreamConfig, CpalBackend};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &BackendStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32]| buffer.fill(0.0)),
//!     Box::new(|err: &str| eprintln!("Audio error: {}", err)),
//! )?;
//! // Plays until `stream` is dropped.
//! ```

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
use crate::device::{find_cpal_output_device, list_output_devices};
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal-based audio backend holding the platform's default host.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Creates a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Resolves the configured device, or the host default.
    fn output_device(&self, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => find_cpal_output_device(&self.host, search),
            None => self.host.default_output_device().ok_or(Error::NoDevice),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        list_output_devices(&self.host)
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(list_output_devices(&self.host)?
            .into_iter()
            .find(|device| device.is_default))
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        if config.channels == 0 {
            return Err(Error::UnsupportedFormat("zero output channels".to_string()));
        }
        let device = self.output_device(config.device_name.as_deref())?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}

//! Offline rendering to WAV files.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use modgraph_core::Renderer;
use std::path::Path;

/// Frames rendered per block when writing a file.
pub const RENDER_BLOCK_FRAMES: usize = 1024;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample. 32 writes IEEE float, 16 and 24 write PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// WAV file metadata read from the header.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    /// Channel count, sample rate and bit depth.
    pub spec: WavSpec,
    /// Whether samples are IEEE float.
    pub is_float: bool,
    /// Total sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));
    Ok(WavInfo {
        spec: spec.into(),
        is_float: spec.sample_format == SampleFormat::Float,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
    })
}

/// Read a WAV file as interleaved f32 samples.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();

    let samples = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (hound_spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok((samples, hound_spec.into()))
}

/// Render `frames` sample frames from `renderer` into a WAV file.
///
/// The renderer writes the same signal to every channel. Its clock keeps
/// running, so a second call continues where the first stopped.
pub fn render_to_wav<P: AsRef<Path>>(
    renderer: &mut Renderer,
    frames: u64,
    spec: WavSpec,
    path: P,
) -> Result<()> {
    render_to_wav_with_progress(renderer, frames, spec, path, |_| {})
}

/// Like [`render_to_wav`], calling `progress` with the running frame count
/// after every block.
pub fn render_to_wav_with_progress<P, F>(
    renderer: &mut Renderer,
    frames: u64,
    spec: WavSpec,
    path: P,
    mut progress: F,
) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(u64),
{
    if spec.channels == 0 {
        return Err(Error::UnsupportedFormat("zero channels".to_string()));
    }
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit samples",
            spec.bits_per_sample
        )));
    }

    let channels = usize::from(spec.channels);
    let mut writer = WavWriter::create(path, spec.into())?;
    let mut block = vec![0.0f32; RENDER_BLOCK_FRAMES * channels];
    let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;

    let mut written = 0u64;
    while written < frames {
        let block_frames = (frames - written).min(RENDER_BLOCK_FRAMES as u64) as usize;
        let buffer = &mut block[..block_frames * channels];
        renderer.process(buffer, channels);

        if spec.bits_per_sample == 32 {
            for &sample in buffer.iter() {
                writer.write_sample(sample)?;
            }
        } else {
            for &sample in buffer.iter() {
                let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }

        written += block_frames as u64;
        progress(written);
    }

    writer.finalize()?;
    tracing::debug!(frames, channels, "wav render finished");
    Ok(())
}

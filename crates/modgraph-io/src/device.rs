//! Output device enumeration via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Sample rate reported when a device will not say.
const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default channel count.
    pub channels: u16,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

impl AudioDevice {
    fn from_device(device: &Device, name: String, is_default: bool) -> Self {
        let (channels, default_sample_rate) = device
            .default_output_config()
            .map(|c| (c.channels(), c.sample_rate()))
            .unwrap_or((2, FALLBACK_SAMPLE_RATE));
        Self {
            name,
            is_default,
            channels,
            default_sample_rate,
        }
    }
}

/// Lists the default host's output devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    list_output_devices(&cpal::default_host())
}

/// The default host's default output device, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|device| {
        device_name(&device)
            .ok()
            .map(|name| AudioDevice::from_device(&device, name, true))
    }))
}

/// Finds an output device by index, exact name, or case-insensitive
/// substring.
pub fn find_output_device(name_or_index: &str) -> Result<AudioDevice> {
    let host = cpal::default_host();
    let device = find_cpal_output_device(&host, name_or_index)?;
    let name = device_name(&device).map_err(|e| Error::Stream(e.to_string()))?;
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());
    let is_default = default_name.as_deref() == Some(name.as_str());
    Ok(AudioDevice::from_device(&device, name, is_default))
}

pub(crate) fn list_output_devices(host: &Host) -> Result<Vec<AudioDevice>> {
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());
    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    let mut devices: Vec<AudioDevice> = Vec::new();
    for device in outputs {
        let Ok(name) = device_name(&device) else {
            continue;
        };
        if devices.iter().any(|d| d.name == name) {
            continue;
        }
        let is_default = default_name.as_deref() == Some(name.as_str());
        devices.push(AudioDevice::from_device(&device, name, is_default));
    }
    Ok(devices)
}

pub(crate) fn find_cpal_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();
    let names: Vec<Option<String>> = devices.iter().map(|d| device_name(d).ok()).collect();
    let index = match_device(&names, name_or_index)?;
    Ok(devices[index].clone())
}

/// Picks a device from `names` by index, exact name, then substring.
fn match_device(names: &[Option<String>], name_or_index: &str) -> Result<usize> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        return if index < names.len() {
            Ok(index)
        } else {
            Err(Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                names.len()
            )))
        };
    }

    if let Some(index) = names
        .iter()
        .position(|n| n.as_deref() == Some(name_or_index))
    {
        return Ok(index);
    }

    let search_lower = name_or_index.to_lowercase();
    let matches: Vec<(usize, &str)> = names
        .iter()
        .enumerate()
        .filter_map(|(i, n)| n.as_deref().map(|n| (i, n)))
        .filter(|(_, n)| n.to_lowercase().contains(&search_lower))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            name_or_index
        ))),
        [(index, _)] => Ok(*index),
        [(index, first), ..] => {
            let candidates: Vec<&str> = matches.iter().map(|(_, n)| *n).collect();
            tracing::warn!(
                search = name_or_index,
                ?candidates,
                "multiple output devices match, using {first}"
            );
            Ok(*index)
        }
    }
}

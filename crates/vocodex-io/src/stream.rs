//! Device enumeration via cpal.

use crate::Result;
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Rate reported when a device will not say.
const FALLBACK_RATE: u32 = 48000;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

impl AudioDevice {
    /// Describe `device` as seen from one direction. The other direction's
    /// flag is probed.
    fn describe(device: &Device, as_input: bool) -> Option<Self> {
        let name = device_name(device).ok()?;
        let input_config = device.default_input_config();
        let output_config = device.default_output_config();
        let primary = if as_input { &input_config } else { &output_config };
        let default_sample_rate = primary
            .as_ref()
            .map(|c| c.sample_rate())
            .unwrap_or(FALLBACK_RATE);
        Some(Self {
            name,
            is_input: as_input || input_config.is_ok(),
            is_output: !as_input || output_config.is_ok(),
            default_sample_rate,
        })
    }
}

/// Every device on `host`. Duplex devices appear once with both flags set.
pub(crate) fn host_devices(host: &Host) -> Vec<AudioDevice> {
    let mut devices: Vec<AudioDevice> = Vec::new();
    let inputs = host.input_devices().into_iter().flatten().map(|d| (d, true));
    let outputs = host.output_devices().into_iter().flatten().map(|d| (d, false));

    for (device, as_input) in inputs.chain(outputs) {
        let Some(info) = AudioDevice::describe(&device, as_input) else {
            continue;
        };
        if !devices.iter().any(|d| d.name == info.name) {
            devices.push(info);
        }
    }

    tracing::debug!(host = host.id().name(), count = devices.len(), "enumerated audio devices");
    devices
}

/// Default `(input, output)` devices on `host`, either of which may be absent.
pub(crate) fn host_defaults(host: &Host) -> (Option<AudioDevice>, Option<AudioDevice>) {
    let input = host
        .default_input_device()
        .and_then(|d| AudioDevice::describe(&d, true));
    let output = host
        .default_output_device()
        .and_then(|d| AudioDevice::describe(&d, false));
    (input, output)
}

/// List all available audio devices on the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    Ok(host_devices(&cpal::default_host()))
}

/// Default `(input, output)` devices, either of which may be absent.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    Ok(host_defaults(&cpal::default_host()))
}

//! cpal-based audio backend.
//!
//! [`CpalBackend`] is the backend the CLI and any desktop host use. Device
//! lookup by name is a case-insensitive substring match, so
//! `--input-device usb` picks the first device whose name contains "USB".

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle,
};
use crate::stream::{device_name, host_defaults, host_devices};
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal-based audio backend on the platform's default host.
pub struct CpalBackend {
    host: Host,
}

/// Which side of the device a lookup is for.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Input,
    Output,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    /// Find a device by name, or return the default one.
    fn find_device(&self, direction: Direction, name: Option<&str>) -> Result<cpal::Device> {
        let Some(search) = name else {
            let device = match direction {
                Direction::Input => self.host.default_input_device(),
                Direction::Output => self.host.default_output_device(),
            };
            return device.ok_or(Error::NoDevice);
        };

        let search_lower = search.to_lowercase();
        let devices: Vec<cpal::Device> = match direction {
            Direction::Input => self
                .host
                .input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect(),
            Direction::Output => self
                .host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect(),
        };

        devices
            .into_iter()
            .find(|device| {
                device_name(device)
                    .map(|n| n.to_lowercase().contains(&search_lower))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                Error::DeviceNotFound(format!(
                    "no {} device matching '{}'",
                    direction.label(),
                    search
                ))
            })
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a cpal build failure onto the crate error, separating the cases the
/// engine reports distinctly to the user.
fn build_error(err: &cpal::BuildStreamError) -> Error {
    let message = err.to_string();
    if matches!(err, cpal::BuildStreamError::DeviceNotAvailable) {
        Error::NoDevice
    } else if message.to_lowercase().contains("permission") {
        Error::PermissionDenied(message)
    } else {
        Error::Stream(message)
    }
}

fn stream_config(config: &BackendStreamConfig) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: config.channels,
        sample_rate: config.sample_rate,
        buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(host_devices(&self.host))
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        Ok(host_defaults(&self.host).1)
    }

    fn default_input_device(&self) -> Result<Option<AudioDevice>> {
        Ok(host_defaults(&self.host).0)
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(Direction::Output, config.device_name.as_deref())?;

        let stream = device
            .build_output_stream(
                &stream_config(config),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| build_error(&e))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: InputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(Direction::Input, config.device_name.as_deref())?;

        let stream = device
            .build_input_stream(
                &stream_config(config),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| build_error(&e))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            "input stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}

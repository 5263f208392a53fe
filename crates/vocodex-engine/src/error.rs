//! Engine error types.

/// Why the microphone could not be opened.
///
/// The engine keeps its previous state on every variant; the caller may
/// simply retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The platform refused microphone access.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// There is no capture device, or the configured one is missing.
    #[error("no capture device available")]
    NoDevice,

    /// The device exists but the stream could not be built.
    #[error("capture failed: {0}")]
    Failed(String),

    /// `start_capture` was called before `create()`.
    #[error("engine not created")]
    NotReady,
}

impl From<vocodex_io::Error> for CaptureError {
    fn from(err: vocodex_io::Error) -> Self {
        match err {
            vocodex_io::Error::PermissionDenied(_) => CaptureError::PermissionDenied,
            vocodex_io::Error::NoDevice | vocodex_io::Error::DeviceNotFound(_) => {
                CaptureError::NoDevice
            }
            other => CaptureError::Failed(other.to_string()),
        }
    }
}

/// Why an offline render was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// `create()` has not been called.
    #[error("engine not created")]
    NotCreated,

    /// The device callback owns the processor while the engine runs.
    #[error("engine is running on a device")]
    Running,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        assert_eq!(
            CaptureError::from(vocodex_io::Error::PermissionDenied("no".into())),
            CaptureError::PermissionDenied
        );
        assert_eq!(
            CaptureError::from(vocodex_io::Error::DeviceNotFound("usb".into())),
            CaptureError::NoDevice
        );
        assert!(matches!(
            CaptureError::from(vocodex_io::Error::Stream("busy".into())),
            CaptureError::Failed(msg) if msg.contains("busy")
        ));
    }
}

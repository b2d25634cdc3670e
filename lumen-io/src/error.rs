//! Transport error types.

use lumen_core::LumenError;
use thiserror::Error;

/// Errors raised while talking to devices.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The MIDI backend could not be initialised.
    #[error("MIDI backend unavailable: {0}")]
    Init(String),

    /// No port matched the requested name.
    #[error("No MIDI port matching '{0}'")]
    PortNotFound(String),

    /// Opening a port failed.
    #[error("Failed to connect to MIDI port: {0}")]
    Connect(String),

    /// Writing to an open port failed.
    #[error("MIDI send failed: {0}")]
    Send(String),

    /// The MQTT worker could not be started.
    #[error("MQTT bridge error: {0}")]
    Mqtt(String),
}

impl From<DeviceError> for LumenError {
    fn from(err: DeviceError) -> Self {
        LumenError::Device(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, DeviceError>;

//! # lumen-io: Device Transports for Lumen
//!
//! Everything that touches a real device lives here:
//!   - **MIDI**: Launchpad port discovery, input decoding, LED output
//!   - **MQTT**: broker bridge for the ESP32 button board
//!   - **Dispatch**: the bounded queue that carries device events from
//!     backend threads to the frame loop
//!
//! ```text
//!   midir callback ──┐
//!                    ├──► Dispatcher<T> ──► drain() once per frame ──► lumen-core
//!   rumqttc worker ──┘
//! ```

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dispatch;
pub mod error;
pub mod midi;
pub mod mqtt;

pub use dispatch::{DispatchStats, Dispatcher};
pub use error::DeviceError;
pub use midi::{Launchpad, LaunchpadOutput, LaunchpadPorts, PortListing, PortWatcher};
pub use mqtt::MqttBridge;

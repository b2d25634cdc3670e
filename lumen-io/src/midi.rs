//! Launchpad over MIDI.
//!
//! Port discovery matches a name fragment against the MIDI backend's port
//! names. Incoming messages are decoded on the backend's thread and pushed
//! to a [`Dispatcher`]; outgoing LED commands go straight to the output
//! port from the frame loop.

use lumen_core::led::{self, LedCommand, LedSurface};
use lumen_core::PadEvent;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection, MidiOutputPort};
use midly::live::LiveEvent;
use midly::MidiMessage;
use tracing::{debug, info, trace, warn};

use crate::dispatch::Dispatcher;
use crate::error::{DeviceError, Result};

const CLIENT_NAME: &str = "lumen";

/// Decode one raw MIDI message into a pad event.
///
/// Note-on with velocity 0 is a release. Anything that is not a note or a
/// controller change yields `None`.
#[must_use]
pub fn decode(message: &[u8]) -> Option<PadEvent> {
    let LiveEvent::Midi { message, .. } = LiveEvent::parse(message).ok()? else {
        return None;
    };
    match message {
        MidiMessage::NoteOn { key, vel } => Some(PadEvent::from_note_on(key.as_int(), vel.as_int())),
        MidiMessage::NoteOff { key, .. } => Some(PadEvent::Released { note: key.as_int() }),
        MidiMessage::Controller { controller, value } => Some(PadEvent::Control {
            cc: controller.as_int(),
            value: value.as_int(),
        }),
        _ => None,
    }
}

/// Decode `message` and queue it; unsupported messages are logged and dropped.
///
/// Returns whether an event was queued.
pub fn forward(message: &[u8], events: &Dispatcher<PadEvent>) -> bool {
    trace!(?message, "midi in");
    match decode(message) {
        Some(event) => {
            events.push(event);
            true
        }
        None => {
            debug!(?message, "unsupported midi message ignored");
            false
        }
    }
}

/// Names of every MIDI port currently visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortListing {
    /// Input port names.
    pub inputs: Vec<String>,
    /// Output port names.
    pub outputs: Vec<String>,
}

impl PortListing {
    /// Ask the backend for its ports.
    ///
    /// # Errors
    /// Returns [`DeviceError::Init`] if the backend is unavailable.
    pub fn scan() -> Result<Self> {
        let input = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        let output = MidiOutput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        Ok(Self {
            inputs: input.ports().iter().filter_map(|p| input.port_name(p).ok()).collect(),
            outputs: output.ports().iter().filter_map(|p| output.port_name(p).ok()).collect(),
        })
    }
}

/// A matched but not yet opened input/output port pair.
pub struct LaunchpadPorts {
    input: MidiInput,
    input_port: MidiInputPort,
    output: MidiOutput,
    output_port: MidiOutputPort,
    name: String,
}

impl LaunchpadPorts {
    /// Find the first input and output whose names contain `name_contains`.
    ///
    /// # Errors
    /// [`DeviceError::Init`] when the backend is unavailable,
    /// [`DeviceError::PortNotFound`] when either direction has no match.
    pub fn scan(name_contains: &str) -> Result<Self> {
        let mut input = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        input.ignore(Ignore::None);
        let output = MidiOutput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;

        let input_port = input
            .ports()
            .into_iter()
            .find(|p| input.port_name(p).is_ok_and(|n| n.contains(name_contains)))
            .ok_or_else(|| DeviceError::PortNotFound(name_contains.to_string()))?;
        let output_port = output
            .ports()
            .into_iter()
            .find(|p| output.port_name(p).is_ok_and(|n| n.contains(name_contains)))
            .ok_or_else(|| DeviceError::PortNotFound(name_contains.to_string()))?;

        let name = input
            .port_name(&input_port)
            .unwrap_or_else(|_| name_contains.to_string());
        debug!(%name, "launchpad ports found");
        Ok(Self {
            input,
            input_port,
            output,
            output_port,
            name,
        })
    }

    /// Name of the matched input port.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open both ports; decoded input goes to `events`.
    ///
    /// # Errors
    /// Returns [`DeviceError::Connect`] if either port cannot be opened.
    pub fn connect(self, events: Dispatcher<PadEvent>) -> Result<Launchpad> {
        let output = self
            .output
            .connect(&self.output_port, "lumen-out")
            .map_err(|e| DeviceError::Connect(e.to_string()))?;

        let input = self
            .input
            .connect(
                &self.input_port,
                "lumen-in",
                move |_stamp, message, _data| {
                    forward(message, &events);
                },
                (),
            )
            .map_err(|e| DeviceError::Connect(e.to_string()))?;

        info!(name = %self.name, "launchpad connected");
        Ok(Launchpad {
            input,
            output: LaunchpadOutput { connection: output },
            name: self.name,
        })
    }
}

impl std::fmt::Debug for LaunchpadPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchpadPorts")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Output side of an open Launchpad.
pub struct LaunchpadOutput {
    connection: MidiOutputConnection,
}

impl LedSurface for LaunchpadOutput {
    fn send(&mut self, command: LedCommand) -> lumen_core::Result<()> {
        self.connection
            .send(&command.to_midi())
            .map_err(|e| DeviceError::Send(e.to_string()).into())
    }
}

/// An open Launchpad: input callback running, output ready.
pub struct Launchpad {
    input: MidiInputConnection<()>,
    output: LaunchpadOutput,
    name: String,
}

impl Launchpad {
    /// Port name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// LED surface of this device.
    pub fn output(&mut self) -> &mut LaunchpadOutput {
        &mut self.output
    }

    /// Turn every LED off and close both ports.
    pub fn close(mut self) {
        led::reset_all(&mut self.output);
        let _ = self.input.close();
        let _ = self.output.connection.close();
        info!(name = %self.name, "launchpad closed");
    }
}

impl std::fmt::Debug for Launchpad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launchpad")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Detects devices being plugged in or out by watching port counts.
pub struct PortWatcher {
    input: MidiInput,
    output: MidiOutput,
    last: (usize, usize),
}

impl PortWatcher {
    /// Start watching from the current counts.
    ///
    /// # Errors
    /// Returns [`DeviceError::Init`] if the backend is unavailable.
    pub fn new() -> Result<Self> {
        let input = MidiInput::new("lumen-watch").map_err(|e| DeviceError::Init(e.to_string()))?;
        let output = MidiOutput::new("lumen-watch").map_err(|e| DeviceError::Init(e.to_string()))?;
        let last = (input.port_count(), output.port_count());
        Ok(Self { input, output, last })
    }

    /// Whether the port counts changed since the last call.
    pub fn changed(&mut self) -> bool {
        let now = (self.input.port_count(), self.output.port_count());
        if now == self.last {
            return false;
        }
        warn!(before = ?self.last, after = ?now, "midi ports changed");
        self.last = now;
        true
    }
}

impl std::fmt::Debug for PortWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortWatcher")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_on() {
        assert_eq!(
            decode(&[0x90, 11, 127]),
            Some(PadEvent::Pressed { note: 11, velocity: 127 })
        );
    }

    #[test]
    fn zero_velocity_is_release() {
        assert_eq!(decode(&[0x90, 44, 0]), Some(PadEvent::Released { note: 44 }));
        assert_eq!(decode(&[0x80, 44, 64]), Some(PadEvent::Released { note: 44 }));
    }

    #[test]
    fn decodes_controller() {
        assert_eq!(
            decode(&[0xB0, 104, 127]),
            Some(PadEvent::Control { cc: 104, value: 127 })
        );
    }

    #[test]
    fn other_channels_still_decode() {
        assert_eq!(
            decode(&[0x92, 11, 5]),
            Some(PadEvent::Pressed { note: 11, velocity: 5 })
        );
    }

    #[test]
    fn ignores_garbage_and_other_messages() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[0xE0, 0, 64]), None);
        assert_eq!(decode(&[0xF8]), None);
    }

    #[test]
    fn forward_queues_pads_and_drops_the_rest() {
        let events = Dispatcher::new(8);
        assert!(forward(&[0x90, 11, 127], &events));
        assert!(!forward(&[0xE0, 0, 64], &events));
        assert!(!forward(&[0x90], &events));
        assert_eq!(events.drain(), vec![PadEvent::Pressed { note: 11, velocity: 127 }]);
    }
}

//! ESP32 button board over MQTT.
//!
//! The board publishes `"1"` or `"2"` on its topic when one of its two
//! buttons is pressed. The transport thread turns broker traffic into
//! [`MqttEvent`]s; [`ButtonBoard`] consumes them on the frame loop.

use tracing::{debug, error, info, warn};

use crate::config::MqttConfig;

/// Broker traffic handed from the network thread to the frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttEvent {
    /// A publish on the subscribed topic.
    Message {
        /// Topic name.
        topic: String,
        /// UTF-8 payload, lossily decoded.
        payload: String,
    },
    /// Broker accepted the connection.
    Connected,
    /// Connection lost.
    ConnectionClosed(String),
    /// Transport error.
    Error(String),
}

/// A physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Payload `"1"`.
    Button1,
    /// Payload `"2"`.
    Button2,
}

/// Decode a payload. Anything but `"1"` and `"2"` is not a button.
#[must_use]
pub fn parse_button(payload: &str) -> Option<Button> {
    match payload {
        "1" => Some(Button::Button1),
        "2" => Some(Button::Button2),
        other => {
            debug!(payload = other, "mqtt payload is not a button");
            None
        }
    }
}

/// Main-thread view of the board.
#[derive(Debug, Clone)]
pub struct ButtonBoard {
    verbose: bool,
    status_every: u64,
    connected: bool,
    last_message: String,
    button1: bool,
    button2: bool,
}

impl ButtonBoard {
    /// A disconnected board.
    #[must_use]
    pub fn new(config: &MqttConfig) -> Self {
        Self {
            verbose: config.verbose_logging,
            status_every: config.status_log_interval_frames,
            connected: false,
            last_message: String::new(),
            button1: false,
            button2: false,
        }
    }

    /// Apply drained events; returns the buttons pressed, in order.
    pub fn process(&mut self, events: impl IntoIterator<Item = MqttEvent>) -> Vec<Button> {
        let mut pressed = Vec::new();
        for event in events {
            match event {
                MqttEvent::Message { topic, payload } => {
                    if self.verbose {
                        info!(%topic, %payload, "mqtt message received");
                    }
                    let button = parse_button(&payload);
                    self.last_message = payload;
                    match button {
                        Some(Button::Button1) => self.button1 = true,
                        Some(Button::Button2) => self.button2 = true,
                        None => {}
                    }
                    if let Some(button) = button {
                        info!(?button, "button pressed");
                        pressed.push(button);
                    }
                }
                MqttEvent::Connected => {
                    self.connected = true;
                    info!("connected to mqtt broker");
                }
                MqttEvent::ConnectionClosed(reason) => {
                    self.connected = false;
                    warn!(%reason, "mqtt connection lost");
                }
                MqttEvent::Error(message) => {
                    error!(%message, "mqtt error");
                }
            }
        }
        pressed
    }

    /// Log connection status every configured number of frames.
    pub fn status_tick(&self, frame: u64) {
        if self.verbose && self.status_every > 0 && frame % self.status_every == 0 {
            info!(connected = self.connected, "mqtt connection status");
        }
    }

    /// Whether button 1 was pressed since the last call.
    pub fn take_button1(&mut self) -> bool {
        std::mem::take(&mut self.button1)
    }

    /// Whether button 2 was pressed since the last call.
    pub fn take_button2(&mut self) -> bool {
        std::mem::take(&mut self.button2)
    }

    /// Payload of the last message.
    #[must_use]
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Whether the broker connection is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

//! MQTT broker bridge.
//!
//! Runs the `rumqttc` event loop on its own thread inside a current-thread
//! Tokio runtime. Every broker event is turned into an [`MqttEvent`] and
//! pushed to a [`Dispatcher`]; nothing is published. Reconnects happen at a
//! fixed interval.

use std::thread::JoinHandle;
use std::time::Duration;

use lumen_core::config::MqttConfig;
use lumen_core::esp32::MqttEvent;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::error::{DeviceError, Result};

const REQUEST_CAPACITY: usize = 10;
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Client id made unique per run: `<prefix>_<uuid>`, or just the uuid.
#[must_use]
pub fn unique_client_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    if prefix.is_empty() {
        suffix
    } else {
        format!("{prefix}_{suffix}")
    }
}

/// Connection options for `settings` under `client_id`.
#[must_use]
pub fn mqtt_options(settings: &MqttConfig, client_id: &str) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, settings.broker_address.clone(), settings.broker_port);
    options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs.max(5)));
    if let Some(username) = &settings.username {
        let password = settings.password.clone().unwrap_or_default();
        options.set_credentials(username.clone(), password);
    }
    options
}

/// Handle to the background MQTT worker.
#[derive(Debug)]
pub struct MqttBridge {
    client_id: String,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl MqttBridge {
    /// Start the worker; events are pushed to `events`.
    ///
    /// # Errors
    /// Returns [`DeviceError::Mqtt`] if the worker thread cannot be spawned.
    pub fn spawn(settings: &MqttConfig, events: Dispatcher<MqttEvent>) -> Result<Self> {
        let client_id = unique_client_id(&settings.client_id);
        let options = mqtt_options(settings, &client_id);
        let topic = settings.topic.clone();
        let reconnect = settings.reconnect_interval();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(
            broker = %settings.broker_address,
            port = settings.broker_port,
            %client_id,
            %topic,
            "starting mqtt bridge"
        );

        let worker = std::thread::Builder::new()
            .name("lumen-mqtt".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!(error = %e, "failed to build mqtt runtime");
                        events.push(MqttEvent::Error(e.to_string()));
                        return;
                    }
                };
                runtime.block_on(run(options, topic, reconnect, events, shutdown_rx));
            })
            .map_err(|e| DeviceError::Mqtt(e.to_string()))?;

        Ok(Self {
            client_id,
            shutdown: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    /// The client id sent to the broker.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Disconnect from the broker and wait for the worker to exit.
    pub fn disconnect(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The worker may already be gone.
            let _ = shutdown.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("mqtt worker panicked");
            }
            info!("mqtt bridge stopped");
        }
    }
}

impl Drop for MqttBridge {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run(
    options: MqttOptions,
    topic: String,
    reconnect: Duration,
    events: Dispatcher<MqttEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                close(&client, &mut eventloop).await;
                return;
            }
            polled = eventloop.poll() => match polled {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!(code = ?ack.code, "mqtt connected");
                    events.push(MqttEvent::Connected);
                    if let Err(e) = client.subscribe(topic.clone(), QoS::AtLeastOnce).await {
                        events.push(MqttEvent::Error(format!("subscribe failed: {e}")));
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    info!(%topic, "mqtt subscribed");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                    debug!(topic = %publish.topic, %payload, "mqtt publish");
                    events.push(MqttEvent::Message {
                        topic: publish.topic.clone(),
                        payload,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, retry_in = ?reconnect, "mqtt connection lost");
                    events.push(MqttEvent::ConnectionClosed(e.to_string()));
                    tokio::select! {
                        _ = &mut shutdown => {
                            return;
                        }
                        () = tokio::time::sleep(reconnect) => {}
                    }
                }
            }
        }
    }
}

async fn close(client: &AsyncClient, eventloop: &mut EventLoop) {
    if let Err(e) = client.disconnect().await {
        debug!(error = %e, "mqtt disconnect request failed");
        return;
    }
    // Let the loop flush the disconnect packet.
    let flush = async { while eventloop.poll().await.is_ok() {} };
    if tokio::time::timeout(DISCONNECT_GRACE, flush).await.is_err() {
        debug!("mqtt disconnect not acknowledged in time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_prefixed_and_unique() {
        let a = unique_client_id("UnityClient");
        let b = unique_client_id("UnityClient");
        assert!(a.starts_with("UnityClient_"));
        assert_ne!(a, b);
        assert_eq!(a.len(), "UnityClient_".len() + 32);
    }

    #[test]
    fn empty_prefix_is_bare_uuid() {
        let id = unique_client_id("");
        assert_eq!(id.len(), 32);
        assert!(!id.contains('_'));
    }

    #[test]
    fn options_follow_settings() {
        let settings = MqttConfig {
            broker_address: "broker.local".into(),
            broker_port: 1884,
            keep_alive_secs: 30,
            ..MqttConfig::default()
        };
        let options = mqtt_options(&settings, "lumen_test");
        assert_eq!(options.client_id(), "lumen_test");
        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1884));
        assert_eq!(options.keep_alive(), Duration::from_secs(30));
    }
}

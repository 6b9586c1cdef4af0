//! Desktop MQTT client backed by `rumqttc`.
//!
//! The rumqttc event loop runs on a tokio task. It tracks the connection
//! state and forwards incoming publishes over a channel, so
//! [`RumqttClient`] can implement the poll-based [`MqttClient`] trait used by
//! [`FeedRunner`](super::FeedRunner).
//!
//! ```ignore
//! let runtime = tokio::runtime::Runtime::new()?;
//! let client = RumqttClient::spawn(&config.mqtt, runtime.handle());
//! let mut runner = FeedRunner::new(client, config.feed.clone());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// Capacity of the rumqttc request queue.
const REQUEST_CAPACITY: usize = 32;

// ============================================================================
// Options
// ============================================================================

/// Builds `rumqttc` options from the shared broker configuration.
pub fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(
        config.client_id.as_str(),
        config.host.as_str(),
        config.port,
    );
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs.max(1))));
    if config.has_auth() {
        options.set_credentials(config.username.as_str(), config.password.as_str());
    }
    options
}

// ============================================================================
// Client
// ============================================================================

/// [`MqttClient`] over a background `rumqttc` event loop.
pub struct RumqttClient {
    client: AsyncClient,
    incoming: mpsc::UnboundedReceiver<MqttMessage>,
    connected: Arc<AtomicBool>,
}

impl RumqttClient {
    /// Starts the event loop on `runtime` and returns the client half.
    ///
    /// The client connects in the background; watch
    /// [`is_connected`](MqttClient::is_connected).
    pub fn spawn(config: &MqttConfig, runtime: &Handle) -> Self {
        let (client, eventloop) = AsyncClient::new(mqtt_options(config), REQUEST_CAPACITY);
        let (tx, incoming) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        info!(
            "MQTT connecting to {}:{} as {}",
            config.host, config.port, config.client_id
        );
        runtime.spawn(drive(
            eventloop,
            tx,
            Arc::clone(&connected),
            Duration::from_millis(u64::from(config.reconnect_delay_ms)),
        ));

        Self {
            client,
            incoming,
            connected,
        }
    }
}

async fn drive(
    mut eventloop: EventLoop,
    tx: mpsc::UnboundedSender<MqttMessage>,
    connected: Arc<AtomicBool>,
    reconnect_delay: Duration,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT connected");
                connected.store(true, Ordering::Release);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!("MQTT <- {}", publish.topic);
                let msg = MqttMessage::new(publish.topic, publish.payload.to_vec());
                if tx.send(msg).is_err() {
                    // Receiver dropped with the client.
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                if connected.swap(false, Ordering::AcqRel) {
                    warn!("MQTT connection lost: {}", e);
                } else {
                    debug!("MQTT connect failed: {}", e);
                }
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

impl MqttClient for RumqttClient {
    type Error = MqttError;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), MqttError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload.to_vec())
            .map_err(|e| MqttError::Publish(e.to_string()))
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), MqttError> {
        self.client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| MqttError::Subscribe(e.to_string()))
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        self.incoming.try_recv().ok()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// MQTT-related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttError {
    /// Failed to queue a subscription
    Subscribe(String),
    /// Failed to queue a publish
    Publish(String),
}

impl fmt::Display for MqttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MqttError::Subscribe(e) => write!(f, "subscribe failed: {}", e),
            MqttError::Publish(e) => write!(f, "publish failed: {}", e),
        }
    }
}

impl std::error::Error for MqttError {}

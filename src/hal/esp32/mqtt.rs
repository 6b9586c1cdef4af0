//! MQTT client for the ESP32 controller, backed by esp-idf-svc.
//!
//! The ESP-IDF client runs its own task; a helper thread drains its
//! connection events into a channel and tracks the connection state, so the
//! main loop can poll it through [`MqttClient`].
//!
//! # Example
//!
//! ```ignore
//! use rs_braille::hal::esp32::Esp32Mqtt;
//! use rs_braille::config::MqttConfig;
//! use rs_braille::services::FeedRunner;
//!
//! let mqtt = Esp32Mqtt::connect(&MqttConfig::default().with_host("192.168.1.10"))?;
//! let mut runner = FeedRunner::new(mqtt, config.feed.clone());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use log::{debug, info, warn};

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// Poll-style wrapper around [`EspMqttClient`].
pub struct Esp32Mqtt {
    client: EspMqttClient<'static>,
    message_rx: Receiver<MqttMessage>,
    connected: Arc<AtomicBool>,
}

impl Esp32Mqtt {
    /// Starts the client; the broker connection completes in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the ESP-IDF client cannot be created.
    pub fn connect(config: &MqttConfig) -> anyhow::Result<Self> {
        let broker_url = format!("mqtt://{}:{}", config.host, config.port);

        let mqtt_config = MqttClientConfiguration {
            client_id: Some(config.client_id.as_str()),
            keep_alive_interval: Some(Duration::from_secs(u64::from(config.keep_alive_secs))),
            reconnect_timeout: Some(Duration::from_millis(u64::from(config.reconnect_delay_ms))),
            username: config.has_auth().then(|| config.username.as_str()),
            password: config.has_auth().then(|| config.password.as_str()),
            ..Default::default()
        };

        let (client, mut connection) = EspMqttClient::new(&broker_url, &mqtt_config)?;

        let (message_tx, message_rx) = channel();
        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);
        thread::Builder::new()
            .name("mqtt-events".into())
            .stack_size(6 * 1024)
            .spawn(move || pump_events(&mut connection, message_tx, flag))?;

        info!("MQTT client started for {}", broker_url);
        Ok(Self {
            client,
            message_rx,
            connected,
        })
    }
}

fn pump_events(
    connection: &mut EspMqttConnection,
    message_tx: Sender<MqttMessage>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match connection.next() {
            Err(e) => {
                warn!("MQTT connection ended: {:?}", e);
                connected.store(false, Ordering::Release);
                return;
            }
            Ok(event) => match event.payload() {
                EventPayload::Connected(_) => {
                    info!("MQTT connected");
                    connected.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    warn!("MQTT disconnected");
                    connected.store(false, Ordering::Release);
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => {
                    debug!("MQTT <- {}", topic);
                    if message_tx.send(MqttMessage::new(topic, data)).is_err() {
                        return;
                    }
                }
                _ => {}
            },
        }
    }
}

// ============================================================================
// MqttClient Trait Implementation
// ============================================================================

/// Error type for ESP32 MQTT operations.
#[derive(Debug)]
pub struct Esp32MqttError(pub String);

impl core::fmt::Display for Esp32MqttError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MQTT error: {}", self.0)
    }
}

impl std::error::Error for Esp32MqttError {}

impl MqttClient for Esp32Mqtt {
    type Error = Esp32MqttError;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        self.client
            .enqueue(topic, QoS::AtLeastOnce, retain, payload)
            .map_err(|e| Esp32MqttError(format!("{:?}", e)))?;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| Esp32MqttError(format!("{:?}", e)))?;
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        match self.message_rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.connected.store(false, Ordering::Release);
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

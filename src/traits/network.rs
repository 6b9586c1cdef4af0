//! Network abstraction for the MQTT feed.
//!
//! The controller talks to the broker through [`MqttClient`]: a sync,
//! poll-based interface that fits both the ESP-IDF client (callback thread
//! feeding a channel) and rumqttc on desktop.
//!
//! ```text
//! deviceList            <- empty request
//! deviceList/response   -> "kitchen-light1;light2,bath"
//! <room>/<device>_status -> "ON" / "OFF",  <- "check"
//! deviceControl         <- "kitchen,light1,toggle"
//! ```

use alloc::string::String;
use alloc::vec::Vec;

// ============================================================================
// MQTT Client Trait
// ============================================================================

/// Broker connection as seen by the feed runner.
///
/// Implementations must honour these rules:
///
/// - `publish` and `subscribe` may block briefly or enqueue
/// - `try_recv` must never block
/// - The client handles reconnection internally; callers watch
///   [`is_connected`](Self::is_connected) to redo subscriptions
///
/// # Example
///
/// ```rust
/// use rs_braille::hal::MockMqtt;
/// use rs_braille::traits::MqttClient;
///
/// let mut client = MockMqtt::new();
/// client.publish("deviceList", b"", false).unwrap();
/// assert_eq!(client.published[0].0, "deviceList");
/// ```
pub trait MqttClient {
    /// Client failure (queue full, not connected, ...).
    type Error;

    /// Sends `payload` on `topic`. The feed never retains its messages.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Starts delivery of `topic` to [`try_recv`](Self::try_recv).
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Next queued inbound message, or `None` when the queue is empty.
    fn try_recv(&mut self) -> Option<MqttMessage>;

    /// Whether the broker session is up.
    fn is_connected(&self) -> bool;
}

/// Inbound message: a menu list or a device status report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MqttMessage {
    /// Topic it arrived on.
    pub topic: String,
    /// Raw payload.
    pub payload: Vec<u8>,
}

impl MqttMessage {
    /// Builds a message, mostly for tests and mocks.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text; feed payloads that are not UTF-8 are dropped.
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_str_valid_and_invalid() {
        let ok = MqttMessage::new("t", "ON");
        assert_eq!(ok.payload_str(), Some("ON"));

        let bad = MqttMessage::new("t", alloc::vec![0xff, 0xfe]);
        assert_eq!(bad.payload_str(), None);
    }
}

//! Feed runner connecting an MQTT client to the braille controller.
//!
//! This module provides [`FeedRunner`], which works with any client
//! implementing the [`MqttClient`] trait, so the ESP32 and desktop builds
//! share the same feed handling.
//!
//! Per poll it:
//! - on every fresh connection, subscribes the response topic and the status
//!   topic of every known device, then publishes the menu request
//! - routes inbound menu lists and status reports to the controller
//! - loads the fallback menu if no list arrived in time
//!
//! [`dispatch`](FeedRunner::dispatch) publishes the toggle commands and
//! status checks returned by [`BrailleController::tick`].
//!
//! # Example
//!
//! ```rust
//! use rs_braille::config::Config;
//! use rs_braille::hal::{MockMatrix, MockMqtt, MockPanel, MockTone};
//! use rs_braille::services::FeedRunner;
//! use rs_braille::BrailleController;
//!
//! let config = Config::default();
//! let mut controller =
//!     BrailleController::new(MockMatrix::new(), MockPanel::new(), MockTone::new(), &config);
//! let mut runner = FeedRunner::new(MockMqtt::new(), config.feed.clone());
//!
//! runner.poll(&mut controller, 0).unwrap();
//! assert!(runner.client().is_subscribed("deviceList/response"));
//! assert_eq!(runner.client().published_to("deviceList").len(), 1);
//!
//! runner.client_mut().queue_message("deviceList/response", "kitchen-light1");
//! runner.poll(&mut controller, 20).unwrap();
//! assert!(runner.client().is_subscribed("kitchen/light1_status"));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, info, warn};

use crate::config::FeedConfig;
use crate::controller::{BrailleController, ControllerError};
use crate::feed::{classify, control_payload, Inbound, STATUS_CHECK};
use crate::menu::Menu;
use crate::navigator::Effect;
use crate::traits::{DotMatrix, MqttClient, TextPanel, ToneOutput};

// ============================================================================
// Errors
// ============================================================================

/// Error from either side of the runner.
#[derive(Debug, PartialEq, Eq)]
pub enum FeedError<N, H> {
    /// The MQTT client failed.
    Network(N),
    /// The controller's hardware failed.
    Hardware(H),
}

impl<N: fmt::Debug, H: fmt::Display> fmt::Display for FeedError<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Network(e) => write!(f, "mqtt error: {:?}", e),
            FeedError::Hardware(e) => write!(f, "{}", e),
        }
    }
}

impl<N: fmt::Debug, H: fmt::Debug + fmt::Display> std::error::Error for FeedError<N, H> {}

// ============================================================================
// Feed Runner
// ============================================================================

/// Polls an [`MqttClient`] on behalf of a [`BrailleController`].
///
/// # Type Parameters
///
/// - `C`: The MQTT client implementation
pub struct FeedRunner<C: MqttClient> {
    client: C,
    config: FeedConfig,
    was_connected: bool,
    subscribed: BTreeSet<String>,
    started_at: Option<u64>,
}

impl<C: MqttClient> FeedRunner<C> {
    /// Creates a new feed runner.
    pub fn new(client: C, config: FeedConfig) -> Self {
        Self {
            client,
            config,
            was_connected: false,
            subscribed: BTreeSet::new(),
            started_at: None,
        }
    }

    /// Returns a reference to the underlying MQTT client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns a mutable reference to the underlying MQTT client.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Feed configuration in use.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Processes connection changes, inbound messages and the fallback timer.
    pub fn poll<D, P, T>(
        &mut self,
        controller: &mut BrailleController<D, P, T>,
        now_ms: u64,
    ) -> Result<(), FeedError<C::Error, ControllerError<D, P, T>>>
    where
        D: DotMatrix,
        P: TextPanel,
        T: ToneOutput,
    {
        let started_at = *self.started_at.get_or_insert(now_ms);

        let connected = self.client.is_connected();
        if connected && !self.was_connected {
            info!("feed connected, requesting menu");
            self.subscribed.clear();
            self.client
                .subscribe(self.config.response_topic.as_str())
                .map_err(FeedError::Network)?;
            self.subscribe_statuses(controller.navigator().menu())
                .map_err(FeedError::Network)?;
            self.request_menu().map_err(FeedError::Network)?;
        } else if !connected && self.was_connected {
            warn!("feed disconnected");
        }
        self.was_connected = connected;

        while let Some(msg) = self.client.try_recv() {
            let Some(payload) = msg.payload_str() else {
                warn!("non-UTF-8 payload on {}", msg.topic);
                continue;
            };
            match classify(&self.config, &msg.topic, payload) {
                Inbound::MenuList(list) => {
                    debug!("menu list: {}", list);
                    controller.load_feed(list).map_err(FeedError::Hardware)?;
                    if connected {
                        self.subscribe_statuses(controller.navigator().menu())
                            .map_err(FeedError::Network)?;
                    }
                }
                Inbound::Status { room, device, on } => {
                    controller
                        .apply_status(room, device, on)
                        .map_err(FeedError::Hardware)?;
                }
                Inbound::Ignored => {}
            }
        }

        let waited = now_ms.saturating_sub(started_at);
        if !controller.navigator().is_menu_ready()
            && self.config.has_fallback()
            && waited >= u64::from(self.config.fallback_after_ms)
        {
            info!("no menu after {} ms, using fallback", waited);
            controller
                .load_feed(self.config.fallback_feed.as_str())
                .map_err(FeedError::Hardware)?;
            if connected {
                self.subscribe_statuses(controller.navigator().menu())
                    .map_err(FeedError::Network)?;
            }
        }

        Ok(())
    }

    /// Publishes the network effects returned by the controller.
    ///
    /// Effects are dropped with a warning while disconnected.
    pub fn dispatch(&mut self, effects: &[Effect]) -> Result<(), C::Error> {
        for effect in effects {
            if !self.client.is_connected() {
                warn!("offline, dropping {:?}", effect);
                continue;
            }
            match effect {
                Effect::Toggle { room, device } => {
                    let payload = control_payload(room, device);
                    info!("publishing {}", payload);
                    self.client.publish(
                        self.config.control_topic.as_str(),
                        payload.as_bytes(),
                        false,
                    )?;
                }
                Effect::RequestStatus { room, device } => {
                    let Some(topic) = self.config.status_topic(room, device) else {
                        warn!("status topic for {}/{} too long, not checking", room, device);
                        continue;
                    };
                    self.client
                        .publish(topic.as_str(), STATUS_CHECK.as_bytes(), false)?;
                }
                Effect::Tone(_) => {}
            }
        }
        Ok(())
    }

    /// Publishes the empty menu request.
    pub fn request_menu(&mut self) -> Result<(), C::Error> {
        self.client
            .publish(self.config.request_topic.as_str(), b"", false)
    }

    fn subscribe_statuses(&mut self, menu: &Menu) -> Result<(), C::Error> {
        let mut topics = Vec::new();
        for room in menu.rooms() {
            for device in room.devices() {
                let Some(topic) = self.config.status_topic(room.label(), device) else {
                    warn!("status topic for {}/{} too long, skipping", room.label(), device);
                    continue;
                };
                if !self.subscribed.contains(topic.as_str()) {
                    topics.push(String::from(topic.as_str()));
                }
            }
        }

        for topic in topics {
            self.client.subscribe(&topic)?;
            debug!("subscribed {}", topic);
            self.subscribed.insert(topic);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::hal::{MockMatrix, MockMqtt, MockPanel, MockTone};
    use crate::input::InputEvents;

    type Mock = BrailleController<MockMatrix, MockPanel, MockTone>;

    fn setup() -> (Mock, FeedRunner<MockMqtt>) {
        let config = Config::default();
        let controller = BrailleController::new(
            MockMatrix::new(),
            MockPanel::new(),
            MockTone::new(),
            &config,
        );
        let runner = FeedRunner::new(MockMqtt::new(), config.feed);
        (controller, runner)
    }

    // ========================================================================
    // Connection tests
    // ========================================================================

    #[test]
    fn first_poll_subscribes_and_requests() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        assert_eq!(runner.client().subscriptions, ["deviceList/response"]);
        assert_eq!(runner.client().published_to("deviceList"), [b"".as_slice()]);
    }

    #[test]
    fn request_is_not_repeated_while_connected() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        runner.poll(&mut c, 20).unwrap();
        assert_eq!(runner.client().published_to("deviceList").len(), 1);
    }

    #[test]
    fn reconnect_resubscribes_everything() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        runner
            .client_mut()
            .queue_message("deviceList/response", "kitchen-light1");
        runner.poll(&mut c, 10).unwrap();

        runner.client_mut().connected = false;
        runner.poll(&mut c, 20).unwrap();
        runner.client_mut().subscriptions.clear();
        runner.client_mut().connected = true;
        runner.poll(&mut c, 30).unwrap();

        assert!(runner.client().is_subscribed("deviceList/response"));
        assert!(runner.client().is_subscribed("kitchen/light1_status"));
        assert_eq!(runner.client().published_to("deviceList").len(), 2);
    }

    #[test]
    fn offline_start_skips_requests() {
        let (mut c, mut runner) = setup();
        runner.client_mut().connected = false;
        runner.poll(&mut c, 0).unwrap();
        assert!(runner.client().published.is_empty());
        assert!(runner.client().subscriptions.is_empty());
    }

    // ========================================================================
    // Inbound tests
    // ========================================================================

    #[test]
    fn menu_list_loads_and_subscribes_each_device_once() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        runner
            .client_mut()
            .queue_message("deviceList/response", "kitchen-light1;light2,bath");
        runner.poll(&mut c, 10).unwrap();
        runner
            .client_mut()
            .queue_message("deviceList/response", "kitchen-light1;light2;oven,bath");
        runner.poll(&mut c, 20).unwrap();

        assert_eq!(c.navigator().menu().len(), 2);
        let subs = &runner.client().subscriptions;
        assert_eq!(
            subs.iter().filter(|t| *t == "kitchen/light1_status").count(),
            1
        );
        assert!(runner.client().is_subscribed("kitchen/oven_status"));
    }

    #[test]
    fn oversized_status_topics_are_skipped() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        let feed = format!("{}-{},bath-fan", "r".repeat(100), "d".repeat(30));
        runner.client_mut().queue_message("deviceList/response", feed);
        runner.poll(&mut c, 10).unwrap();

        assert_eq!(c.navigator().menu().len(), 2);
        assert!(runner.client().is_subscribed("bath/fan_status"));
        assert_eq!(runner.client().subscriptions.len(), 2);

        runner
            .dispatch(&[Effect::RequestStatus {
                room: "r".repeat(100),
                device: "d".repeat(30),
            }])
            .unwrap();
        assert_eq!(runner.client().published.len(), 1);
    }

    #[test]
    fn status_message_updates_cache() {
        let (mut c, mut runner) = setup();
        runner.client_mut().queue_message("bath/gyser_status", "ON");
        runner.poll(&mut c, 0).unwrap();
        assert!(c.navigator().states().get("bath/gyser"));

        runner.client_mut().queue_message("bath/gyser_status", "check");
        runner.poll(&mut c, 10).unwrap();
        assert!(c.navigator().states().get("bath/gyser"));
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        let (mut c, mut runner) = setup();
        runner
            .client_mut()
            .queue_message("deviceList/response", vec![0xffu8, 0x00]);
        runner.poll(&mut c, 0).unwrap();
        assert!(!c.navigator().is_menu_ready());
    }

    // ========================================================================
    // Fallback tests
    // ========================================================================

    #[test]
    fn fallback_after_timeout() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 1_000).unwrap();
        runner.poll(&mut c, 10_999).unwrap();
        assert!(!c.navigator().is_menu_ready());

        runner.poll(&mut c, 11_000).unwrap();
        assert!(c.navigator().is_menu_ready());
        assert_eq!(c.navigator().menu().len(), 3);
        assert!(runner.client().is_subscribed("bedroom/lights2_status"));
    }

    #[test]
    fn real_feed_replaces_fallback() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        runner.poll(&mut c, 10_000).unwrap();
        runner
            .client_mut()
            .queue_message("deviceList/response", "garage");
        runner.poll(&mut c, 12_000).unwrap();
        assert_eq!(c.navigator().menu().to_feed(), "garage");
    }

    #[test]
    fn disabled_fallback_keeps_waiting() {
        let config = Config::default();
        let mut c = BrailleController::new(
            MockMatrix::new(),
            MockPanel::new(),
            MockTone::new(),
            &config,
        );
        let mut runner =
            FeedRunner::new(MockMqtt::new(), config.feed.with_fallback_feed(""));
        runner.poll(&mut c, 0).unwrap();
        runner.poll(&mut c, 60_000).unwrap();
        assert!(!c.navigator().is_menu_ready());
    }

    // ========================================================================
    // Dispatch tests
    // ========================================================================

    #[test]
    fn dispatch_publishes_toggle_and_check() {
        let (_, mut runner) = setup();
        runner
            .dispatch(&[
                Effect::RequestStatus {
                    room: "kitchen".into(),
                    device: "doorlock".into(),
                },
                Effect::Toggle {
                    room: "kitchen".into(),
                    device: "doorlock".into(),
                },
            ])
            .unwrap();

        assert_eq!(
            runner.client().published_to("kitchen/doorlock_status"),
            [b"check".as_slice()]
        );
        assert_eq!(
            runner.client().published_to("deviceControl"),
            [b"kitchen,doorlock,toggle".as_slice()]
        );
    }

    #[test]
    fn dispatch_offline_drops_effects() {
        let (_, mut runner) = setup();
        runner.client_mut().connected = false;
        runner
            .dispatch(&[Effect::Toggle {
                room: "a".into(),
                device: "b".into(),
            }])
            .unwrap();
        assert!(runner.client().published.is_empty());
    }

    #[test]
    fn end_to_end_toggle() {
        let (mut c, mut runner) = setup();
        runner.poll(&mut c, 0).unwrap();
        runner
            .client_mut()
            .queue_message("deviceList/response", "kitchen-light1");
        runner.poll(&mut c, 10).unwrap();

        for (t, events) in [
            (20, InputEvents::proximity()),
            (30, InputEvents::select()),
            (40, InputEvents::select()),
            (50, InputEvents::select()),
        ] {
            let effects = c.apply_events(events, t).unwrap();
            runner.dispatch(&effects).unwrap();
        }

        assert_eq!(runner.client().published_to("deviceControl").len(), 1);
        assert!(c.navigator().states().get("kitchen/light1"));

        runner.client_mut().queue_message("kitchen/light1_status", "OFF");
        runner.poll(&mut c, 60).unwrap();
        assert!(!c.navigator().states().get("kitchen/light1"));
    }
}

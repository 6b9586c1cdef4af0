//! Network services that connect the controller to the MQTT feed.
//!
//! - [`FeedRunner`]: platform-agnostic glue between any [`MqttClient`] and a
//!   [`BrailleController`] (menu requests, status subscriptions, fallback menu,
//!   outbound toggles)
//! - `mqtt` feature: rumqttc-backed desktop client
//!
//! Both ESP32 and desktop builds run the same single-threaded loop:
//!
//! ```ignore
//! loop {
//!     let now = clock.now_ms();
//!     runner.poll(&mut controller, now)?;
//!     let effects = controller.tick(pins.read()?, now)?;
//!     runner.dispatch(&effects)?;
//! }
//! ```
//!
//! [`MqttClient`]: crate::traits::MqttClient
//! [`BrailleController`]: crate::BrailleController

pub mod feed_runner;

#[cfg(feature = "mqtt")]
pub mod mqtt;

pub use feed_runner::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;

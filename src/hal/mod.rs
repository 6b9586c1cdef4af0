//! Platform implementations of [`crate::traits`].
//!
//! - `mock`: in-memory matrix, panel, buzzer, pins, clock and broker used by
//!   the tests and the desktop simulator
//! - `esp32`: MAX7219 chain, LEDC buzzer, GPIO inputs, optional SSD1306 panel,
//!   WiFi and ESP-IDF MQTT (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;

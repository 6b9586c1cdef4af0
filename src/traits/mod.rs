//! Trait definitions for the hardware and network seams.
//!
//! Everything the controller touches goes through one of these traits, so the
//! whole navigation loop runs on desktop against [`crate::hal::mock`] and on
//! the device against `hal::esp32`.
//!
//! # Submodules
//!
//! - `hardware`: clock, input pins, buzzer
//! - `display`: braille dot matrix and text panel
//! - `network`: MQTT client

pub mod display;
pub mod hardware;
pub mod network;

pub use display::*;
pub use hardware::*;
pub use network::*;

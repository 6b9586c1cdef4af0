//! ESP32 hardware abstraction layer for the braille menu controller.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 DevKit (Xtensa dual core, 4MB Flash)
//! - **Braille display**: 8 chained FC-16 MAX7219 8x8 LED modules (SPI)
//! - **Input**: KY-040 rotary encoder, four push buttons, IR proximity sensor
//! - **Audio**: passive piezo buzzer (LEDC)
//! - **Text panel**: SSD1306 128x64 OLED (I2C, optional)
//!
//! # Pin Assignments
//!
//! See the [`pins`] module.

mod buzzer;
mod clock;
mod inputs;
mod matrix;
mod panel;

pub use buzzer::Esp32Buzzer;
pub use clock::Esp32Clock;
pub use inputs::{Esp32Inputs, InputWiring};
pub use matrix::{Max7219Chain, DEFAULT_MODULES};
pub use panel::LogPanel;

#[cfg(feature = "display")]
pub use panel::{DisplayError, Esp32Panel};

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "esp32-mqtt")]
mod mqtt;
#[cfg(feature = "esp32-mqtt")]
pub use mqtt::{Esp32Mqtt, Esp32MqttError};

/// GPIO numbers of the reference wiring.
pub mod pins {
    // =========================================================================
    // LED Matrix (MAX7219 chain, SPI2)
    // =========================================================================

    /// SPI clock
    pub const MATRIX_CLK: i32 = 18;

    /// SPI data out
    pub const MATRIX_DIN: i32 = 23;

    /// Chip select / load
    pub const MATRIX_CS: i32 = 21;

    // =========================================================================
    // Buttons (active high, pull-down)
    // =========================================================================

    /// Select
    pub const ENTER: i32 = 12;

    /// Back
    pub const BACK: i32 = 32;

    /// Next item
    pub const NEXT: i32 = 14;

    /// Previous item
    pub const PREV: i32 = 27;

    // =========================================================================
    // Rotary Encoder (KY-040)
    // =========================================================================

    /// Encoder clock/A signal
    pub const ENC_CLK: i32 = 2;

    /// Encoder data/B signal
    pub const ENC_DT: i32 = 4;

    // =========================================================================
    // Other
    // =========================================================================

    /// Piezo buzzer
    pub const BUZZER: i32 = 22;

    /// Proximity sensor output
    pub const PROXIMITY: i32 = 15;

    /// OLED I2C data
    pub const I2C_SDA: i32 = 25;

    /// OLED I2C clock
    pub const I2C_SCL: i32 = 26;

    /// Default I2C address for SSD1306 OLED
    pub const OLED_I2C_ADDR: u8 = 0x3C;
}

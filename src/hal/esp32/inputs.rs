//! Encoder, push buttons and proximity sensor on ESP32 GPIO.
//!
//! # Wiring
//!
//! - Encoder CLK → GPIO2, DT → GPIO4 (pull-ups, idle high)
//! - Enter → GPIO12, Back → GPIO32, Next → GPIO14, Prev → GPIO27
//!   (to 3.3V when pressed, pull-downs)
//! - Proximity sensor OUT → GPIO15 (high when someone is near)

use core::convert::Infallible;

use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};

use crate::input::RawInputs;
use crate::traits::InputPins;

/// GPIOs for every input line.
pub struct InputWiring {
    /// Encoder clock (A).
    pub clk: AnyIOPin,
    /// Encoder data (B).
    pub dt: AnyIOPin,
    /// Select button.
    pub enter: AnyIOPin,
    /// Back button.
    pub back: AnyIOPin,
    /// Next button.
    pub next: AnyIOPin,
    /// Previous button.
    pub prev: AnyIOPin,
    /// Proximity sensor output.
    pub proximity: AnyIOPin,
}

/// All input lines, sampled as raw levels.
///
/// Decoding (edges, debounce, direction) happens in
/// [`InputDecoder`](crate::input::InputDecoder); this type only reads pins.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::gpio::IOPin;
/// use rs_braille::hal::esp32::{Esp32Inputs, InputWiring};
/// use rs_braille::traits::InputPins;
///
/// let pins = peripherals.pins;
/// let mut inputs = Esp32Inputs::new(InputWiring {
///     clk: pins.gpio2.downgrade(),
///     dt: pins.gpio4.downgrade(),
///     enter: pins.gpio12.downgrade(),
///     back: pins.gpio32.downgrade(),
///     next: pins.gpio14.downgrade(),
///     prev: pins.gpio27.downgrade(),
///     proximity: pins.gpio15.downgrade(),
/// })?;
/// let levels = inputs.read()?;
/// ```
pub struct Esp32Inputs<'d> {
    clk: PinDriver<'d, AnyIOPin, Input>,
    dt: PinDriver<'d, AnyIOPin, Input>,
    enter: PinDriver<'d, AnyIOPin, Input>,
    back: PinDriver<'d, AnyIOPin, Input>,
    next: PinDriver<'d, AnyIOPin, Input>,
    prev: PinDriver<'d, AnyIOPin, Input>,
    proximity: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> Esp32Inputs<'d> {
    /// Configures every line as an input with its pull resistor.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(wiring: InputWiring) -> Result<Self, esp_idf_hal::sys::EspError> {
        Ok(Self {
            clk: input(wiring.clk, Pull::Up)?,
            dt: input(wiring.dt, Pull::Up)?,
            enter: input(wiring.enter, Pull::Down)?,
            back: input(wiring.back, Pull::Down)?,
            next: input(wiring.next, Pull::Down)?,
            prev: input(wiring.prev, Pull::Down)?,
            proximity: input(wiring.proximity, Pull::Floating)?,
        })
    }
}

fn input<'d>(
    pin: AnyIOPin,
    pull: Pull,
) -> Result<PinDriver<'d, AnyIOPin, Input>, esp_idf_hal::sys::EspError> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(pull)?;
    Ok(driver)
}

impl InputPins for Esp32Inputs<'_> {
    type Error = Infallible;

    fn read(&mut self) -> Result<RawInputs, Infallible> {
        Ok(RawInputs {
            clk: self.clk.is_high(),
            dt: self.dt.is_high(),
            enter: self.enter.is_high(),
            back: self.back.is_high(),
            next: self.next.is_high(),
            prev: self.prev.is_high(),
            proximity: self.proximity.is_high(),
        })
    }
}

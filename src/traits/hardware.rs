//! Hardware abstraction traits for input pins, the buzzer and time.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`InputPins`] | Encoder, buttons and proximity sensor levels |
//! | [`ToneOutput`] | Piezo buzzer |
//! | [`Clock`] | Millisecond time source |
//!
//! For tests use the mocks from [`crate::hal::mock`]; for the device use
//! `hal::esp32` (requires the `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rs_braille::hal::MockInputs;
//! use rs_braille::traits::InputPins;
//!
//! let mut pins = MockInputs::new();
//! pins.levels.enter = true;
//! assert!(pins.read().unwrap().enter);
//! ```

use crate::input::RawInputs;

/// Reads the raw levels of every input line.
///
/// Edge detection and debounce happen in [`crate::input::InputDecoder`];
/// implementations only report what the pins read right now.
pub trait InputPins {
    /// Error type for pin reads.
    type Error;

    /// Samples all lines (`true` = high).
    fn read(&mut self) -> Result<RawInputs, Self::Error>;
}

/// Square-wave tone generator.
///
/// Timing is handled by [`crate::tone::ToneScheduler`]; implementations only
/// start and stop the output.
pub trait ToneOutput {
    /// Error type for buzzer operations.
    type Error;

    /// Starts a tone at `frequency_hz`, replacing any current one.
    fn start(&mut self, frequency_hz: u32) -> Result<(), Self::Error>;

    /// Silences the output.
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Clock trait for getting current time in `no_std` environments.
///
/// Provides millisecond timestamps for debounce, tone scheduling and the
/// idle window.
pub trait Clock {
    /// Returns the current time in milliseconds since an arbitrary epoch.
    ///
    /// The epoch doesn't matter as long as it's consistent (e.g., boot time).
    fn now_ms(&self) -> u64;
}

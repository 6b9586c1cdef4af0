//! Piezo buzzer driven by an LEDC channel.
//!
//! A tone is a 50% duty square wave; the LEDC timer frequency is retuned per
//! tone and the duty dropped to zero for silence.
//!
//! # Wiring
//!
//! - Buzzer + → GPIO22
//! - Buzzer - → GND

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::ledc::{
    config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, Resolution,
    SpeedMode,
};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;
use esp_idf_hal::sys::{esp, ledc_mode_t, ledc_timer_t, EspError};

use crate::traits::ToneOutput;

/// LEDC tone generator.
///
/// # Example
///
/// ```ignore
/// use rs_braille::hal::esp32::Esp32Buzzer;
/// use rs_braille::traits::ToneOutput;
///
/// let mut buzzer = Esp32Buzzer::new(
///     peripherals.pins.gpio22,
///     peripherals.ledc.timer0,
///     peripherals.ledc.channel0,
/// )?;
/// buzzer.start(831)?;
/// ```
pub struct Esp32Buzzer<'d> {
    channel: LedcDriver<'d>,
    timer: ledc_timer_t,
    speed_mode: ledc_mode_t,
}

impl<'d> Esp32Buzzer<'d> {
    /// Timer frequency before the first tone.
    const IDLE_FREQ_HZ: u32 = 1_000;

    /// Duty resolution; coarse is fine for a square wave.
    const RESOLUTION: Resolution = Resolution::Bits8;

    /// Creates a silent buzzer.
    ///
    /// # Errors
    ///
    /// Returns an error if LEDC initialization fails.
    pub fn new<T, TI, C, CI, P, PI>(pin: P, timer: T, channel: C) -> Result<Self, EspError>
    where
        TI: LedcTimer + 'd,
        T: Peripheral<P = TI> + 'd,
        CI: LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        C: Peripheral<P = CI> + 'd,
        PI: OutputPin + 'd,
        P: Peripheral<P = PI> + 'd,
    {
        let timer_config = TimerConfig::default()
            .frequency(Self::IDLE_FREQ_HZ.Hz())
            .resolution(Self::RESOLUTION);
        let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;
        let timer_id = timer_driver.timer();

        let mut channel = LedcDriver::new(channel, timer_driver, pin)?;
        channel.set_duty(0)?;

        Ok(Self {
            channel,
            timer: timer_id,
            speed_mode: TI::SpeedMode::SPEED_MODE,
        })
    }
}

impl ToneOutput for Esp32Buzzer<'_> {
    type Error = EspError;

    fn start(&mut self, frequency_hz: u32) -> Result<(), EspError> {
        // Retunes the shared timer; this channel is its only user.
        esp!(unsafe { esp_idf_hal::sys::ledc_set_freq(self.speed_mode, self.timer, frequency_hz) })?;
        let half = self.channel.get_max_duty() / 2;
        self.channel.set_duty(half)
    }

    fn stop(&mut self) -> Result<(), EspError> {
        self.channel.set_duty(0)
    }
}

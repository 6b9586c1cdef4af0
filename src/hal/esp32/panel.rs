//! Text panels mirroring the braille output for sighted helpers.
//!
//! - [`Esp32Panel`]: SSD1306 128x64 OLED over I2C (`display` feature)
//! - [`LogPanel`]: writes the lines to the log when no panel is fitted
//!
//! # Wiring (OLED)
//!
//! - SDA → GPIO25
//! - SCL → GPIO26
//! - VCC → 3.3V
//! - GND → GND

use core::convert::Infallible;

use log::info;

use crate::traits::TextPanel;

#[cfg(feature = "display")]
pub use oled::{DisplayError, Esp32Panel};

/// Panel that logs each screen instead of drawing it.
#[derive(Debug, Default)]
pub struct LogPanel;

impl TextPanel for LogPanel {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Infallible> {
        info!("[panel] {} | {}", line1, line2);
        Ok(())
    }
}

#[cfg(feature = "display")]
mod oled {
    use embedded_graphics::{
        mono_font::{ascii::FONT_9X15, MonoTextStyle},
        pixelcolor::BinaryColor,
        prelude::*,
        text::Text,
    };
    use esp_idf_hal::i2c::I2cDriver;
    use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

    use crate::traits::TextPanel;

    type DisplayDriver<'d> = Ssd1306<
        I2CInterface<I2cDriver<'d>>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    /// SSD1306 OLED showing two lines in a large font.
    ///
    /// ```text
    /// ┌────────────────────────────┐
    /// │ Selected:                  │
    /// │                            │
    /// │ kitchen                    │
    /// └────────────────────────────┘
    /// ```
    pub struct Esp32Panel<'d> {
        display: DisplayDriver<'d>,
    }

    impl<'d> Esp32Panel<'d> {
        /// Wraps an I2C bus. Call [`TextPanel::init`] before use.
        pub fn new(i2c: I2cDriver<'d>) -> Self {
            let interface = I2CDisplayInterface::new(i2c);
            let display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            Self { display }
        }
    }

    impl TextPanel for Esp32Panel<'_> {
        type Error = DisplayError;

        fn init(&mut self) -> Result<(), DisplayError> {
            self.display.init()?;
            self.clear()
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            self.display.clear(BinaryColor::Off)?;
            self.display.flush()?;
            Ok(())
        }

        fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
            self.display.clear(BinaryColor::Off)?;

            let style = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
            Text::new(line1, Point::new(2, 20), style).draw(&mut self.display)?;
            Text::new(line2, Point::new(2, 48), style).draw(&mut self.display)?;

            self.display.flush()?;
            Ok(())
        }
    }

    /// Display error type.
    #[derive(Debug)]
    pub struct DisplayError;

    impl From<display_interface::DisplayError> for DisplayError {
        fn from(_: display_interface::DisplayError) -> Self {
            DisplayError
        }
    }

    impl core::fmt::Display for DisplayError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("OLED write failed")
        }
    }
}

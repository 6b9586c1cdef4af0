//! Chain of MAX7219 8x8 LED modules (FC-16 boards) over SPI.
//!
//! Column numbering follows the FC-16 convention: column 0 is the rightmost
//! column of the module nearest the MCU, and each module adds eight columns
//! to the left. Row 0 is the top row.
//!
//! # Wiring
//!
//! - DIN → GPIO23 (MOSI)
//! - CLK → GPIO18 (SCLK)
//! - CS → GPIO21

use embedded_hal::spi::SpiDevice;
use log::debug;

use crate::traits::DotMatrix;

const REG_DIGIT0: u8 = 0x01;
const REG_DECODE_MODE: u8 = 0x09;
const REG_INTENSITY: u8 = 0x0A;
const REG_SCAN_LIMIT: u8 = 0x0B;
const REG_SHUTDOWN: u8 = 0x0C;
const REG_DISPLAY_TEST: u8 = 0x0F;

/// Modules on the stock panel.
pub const DEFAULT_MODULES: usize = 8;

/// Framebuffered MAX7219 chain.
///
/// [`set_point`](DotMatrix::set_point) only touches the framebuffer;
/// [`flush`](DotMatrix::flush) writes all eight rows of every module.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::spi::{config::Config, SpiDeviceDriver, SpiDriverConfig};
/// use rs_braille::hal::esp32::Max7219Chain;
///
/// let spi = SpiDeviceDriver::new_single(
///     peripherals.spi2,
///     peripherals.pins.gpio18,
///     peripherals.pins.gpio23,
///     Option::<esp_idf_hal::gpio::AnyIOPin>::None,
///     Some(peripherals.pins.gpio21),
///     &SpiDriverConfig::new(),
///     &Config::new().baudrate(5.MHz().into()),
/// )?;
/// let mut matrix = Max7219Chain::new(spi, 8);
/// matrix.init(5)?;
/// ```
pub struct Max7219Chain<SPI> {
    spi: SPI,
    frame: Vec<[u8; 8]>,
}

impl<SPI: SpiDevice> Max7219Chain<SPI> {
    /// Creates a chain of `modules` displays. Call [`init`](Self::init)
    /// before use.
    pub fn new(spi: SPI, modules: usize) -> Self {
        Self {
            spi,
            frame: vec![[0; 8]; modules],
        }
    }

    /// Wakes every module in raw (no decode) mode with `intensity` 0-15.
    pub fn init(&mut self, intensity: u8) -> Result<(), SPI::Error> {
        self.broadcast(REG_DISPLAY_TEST, 0)?;
        self.broadcast(REG_SCAN_LIMIT, 7)?;
        self.broadcast(REG_DECODE_MODE, 0)?;
        self.broadcast(REG_INTENSITY, intensity.min(15))?;
        self.clear()?;
        self.flush()?;
        self.broadcast(REG_SHUTDOWN, 1)?;
        debug!("MAX7219 chain of {} ready", self.frame.len());
        Ok(())
    }

    /// Number of chained modules.
    pub fn modules(&self) -> usize {
        self.frame.len()
    }

    fn broadcast(&mut self, register: u8, value: u8) -> Result<(), SPI::Error> {
        let buf: Vec<u8> = (0..self.frame.len()).flat_map(|_| [register, value]).collect();
        self.spi.write(&buf)
    }
}

impl<SPI: SpiDevice> DotMatrix for Max7219Chain<SPI> {
    type Error = SPI::Error;

    fn clear(&mut self) -> Result<(), SPI::Error> {
        self.frame.iter_mut().for_each(|rows| *rows = [0; 8]);
        Ok(())
    }

    fn set_point(&mut self, row: u8, column: u8, on: bool) -> Result<(), SPI::Error> {
        let module = usize::from(column / 8);
        let Some(rows) = self.frame.get_mut(module) else {
            return Ok(());
        };
        let Some(bits) = rows.get_mut(usize::from(row)) else {
            return Ok(());
        };
        let mask = 1 << (column % 8);
        if on {
            *bits |= mask;
        } else {
            *bits &= !mask;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SPI::Error> {
        let mut buf = Vec::with_capacity(self.frame.len() * 2);
        for row in 0..8u8 {
            buf.clear();
            // The first word shifted out ends up in the farthest module.
            for rows in self.frame.iter().rev() {
                buf.push(REG_DIGIT0 + row);
                buf.push(rows[usize::from(row)]);
            }
            self.spi.write(&buf)?;
        }
        Ok(())
    }
}

//! Display outputs: the braille dot matrix and the two-line text panel.

/// Addressable dot matrix carrying the braille cells.
///
/// Points are buffered; nothing is guaranteed visible until
/// [`flush`](Self::flush) returns.
///
/// # Example
///
/// ```ignore
/// use rs_braille::traits::DotMatrix;
///
/// struct Leds { /* SPI handle, framebuffer */ }
///
/// impl DotMatrix for Leds {
///     type Error = ();
///
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn set_point(&mut self, row: u8, column: u8, on: bool) -> Result<(), ()> { Ok(()) }
///     fn flush(&mut self) -> Result<(), ()> { Ok(()) }
/// }
/// ```
pub trait DotMatrix {
    /// Error type for matrix operations.
    type Error;

    /// Lowers every point.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Sets one point. Coordinates outside the panel are ignored.
    fn set_point(&mut self, row: u8, column: u8, on: bool) -> Result<(), Self::Error>;

    /// Pushes buffered points to the hardware.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Two-line character display mirroring the braille output.
pub trait TextPanel {
    /// Error type for panel operations.
    type Error;

    /// Initializes the panel. Called once at startup.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clears the panel.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Replaces the contents with two lines of text.
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error>;
}

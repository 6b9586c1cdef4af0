//! Monotonic millisecond clock from the ESP-IDF high resolution timer.

use crate::traits::Clock;

/// Milliseconds since the clock was created.
///
/// Reads `esp_timer_get_time()`, which counts microseconds since boot and
/// never wraps in practice (64-bit).
///
/// ```ignore
/// use rs_braille::hal::esp32::Esp32Clock;
/// use rs_braille::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let debounce_deadline = clock.now_ms() + 100;
/// ```
pub struct Esp32Clock {
    origin_us: i64,
}

impl Esp32Clock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            origin_us: timer_us(),
        }
    }
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        let elapsed = timer_us().saturating_sub(self.origin_us).max(0);
        (elapsed / 1000) as u64
    }
}

#[inline]
fn timer_us() -> i64 {
    // Plain read of the system timer.
    unsafe { esp_idf_hal::sys::esp_timer_get_time() }
}

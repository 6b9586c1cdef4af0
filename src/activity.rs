//! Idle/sleep timing.
//!
//! Any qualifying input calls [`ActivityClock::touch`]; the loop calls
//! [`ActivityClock::check_idle`] once per tick after inputs have been handled,
//! so an event in the same tick always wins over the timeout.

/// Default active window before the device goes to sleep.
pub const DEFAULT_ACTIVE_WINDOW_MS: u64 = 10_000;

/// Tracks the last qualifying input and whether the device sleeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityClock {
    last_active_at: u64,
    active_window: u64,
    sleeping: bool,
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVE_WINDOW_MS)
    }
}

impl ActivityClock {
    /// Creates a clock that starts asleep.
    pub const fn new(active_window_ms: u64) -> Self {
        Self {
            last_active_at: 0,
            active_window: active_window_ms,
            sleeping: true,
        }
    }

    /// Records a qualifying input. Returns `true` if this woke the device.
    pub fn touch(&mut self, now_ms: u64) -> bool {
        self.last_active_at = now_ms;
        let woke = self.sleeping;
        self.sleeping = false;
        woke
    }

    /// Puts the device to sleep once the window has elapsed.
    ///
    /// Returns `true` only on the awake-to-sleeping transition.
    pub fn check_idle(&mut self, now_ms: u64) -> bool {
        if self.sleeping || self.idle_for(now_ms) < self.active_window {
            return false;
        }
        self.sleeping = true;
        true
    }

    /// Time since the last qualifying input.
    #[inline]
    pub fn idle_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_active_at)
    }

    /// True while asleep.
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Timestamp of the last qualifying input.
    #[inline]
    pub fn last_active_at(&self) -> u64 {
        self.last_active_at
    }

    /// Configured active window.
    #[inline]
    pub fn active_window(&self) -> u64 {
        self.active_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_sleeping() {
        let clock = ActivityClock::new(1000);
        assert!(clock.is_sleeping());
    }

    #[test]
    fn touch_wakes_once() {
        let mut clock = ActivityClock::new(1000);
        assert!(clock.touch(50));
        assert!(!clock.touch(60));
        assert_eq!(clock.last_active_at(), 60);
    }

    #[test]
    fn idle_after_window() {
        let mut clock = ActivityClock::new(1000);
        clock.touch(0);
        assert!(!clock.check_idle(999));
        assert!(clock.check_idle(1000));
        assert!(clock.is_sleeping());
        // Only the transition reports.
        assert!(!clock.check_idle(5000));
    }

    #[test]
    fn touch_resets_window() {
        let mut clock = ActivityClock::new(1000);
        clock.touch(0);
        clock.touch(900);
        assert!(!clock.check_idle(1500));
        assert!(clock.check_idle(1900));
    }

    #[test]
    fn idle_for_saturates() {
        let mut clock = ActivityClock::new(1000);
        clock.touch(500);
        assert_eq!(clock.idle_for(100), 0);
    }
}

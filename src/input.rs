//! Raw pin levels to navigation events.
//!
//! The encoder direction is read on a falling edge of CLK, at most once per
//! debounce interval: DT differing from the new CLK level means "next".
//! Buttons fire on a low to high edge. The proximity sensor is reported for
//! as long as its line is high, so someone standing at the device keeps it
//! awake.

/// Default encoder debounce interval.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Pin levels sampled in one loop tick (`true` = high).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawInputs {
    /// Encoder clock line.
    pub clk: bool,
    /// Encoder data line.
    pub dt: bool,
    /// Select button.
    pub enter: bool,
    /// Back button.
    pub back: bool,
    /// Next button.
    pub next: bool,
    /// Previous button.
    pub prev: bool,
    /// Proximity sensor output.
    pub proximity: bool,
}

/// Cursor direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// Advance.
    Next,
    /// Retreat.
    Prev,
}

impl Rotation {
    /// True for [`Rotation::Next`].
    #[inline]
    pub fn is_forward(self) -> bool {
        self == Rotation::Next
    }
}

/// Events decoded from one sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputEvents {
    /// Encoder step or next/prev button press.
    pub rotation: Option<Rotation>,
    /// Select pressed.
    pub select: bool,
    /// Back pressed.
    pub back: bool,
    /// Someone is in front of the device.
    pub proximity: bool,
}

impl InputEvents {
    /// Only a rotation.
    pub fn rotate(rotation: Rotation) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// Only a select press.
    pub fn select() -> Self {
        Self {
            select: true,
            ..Self::default()
        }
    }

    /// Only a back press.
    pub fn back() -> Self {
        Self {
            back: true,
            ..Self::default()
        }
    }

    /// Only a proximity trigger.
    pub fn proximity() -> Self {
        Self {
            proximity: true,
            ..Self::default()
        }
    }

    /// True if anything counts as activity.
    pub fn is_qualifying(&self) -> bool {
        self.is_user_action() || self.proximity
    }

    /// True for deliberate input (not just ambient proximity).
    pub fn is_user_action(&self) -> bool {
        self.rotation.is_some() || self.select || self.back
    }
}

/// Edge detector for [`RawInputs`].
#[derive(Clone, Debug)]
pub struct InputDecoder {
    debounce_ms: u64,
    last: RawInputs,
    last_step_at: Option<u64>,
    queued: Option<Rotation>,
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl InputDecoder {
    /// Creates a decoder assuming all lines idle high except the sensors.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            last: RawInputs {
                clk: true,
                dt: true,
                ..RawInputs::default()
            },
            last_step_at: None,
            queued: None,
        }
    }

    /// Seeds the previous levels, e.g. with the first reading at startup.
    pub fn prime(&mut self, raw: RawInputs) {
        self.last = raw;
    }

    /// Decodes one sample taken at `now_ms`.
    ///
    /// One rotation is reported per sample. A next/prev press that lands on
    /// the same sample as an encoder step is held over to the next sample.
    pub fn sample(&mut self, raw: RawInputs, now_ms: u64) -> InputEvents {
        let mut events = InputEvents::default();

        let clk_fell = self.last.clk && !raw.clk;
        let settled = self
            .last_step_at
            .map_or(true, |at| now_ms.saturating_sub(at) >= self.debounce_ms);
        if clk_fell && settled {
            events.rotation = Some(if raw.dt != raw.clk {
                Rotation::Next
            } else {
                Rotation::Prev
            });
            self.last_step_at = Some(now_ms);
        }

        if events.rotation.is_none() {
            events.rotation = self.queued.take();
        }

        let pressed = if rose(self.last.next, raw.next) {
            Some(Rotation::Next)
        } else if rose(self.last.prev, raw.prev) {
            Some(Rotation::Prev)
        } else {
            None
        };
        if let Some(rotation) = pressed {
            if events.rotation.is_none() {
                events.rotation = Some(rotation);
            } else {
                self.queued = Some(rotation);
            }
        }

        events.select = rose(self.last.enter, raw.enter);
        events.back = rose(self.last.back, raw.back);
        events.proximity = raw.proximity;

        self.last = raw;
        events
    }
}

#[inline]
fn rose(before: bool, now: bool) -> bool {
    !before && now
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> RawInputs {
        RawInputs {
            clk: true,
            dt: true,
            ..RawInputs::default()
        }
    }

    fn clk_low(dt: bool) -> RawInputs {
        RawInputs {
            clk: false,
            dt,
            ..RawInputs::default()
        }
    }

    // =========================================================================
    // Encoder Tests
    // =========================================================================

    #[test]
    fn falling_clk_with_dt_high_is_next() {
        let mut dec = InputDecoder::new(100);
        let ev = dec.sample(clk_low(true), 0);
        assert_eq!(ev.rotation, Some(Rotation::Next));
    }

    #[test]
    fn falling_clk_with_dt_low_is_prev() {
        let mut dec = InputDecoder::new(100);
        let ev = dec.sample(clk_low(false), 0);
        assert_eq!(ev.rotation, Some(Rotation::Prev));
    }

    #[test]
    fn rising_clk_is_ignored() {
        let mut dec = InputDecoder::new(100);
        dec.prime(clk_low(false));
        assert_eq!(dec.sample(idle(), 500).rotation, None);
    }

    #[test]
    fn steady_low_clk_fires_once() {
        let mut dec = InputDecoder::new(100);
        assert!(dec.sample(clk_low(true), 0).rotation.is_some());
        assert!(dec.sample(clk_low(true), 200).rotation.is_none());
    }

    #[test]
    fn steps_inside_debounce_are_dropped() {
        let mut dec = InputDecoder::new(100);
        assert!(dec.sample(clk_low(true), 1000).rotation.is_some());
        dec.sample(idle(), 1020);
        assert!(dec.sample(clk_low(true), 1050).rotation.is_none());
        dec.sample(idle(), 1080);
        assert!(dec.sample(clk_low(true), 1100).rotation.is_some());
    }

    // =========================================================================
    // Button Tests
    // =========================================================================

    #[test]
    fn button_fires_on_rising_edge_only() {
        let mut dec = InputDecoder::new(100);
        let pressed = RawInputs {
            enter: true,
            ..idle()
        };
        assert!(dec.sample(pressed, 0).select);
        assert!(!dec.sample(pressed, 10).select);
        assert!(!dec.sample(idle(), 20).select);
        assert!(dec.sample(pressed, 30).select);
    }

    #[test]
    fn next_prev_buttons_map_to_rotation() {
        let mut dec = InputDecoder::new(100);
        let next = RawInputs { next: true, ..idle() };
        assert_eq!(dec.sample(next, 0).rotation, Some(Rotation::Next));
        dec.sample(idle(), 10);
        let prev = RawInputs { prev: true, ..idle() };
        assert_eq!(dec.sample(prev, 20).rotation, Some(Rotation::Prev));
    }

    #[test]
    fn proximity_is_qualifying_but_not_user_action() {
        let mut dec = InputDecoder::new(100);
        let near = RawInputs {
            proximity: true,
            ..idle()
        };
        let ev = dec.sample(near, 0);
        assert!(ev.proximity);
        assert!(ev.is_qualifying());
        assert!(!ev.is_user_action());
    }

    #[test]
    fn proximity_reported_while_held() {
        let mut dec = InputDecoder::new(100);
        let near = RawInputs {
            proximity: true,
            ..idle()
        };
        for t in 0..5 {
            assert!(dec.sample(near, t * 20).proximity);
        }
        assert!(!dec.sample(idle(), 100).proximity);
    }

    #[test]
    fn button_press_during_encoder_step_is_held_over() {
        let mut dec = InputDecoder::new(100);
        let both = RawInputs {
            clk: false,
            dt: false,
            next: true,
            ..RawInputs::default()
        };
        assert_eq!(dec.sample(both, 0).rotation, Some(Rotation::Prev));
        let released = RawInputs {
            next: true,
            ..idle()
        };
        assert_eq!(dec.sample(released, 20).rotation, Some(Rotation::Next));
        assert_eq!(dec.sample(released, 40).rotation, None);
    }

    #[test]
    fn idle_sample_is_empty() {
        let mut dec = InputDecoder::new(100);
        let ev = dec.sample(idle(), 0);
        assert_eq!(ev, InputEvents::default());
        assert!(!ev.is_qualifying());
    }
}

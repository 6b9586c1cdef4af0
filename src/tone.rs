//! Audible feedback without blocking the loop.
//!
//! A tone is started immediately and stopped by [`ToneScheduler::tick`] once
//! its end time has passed. Starting a new tone replaces the current one.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::hal::MockTone;
//! use rs_braille::tone::{Tone, ToneScheduler};
//!
//! let mut buzzer = MockTone::new();
//! let mut tones = ToneScheduler::new();
//!
//! tones.play(&mut buzzer, Tone::Next, 0).unwrap();
//! assert_eq!(buzzer.frequency_hz, Some(831));
//!
//! tones.tick(&mut buzzer, 99).unwrap();
//! assert!(tones.is_playing());
//! tones.tick(&mut buzzer, 100).unwrap();
//! assert_eq!(buzzer.frequency_hz, None);
//! ```

use crate::traits::ToneOutput;

/// Feedback cue, one pitch per action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tone {
    /// Cursor moved forward.
    Next,
    /// Cursor moved back.
    Prev,
    /// Entered a submenu or status view.
    Select,
    /// Returned to the room list.
    Back,
    /// Action refused (empty menu, room without devices).
    Reject,
    /// Toggle sent.
    Confirm,
}

impl Tone {
    /// Pitch in Hz.
    pub const fn frequency_hz(self) -> u32 {
        match self {
            Tone::Next => 831,
            Tone::Prev => 659,
            Tone::Select => 523,
            Tone::Back => 392,
            Tone::Reject => 220,
            Tone::Confirm => 1047,
        }
    }

    /// Duration in milliseconds.
    pub const fn duration_ms(self) -> u64 {
        match self {
            Tone::Reject => 200,
            Tone::Confirm => 150,
            _ => 100,
        }
    }
}

/// Tracks the end time of the current tone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToneScheduler {
    playing: Option<(Tone, u64)>,
}

impl ToneScheduler {
    /// Creates an idle scheduler.
    pub const fn new() -> Self {
        Self { playing: None }
    }

    /// Starts `tone` now; it ends at `now_ms + duration`.
    pub fn play<T: ToneOutput>(
        &mut self,
        output: &mut T,
        tone: Tone,
        now_ms: u64,
    ) -> Result<(), T::Error> {
        output.start(tone.frequency_hz())?;
        self.playing = Some((tone, now_ms + tone.duration_ms()));
        Ok(())
    }

    /// Silences the output once the current tone has run its course.
    pub fn tick<T: ToneOutput>(&mut self, output: &mut T, now_ms: u64) -> Result<(), T::Error> {
        match self.playing {
            Some((_, end)) if now_ms >= end => {
                self.playing = None;
                output.stop()
            }
            _ => Ok(()),
        }
    }

    /// Tone currently sounding.
    pub fn current(&self) -> Option<Tone> {
        self.playing.map(|(tone, _)| tone)
    }

    /// True while a tone is sounding.
    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockTone;

    #[test]
    fn every_action_has_a_distinct_pitch() {
        let all = [
            Tone::Next,
            Tone::Prev,
            Tone::Select,
            Tone::Back,
            Tone::Reject,
            Tone::Confirm,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.frequency_hz(), b.frequency_hz());
            }
        }
    }

    #[test]
    fn durations_stay_short() {
        for tone in [Tone::Next, Tone::Reject, Tone::Confirm] {
            assert!(tone.duration_ms() <= 200);
        }
    }

    #[test]
    fn new_tone_replaces_current() {
        let mut out = MockTone::new();
        let mut tones = ToneScheduler::new();
        tones.play(&mut out, Tone::Next, 0).unwrap();
        tones.play(&mut out, Tone::Reject, 50).unwrap();
        assert_eq!(tones.current(), Some(Tone::Reject));
        assert_eq!(out.frequency_hz, Some(220));

        tones.tick(&mut out, 150).unwrap();
        assert!(tones.is_playing());
        tones.tick(&mut out, 250).unwrap();
        assert!(!tones.is_playing());
        assert_eq!(out.stop_count, 1);
    }

    #[test]
    fn tick_when_idle_does_nothing() {
        let mut out = MockTone::new();
        let mut tones = ToneScheduler::new();
        tones.tick(&mut out, 1000).unwrap();
        assert_eq!(out.stop_count, 0);
    }
}

//! Controller that ties the navigator to the matrix, text panel and buzzer.
//!
//! [`BrailleController`] is what the main loop drives. Each tick it decodes
//! the raw pin levels, runs the navigator, plays tones, redraws both displays
//! when the screen changed, and hands back the effects that need the network
//! (toggle commands and status checks).
//!
//! # Example
//!
//! ```rust
//! use rs_braille::config::Config;
//! use rs_braille::hal::{MockMatrix, MockPanel, MockTone};
//! use rs_braille::input::RawInputs;
//! use rs_braille::BrailleController;
//!
//! let mut controller = BrailleController::new(
//!     MockMatrix::new(),
//!     MockPanel::new(),
//!     MockTone::new(),
//!     &Config::default(),
//! );
//! controller.init(0).unwrap();
//! controller.load_feed("kitchen-light1,bath").unwrap();
//!
//! // Someone walks up: proximity wakes without the welcome screen.
//! let idle = RawInputs { clk: true, dt: true, ..RawInputs::default() };
//! let near = RawInputs { proximity: true, ..idle };
//! controller.tick(idle, 0).unwrap();
//! controller.tick(near, 20).unwrap();
//!
//! assert_eq!(controller.panel().lines(), ("Selected:", "kitchen"));
//! ```

use alloc::vec::Vec;
use core::fmt;

use log::debug;

use crate::braille::encode;
use crate::config::Config;
use crate::input::{InputDecoder, InputEvents, RawInputs};
use crate::layout::{project, CellLayout};
use crate::navigator::{Effect, Navigator, Screen};
use crate::tone::ToneScheduler;
use crate::traits::{DotMatrix, TextPanel, ToneOutput};

/// Failure of one of the output devices.
#[derive(Debug, PartialEq, Eq)]
pub enum HardwareError<D, P, T> {
    /// Dot matrix failed.
    Matrix(D),
    /// Text panel failed.
    Panel(P),
    /// Buzzer failed.
    Tone(T),
}

impl<D: fmt::Debug, P: fmt::Debug, T: fmt::Debug> fmt::Display for HardwareError<D, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::Matrix(e) => write!(f, "dot matrix error: {:?}", e),
            HardwareError::Panel(e) => write!(f, "text panel error: {:?}", e),
            HardwareError::Tone(e) => write!(f, "buzzer error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<D: fmt::Debug, P: fmt::Debug, T: fmt::Debug> std::error::Error for HardwareError<D, P, T> {}

/// Error type of a [`BrailleController`] over `D`, `P`, `T`.
pub type ControllerError<D, P, T> = HardwareError<
    <D as DotMatrix>::Error,
    <P as TextPanel>::Error,
    <T as ToneOutput>::Error,
>;

/// Main controller.
///
/// # Type Parameters
///
/// - `D`: braille dot matrix ([`DotMatrix`])
/// - `P`: text panel ([`TextPanel`])
/// - `T`: buzzer ([`ToneOutput`])
pub struct BrailleController<D: DotMatrix, P: TextPanel, T: ToneOutput> {
    matrix: D,
    panel: P,
    buzzer: T,
    navigator: Navigator,
    decoder: InputDecoder,
    tones: ToneScheduler,
    layout: CellLayout,
    max_cells: usize,
    shown: Option<Screen>,
}

impl<D: DotMatrix, P: TextPanel, T: ToneOutput> BrailleController<D, P, T> {
    /// Creates a controller using the stock FC-16 panel layout.
    pub fn new(matrix: D, panel: P, buzzer: T, config: &Config) -> Self {
        let nav = &config.navigation;
        let layout = CellLayout::fc16_chain();
        Self {
            matrix,
            panel,
            buzzer,
            navigator: Navigator::new(nav),
            decoder: InputDecoder::new(nav.debounce_ms),
            tones: ToneScheduler::new(),
            max_cells: nav.max_cells.min(layout.len()),
            layout,
            shown: None,
        }
    }

    /// Replaces the cell layout.
    pub fn with_layout(mut self, layout: CellLayout) -> Self {
        self.max_cells = self.max_cells.min(layout.len());
        self.layout = layout;
        self
    }

    /// Initializes the panel and draws the initial screen.
    pub fn init(&mut self, _now_ms: u64) -> Result<(), ControllerError<D, P, T>> {
        self.panel.init().map_err(HardwareError::Panel)?;
        self.render()
    }

    /// Seeds the input decoder with the levels read at startup.
    pub fn prime_inputs(&mut self, raw: RawInputs) {
        self.decoder.prime(raw);
    }

    // =========================================================================
    // Loop
    // =========================================================================

    /// Runs one loop iteration with freshly sampled pin levels.
    ///
    /// Returns the effects the network layer must carry out.
    pub fn tick(
        &mut self,
        raw: RawInputs,
        now_ms: u64,
    ) -> Result<Vec<Effect>, ControllerError<D, P, T>> {
        let events = self.decoder.sample(raw, now_ms);
        self.apply_events(events, now_ms)
    }

    /// Like [`tick`](Self::tick) but with already decoded events.
    pub fn apply_events(
        &mut self,
        events: InputEvents,
        now_ms: u64,
    ) -> Result<Vec<Effect>, ControllerError<D, P, T>> {
        let step = self.navigator.handle(events, now_ms);

        let mut outbound = Vec::new();
        for effect in step.effects {
            match effect {
                Effect::Tone(tone) => self
                    .tones
                    .play(&mut self.buzzer, tone, now_ms)
                    .map_err(HardwareError::Tone)?,
                other => outbound.push(other),
            }
        }
        self.tones
            .tick(&mut self.buzzer, now_ms)
            .map_err(HardwareError::Tone)?;

        if step.redraw {
            self.refresh()?;
        }
        Ok(outbound)
    }

    // =========================================================================
    // Feed
    // =========================================================================

    /// Rebuilds the menu from a feed payload.
    pub fn load_feed(&mut self, payload: &str) -> Result<(), ControllerError<D, P, T>> {
        if self.navigator.load_feed(payload) {
            self.refresh()?;
        }
        Ok(())
    }

    /// Applies an authoritative device status.
    pub fn apply_status(
        &mut self,
        room: &str,
        device: &str,
        on: bool,
    ) -> Result<(), ControllerError<D, P, T>> {
        if self.navigator.apply_status(room, device, on) {
            self.refresh()?;
        }
        Ok(())
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Redraws if the screen differs from what is shown.
    pub fn refresh(&mut self) -> Result<(), ControllerError<D, P, T>> {
        if self.shown.as_ref() == Some(&self.navigator.screen()) {
            return Ok(());
        }
        self.render()
    }

    /// Redraws both displays unconditionally.
    pub fn render(&mut self) -> Result<(), ControllerError<D, P, T>> {
        let screen = self.navigator.screen();
        debug!("render {:?}", screen);

        let cells = encode(screen.braille_text(), self.max_cells);
        self.matrix.clear().map_err(HardwareError::Matrix)?;
        for w in project(&cells, cells.len(), &self.layout) {
            self.matrix
                .set_point(w.row, w.column, w.on)
                .map_err(HardwareError::Matrix)?;
        }
        self.matrix.flush().map_err(HardwareError::Matrix)?;

        let (line1, line2) = screen.panel_lines();
        self.panel.show(line1, line2).map_err(HardwareError::Panel)?;

        self.shown = Some(screen);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The navigator.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Mutable navigator, for menu edits. Call [`refresh`](Self::refresh) after.
    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Screen last drawn.
    pub fn shown(&self) -> Option<&Screen> {
        self.shown.as_ref()
    }

    /// The cell layout.
    pub fn layout(&self) -> &CellLayout {
        &self.layout
    }

    /// The dot matrix.
    pub fn matrix(&self) -> &D {
        &self.matrix
    }

    /// The text panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The buzzer.
    pub fn buzzer(&self) -> &T {
        &self.buzzer
    }

    /// Mutable dot matrix.
    pub fn matrix_mut(&mut self) -> &mut D {
        &mut self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::lookup;
    use crate::hal::{MockMatrix, MockPanel, MockTone};
    use crate::input::Rotation;
    use crate::navigator::NavState;

    type Mock = BrailleController<MockMatrix, MockPanel, MockTone>;

    fn controller() -> Mock {
        let mut c = BrailleController::new(
            MockMatrix::new(),
            MockPanel::new(),
            MockTone::new(),
            &Config::default(),
        );
        c.init(0).unwrap();
        c
    }

    /// Loaded and awake at t = 0 via proximity (no welcome screen).
    fn awake(feed: &str) -> Mock {
        let mut c = controller();
        c.load_feed(feed).unwrap();
        c.apply_events(InputEvents::proximity(), 0).unwrap();
        c
    }

    #[test]
    fn init_draws_blank_screen() {
        let c = controller();
        assert!(c.panel().initialized);
        assert_eq!(c.panel().lines(), ("", ""));
        assert!(c.matrix().visible.is_empty());
        assert_eq!(c.shown(), Some(&Screen::Blank));
    }

    #[test]
    fn wake_renders_room_label() {
        let c = awake("kitchen-light1,bath");
        assert_eq!(c.panel().lines(), ("Selected:", "kitchen"));
        let cells = c.matrix().cells(c.layout(), 2);
        assert_eq!(cells[0], lookup('k').unwrap());
        assert_eq!(cells[1], lookup('i').unwrap());
    }

    #[test]
    fn shorter_label_clears_previous_cells() {
        let mut c = awake("kitchen,bath");
        c.apply_events(InputEvents::rotate(Rotation::Next), 10).unwrap();
        let cells = c.matrix().cells(c.layout(), 13);
        assert_eq!(cells[3], lookup('h').unwrap());
        assert!(cells[4..].iter().all(|c| c.is_blank()));
    }

    #[test]
    fn tones_play_and_stop() {
        let mut c = awake("a,b");
        c.apply_events(InputEvents::rotate(Rotation::Next), 10).unwrap();
        assert_eq!(c.buzzer().frequency_hz, Some(831));
        c.apply_events(InputEvents::default(), 50).unwrap();
        assert_eq!(c.buzzer().frequency_hz, Some(831));
        c.apply_events(InputEvents::default(), 110).unwrap();
        assert_eq!(c.buzzer().frequency_hz, None);
    }

    #[test]
    fn network_effects_are_returned() {
        let mut c = awake("kitchen-light1");
        assert!(c.apply_events(InputEvents::select(), 10).unwrap().is_empty());
        let out = c.apply_events(InputEvents::select(), 20).unwrap();
        assert_eq!(
            out,
            [Effect::RequestStatus {
                room: "kitchen".into(),
                device: "light1".into()
            }]
        );
        assert_eq!(c.panel().lines(), ("Status:", "OFF"));

        let out = c.apply_events(InputEvents::select(), 30).unwrap();
        assert_eq!(
            out,
            [Effect::Toggle {
                room: "kitchen".into(),
                device: "light1".into()
            }]
        );
        assert_eq!(c.navigator().state(), NavState::DeviceMenu);
    }

    #[test]
    fn visible_status_update_redraws() {
        let mut c = awake("kitchen-light1");
        c.apply_events(InputEvents::select(), 10).unwrap();
        c.apply_events(InputEvents::select(), 20).unwrap();
        c.apply_status("kitchen", "light1", true).unwrap();
        assert_eq!(c.panel().lines(), ("Status:", "ON"));
    }

    #[test]
    fn unchanged_screen_is_not_redrawn() {
        let mut c = awake("kitchen");
        let flushes = c.matrix().flush_count;
        c.refresh().unwrap();
        assert_eq!(c.matrix().flush_count, flushes);
        c.render().unwrap();
        assert_eq!(c.matrix().flush_count, flushes + 1);
    }

    #[test]
    fn matrix_failure_surfaces() {
        let mut c = awake("kitchen,bath");
        c.matrix_mut().fail = true;
        let err = c
            .apply_events(InputEvents::rotate(Rotation::Next), 10)
            .unwrap_err();
        assert_eq!(err, HardwareError::Matrix(()));
    }

    #[test]
    fn custom_layout_limits_cells() {
        let layout = CellLayout::new(&[(0, 1), (2, 3)], [0, 1, 2]);
        let mut c = controller().with_layout(layout);
        c.load_feed("kitchen").unwrap();
        c.apply_events(InputEvents::proximity(), 0).unwrap();
        assert!(c.matrix().visible.iter().all(|&(_, col)| col <= 3));
        assert_eq!(c.matrix().cells(c.layout(), 2)[1], lookup('i').unwrap());
    }

    #[test]
    fn raw_tick_decodes_inputs() {
        let mut c = controller();
        c.load_feed("kitchen").unwrap();
        let idle = RawInputs {
            clk: true,
            dt: true,
            ..RawInputs::default()
        };
        c.tick(idle, 0).unwrap();
        c.tick(RawInputs { enter: true, ..idle }, 20).unwrap();
        assert_eq!(c.panel().lines(), ("Welcome", "User"));
        let cells = c.matrix().cells(c.layout(), 11);
        assert_eq!(cells[0], lookup('w').unwrap());
        assert_eq!(cells[7], lookup('u').unwrap());
    }
}

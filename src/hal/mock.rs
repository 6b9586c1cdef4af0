//! Mock implementations for testing without hardware.
//!
//! Test doubles for every hardware and network trait, so the full controller
//! loop runs on desktop. State is kept in public fields for inspection.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockInputs`] | [`InputPins`] | Settable pin levels |
//! | [`MockTone`] | [`ToneOutput`] | Records started tones |
//! | [`MockMatrix`] | [`DotMatrix`] | Framebuffer with flush tracking |
//! | [`MockPanel`] | [`TextPanel`] | Records shown lines |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockMqtt`] | [`MqttClient`] | Captures pub/sub operations |
//!
//! # Example
//!
//! ```rust
//! use rs_braille::hal::{MockMatrix, MockPanel, MockTone};
//! use rs_braille::BrailleController;
//! use rs_braille::config::Config;
//!
//! let mut controller = BrailleController::new(
//!     MockMatrix::new(),
//!     MockPanel::new(),
//!     MockTone::new(),
//!     &Config::default(),
//! );
//! controller.init(0).unwrap();
//! assert!(controller.panel().initialized);
//! ```
//!
//! [`InputPins`]: crate::traits::InputPins
//! [`ToneOutput`]: crate::traits::ToneOutput
//! [`DotMatrix`]: crate::traits::DotMatrix
//! [`TextPanel`]: crate::traits::TextPanel
//! [`Clock`]: crate::traits::Clock
//! [`MqttClient`]: crate::traits::MqttClient

extern crate alloc;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::braille::Cell;
use crate::input::RawInputs;
use crate::layout::CellLayout;
use crate::traits::{Clock, DotMatrix, InputPins, MqttClient, MqttMessage, TextPanel, ToneOutput};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock input pins.
///
/// Set [`levels`](Self::levels) before each read. Encoder lines start high,
/// as they idle with pull-ups.
#[derive(Debug)]
pub struct MockInputs {
    /// Levels returned by the next read.
    pub levels: RawInputs,
    /// Number of reads.
    pub reads: usize,
}

impl MockInputs {
    /// Creates idle inputs.
    pub fn new() -> Self {
        Self {
            levels: RawInputs {
                clk: true,
                dt: true,
                ..RawInputs::default()
            },
            reads: 0,
        }
    }
}

impl Default for MockInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPins for MockInputs {
    type Error = ();

    fn read(&mut self) -> Result<RawInputs, ()> {
        self.reads += 1;
        Ok(self.levels)
    }
}

/// Mock buzzer.
///
/// # Example
///
/// ```rust
/// use rs_braille::hal::MockTone;
/// use rs_braille::traits::ToneOutput;
///
/// let mut buzzer = MockTone::new();
/// buzzer.start(440).unwrap();
/// buzzer.stop().unwrap();
///
/// assert_eq!(buzzer.history, [440]);
/// assert_eq!(buzzer.frequency_hz, None);
/// ```
#[derive(Debug, Default)]
pub struct MockTone {
    /// Frequency currently sounding.
    pub frequency_hz: Option<u32>,
    /// Every started frequency, oldest first.
    pub history: Vec<u32>,
    /// Number of `stop` calls.
    pub stop_count: usize,
}

impl MockTone {
    /// Creates a silent buzzer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToneOutput for MockTone {
    type Error = ();

    fn start(&mut self, frequency_hz: u32) -> Result<(), ()> {
        self.frequency_hz = Some(frequency_hz);
        self.history.push(frequency_hz);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ()> {
        self.frequency_hz = None;
        self.stop_count += 1;
        Ok(())
    }
}

/// Mock time source for testing.
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances time.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Display Mocks
// ============================================================================

/// Mock dot matrix.
///
/// `set_point` writes a pending frame; `flush` copies it to
/// [`visible`](Self::visible). Setting [`fail`](Self::fail) makes every call error.
#[derive(Debug, Default)]
pub struct MockMatrix {
    pending: BTreeSet<(u8, u8)>,
    /// Raised `(row, column)` points after the last flush.
    pub visible: BTreeSet<(u8, u8)>,
    /// Number of `flush` calls.
    pub flush_count: usize,
    /// Number of `clear` calls.
    pub clear_count: usize,
    /// Simulate a bus failure.
    pub fail: bool,
}

impl MockMatrix {
    /// Creates a blank matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the point is raised in the visible frame.
    pub fn is_lit(&self, row: u8, column: u8) -> bool {
        self.visible.contains(&(row, column))
    }

    /// Reads back the visible cell at `index` through `layout`.
    pub fn cell_at(&self, layout: &CellLayout, index: usize) -> Option<Cell> {
        let cols = layout.columns(index)?;
        let rows = layout.rows();
        let mut bits = 0u8;
        for (i, &row) in rows.iter().enumerate() {
            if self.is_lit(row, cols.left) {
                bits |= 1 << i;
            }
            if self.is_lit(row, cols.right) {
                bits |= 1 << (i + 3);
            }
        }
        Some(Cell::from_bits(bits))
    }

    /// Reads back the first `count` visible cells.
    pub fn cells(&self, layout: &CellLayout, count: usize) -> Vec<Cell> {
        (0..count).filter_map(|i| self.cell_at(layout, i)).collect()
    }
}

impl DotMatrix for MockMatrix {
    type Error = ();

    fn clear(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.pending.clear();
        self.clear_count += 1;
        Ok(())
    }

    fn set_point(&mut self, row: u8, column: u8, on: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        if on {
            self.pending.insert((row, column));
        } else {
            self.pending.remove(&(row, column));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.visible = self.pending.clone();
        self.flush_count += 1;
        Ok(())
    }
}

/// Mock two-line text panel.
#[derive(Debug, Default)]
pub struct MockPanel {
    /// Current line 1.
    pub line1: String,
    /// Current line 2.
    pub line2: String,
    /// Whether `init` was called.
    pub initialized: bool,
    /// Number of `show` calls.
    pub show_count: usize,
}

impl MockPanel {
    /// Creates an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both lines as a tuple.
    pub fn lines(&self) -> (&str, &str) {
        (&self.line1, &self.line2)
    }
}

impl TextPanel for MockPanel {
    type Error = ();

    fn init(&mut self) -> Result<(), ()> {
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ()> {
        self.line1.clear();
        self.line2.clear();
        Ok(())
    }

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
        self.line1 = line1.into();
        self.line2 = line2.into();
        self.show_count += 1;
        Ok(())
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock MQTT client for testing.
///
/// Captures published messages and subscriptions. Queue incoming messages
/// with [`queue_message`](Self::queue_message).
#[derive(Debug, Default)]
pub struct MockMqtt {
    /// Published messages: `(topic, payload, retain)`.
    pub published: Vec<(String, Vec<u8>, bool)>,
    /// Subscribed topics, in order.
    pub subscriptions: Vec<String>,
    /// Queued incoming messages.
    pub incoming: Vec<MqttMessage>,
    /// Connection state.
    pub connected: bool,
}

impl MockMqtt {
    /// Creates a connected mock client.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Queues an incoming message.
    pub fn queue_message(&mut self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.incoming.push(MqttMessage::new(topic, payload));
    }

    /// True if `topic` was subscribed at least once.
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.iter().any(|t| t == topic)
    }

    /// Payloads published to `topic`, oldest first.
    pub fn published_to(&self, topic: &str) -> Vec<&[u8]> {
        self.published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, p, _)| p.as_slice())
            .collect()
    }
}

impl MqttClient for MockMqtt {
    type Error = ();

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.published.push((topic.into(), payload.to_vec(), retain));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        if self.incoming.is_empty() {
            None
        } else {
            Some(self.incoming.remove(0))
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ============================================================================
// Tests
// ============================================================================

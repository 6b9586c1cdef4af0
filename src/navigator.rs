//! Navigation state machine.
//!
//! [`Navigator`] owns the menu, the device state cache and the activity clock.
//! It is hardware-free: [`Navigator::handle`] takes decoded input events and a
//! timestamp and returns a [`Step`] saying whether to redraw and which side
//! effects (tones, outbound messages) to perform. [`Navigator::screen`] then
//! describes what the matrix and the text panel should show.
//!
//! # States
//!
//! ```text
//!             select (has devices)        select
//!  RoomsMenu ─────────────────────▶ DeviceMenu ──────▶ ViewingStatus
//!      ▲  ◀──────────── back ─────────┘  ▲                 │
//!      └──────────────── back ───────────┼─────────────────┤
//!                                        └─ select(toggle) ┘
//!                                           or rotation
//! ```
//!
//! Any state falls asleep after the active window; the next qualifying input
//! wakes it back into the state it was in. The waking input is not otherwise
//! acted on.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::config::NavigationConfig;
//! use rs_braille::input::{InputEvents, Rotation};
//! use rs_braille::navigator::{Navigator, NavState, Screen};
//!
//! let mut nav = Navigator::new(&NavigationConfig::default());
//! nav.load_feed("kitchen-light1;light2,bath");
//!
//! // First press wakes the device and shows the welcome screen.
//! nav.handle(InputEvents::select(), 0);
//! assert_eq!(nav.screen(), Screen::Welcome);
//!
//! // The welcome screen expires and the room list is shown.
//! nav.handle(InputEvents::default(), 2_000);
//! assert_eq!(nav.screen(), Screen::Room("kitchen".into()));
//!
//! nav.handle(InputEvents::rotate(Rotation::Next), 2_100);
//! assert_eq!(nav.screen(), Screen::Room("bath".into()));
//! assert_eq!(nav.state(), NavState::RoomsMenu);
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{debug, info};

use crate::activity::ActivityClock;
use crate::config::NavigationConfig;
use crate::input::InputEvents;
use crate::menu::{Menu, MenuMode};
use crate::status::{device_key, DeviceStates};
use crate::tone::Tone;

/// Navigation state, derived from the menu mode and the activity clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavState {
    /// Idle window elapsed; displays are blank.
    Sleeping,
    /// Browsing rooms.
    RoomsMenu,
    /// Browsing the devices of one room.
    DeviceMenu,
    /// Showing the cached on/off state of one device.
    ViewingStatus,
}

/// What the displays should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Nothing (asleep since boot).
    Blank,
    /// Shown when falling asleep.
    Goodbye,
    /// Shown once per wake by a deliberate input.
    Welcome,
    /// Menu not received yet.
    Waiting,
    /// Menu received but empty.
    NoRooms,
    /// Highlighted room.
    Room(String),
    /// Highlighted device.
    Device(String),
    /// Cached state of the highlighted device.
    Status {
        /// Device name.
        device: String,
        /// Cached state.
        on: bool,
    },
}

impl Screen {
    /// Text for the braille matrix.
    pub fn braille_text(&self) -> &str {
        match self {
            Screen::Blank | Screen::Goodbye => "",
            Screen::Welcome => "welcome User",
            Screen::Waiting => "wait",
            Screen::NoRooms => "empty",
            Screen::Room(label) | Screen::Device(label) => label,
            Screen::Status { on: true, .. } => "on",
            Screen::Status { on: false, .. } => "off",
        }
    }

    /// Two lines for the text panel.
    pub fn panel_lines(&self) -> (&str, &str) {
        match self {
            Screen::Blank => ("", ""),
            Screen::Goodbye => ("Goodbye", "User"),
            Screen::Welcome => ("Welcome", "User"),
            Screen::Waiting => ("Waiting for", "menu..."),
            Screen::NoRooms => ("No rooms", ""),
            Screen::Room(label) => ("Selected:", room_part(label)),
            Screen::Device(label) => ("Device:", label),
            Screen::Status { on: true, .. } => ("Status:", "ON"),
            Screen::Status { on: false, .. } => ("Status:", "OFF"),
        }
    }
}

fn room_part(label: &str) -> &str {
    label
        .split_once(crate::braille::ROOM_DEVICE_SEPARATOR)
        .map_or(label, |(room, _)| room)
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Play a feedback tone.
    Tone(Tone),
    /// Send a toggle command for a device.
    Toggle {
        /// Room label.
        room: String,
        /// Device name.
        device: String,
    },
    /// Ask a device to report its state.
    RequestStatus {
        /// Room label.
        room: String,
        /// Device name.
        device: String,
    },
}

/// Result of one [`Navigator::handle`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// The screen changed and should be redrawn.
    pub redraw: bool,
    /// Effects in the order they should be performed.
    pub effects: Vec<Effect>,
}

impl Step {
    fn tone(&mut self, tone: Tone) {
        self.effects.push(Effect::Tone(tone));
    }

    /// Tones requested by this step.
    pub fn tones(&self) -> impl Iterator<Item = Tone> + '_ {
        self.effects.iter().filter_map(|e| match e {
            Effect::Tone(t) => Some(*t),
            _ => None,
        })
    }
}

/// Menu context plus navigation state.
#[derive(Clone, Debug)]
pub struct Navigator {
    menu: Menu,
    states: DeviceStates,
    activity: ActivityClock,
    welcome_ms: u64,
    welcome_until: Option<u64>,
    /// `room/device` key while the status view is open.
    viewing: Option<String>,
    menu_ready: bool,
    said_goodbye: bool,
}

impl Navigator {
    /// Creates a sleeping navigator with an empty, not-yet-ready menu.
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            menu: Menu::new(config.max_rooms),
            states: DeviceStates::new(),
            activity: ActivityClock::new(config.active_window_ms),
            welcome_ms: config.welcome_ms,
            welcome_until: None,
            viewing: None,
            menu_ready: false,
            said_goodbye: false,
        }
    }

    // =========================================================================
    // Feed updates
    // =========================================================================

    /// Rebuilds the menu from a feed payload and marks it ready.
    ///
    /// Cached device states are kept. Device mode survives only if the
    /// cursor still sits on the same room, and the status view only if it
    /// still shows the same device; otherwise the view steps back. Returns
    /// whether the display should be redrawn.
    pub fn load_feed(&mut self, payload: &str) -> bool {
        let room_before = self.menu.active_room().map(|r| r.label().to_string());
        self.menu.load(payload);
        self.menu_ready = true;

        if self.menu.mode() == MenuMode::Devices
            && self.menu.active_room().map(|r| r.label()) != room_before.as_deref()
        {
            debug!("active room moved by reload, back to rooms");
            self.menu.leave_devices();
        }
        if self.viewing.is_some() && self.viewing_key() != self.viewing {
            debug!("viewed device moved by reload, closing status");
            self.viewing = None;
        }
        !self.activity.is_sleeping()
    }

    /// Applies an authoritative status report. Returns whether it is visible.
    pub fn apply_status(&mut self, room: &str, device: &str, on: bool) -> bool {
        let key = device_key(room, device);
        self.states.set(&key, on);
        self.state() == NavState::ViewingStatus
            && self.viewing_key().as_deref() == Some(key.as_str())
    }

    /// True once any feed payload has been loaded.
    #[inline]
    pub fn is_menu_ready(&self) -> bool {
        self.menu_ready
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Processes one tick of input at `now_ms`.
    ///
    /// Wake handling comes first and consumes the event. The idle check only
    /// runs when no qualifying event arrived in this tick.
    pub fn handle(&mut self, events: InputEvents, now_ms: u64) -> Step {
        let mut step = Step::default();

        if let Some(until) = self.welcome_until {
            if now_ms >= until {
                self.welcome_until = None;
                step.redraw = true;
            }
        }

        if !events.is_qualifying() {
            if self.activity.check_idle(now_ms) {
                info!("idle for {} ms, sleeping", self.activity.active_window());
                self.welcome_until = None;
                self.said_goodbye = true;
                step.redraw = true;
            }
            return step;
        }

        if self.activity.touch(now_ms) {
            info!("waking up");
            if events.is_user_action() {
                self.welcome_until = Some(now_ms + self.welcome_ms);
            }
            step.redraw = true;
            return step;
        }

        if !self.menu_ready || !events.is_user_action() {
            return step;
        }

        if self.welcome_until.take().is_some() {
            step.redraw = true;
        }

        if let Some(rotation) = events.rotation {
            self.on_rotate(rotation.is_forward(), &mut step);
        }
        if events.select {
            self.on_select(&mut step);
        }
        if events.back {
            self.on_back(&mut step);
        }

        step
    }

    fn on_rotate(&mut self, forward: bool, step: &mut Step) {
        self.viewing = None;
        match self.menu.rotate(forward) {
            Ok(()) => {
                debug!("cursor -> {:?}", self.menu.active_label());
                step.tone(if forward { Tone::Next } else { Tone::Prev });
                step.redraw = true;
            }
            Err(why) => {
                debug!("rotation rejected: {:?}", why);
                step.tone(Tone::Reject);
            }
        }
    }

    fn on_select(&mut self, step: &mut Step) {
        match self.state() {
            NavState::RoomsMenu => match self.menu.enter_devices() {
                Ok(()) => {
                    if let Some(room) = self.menu.active_room() {
                        let label = room.label().to_string();
                        let devices: Vec<&str> = room.devices().iter().map(String::as_str).collect();
                        self.states.ensure_room(&label, devices);
                        debug!("entered {}", label);
                    }
                    step.tone(Tone::Select);
                    step.redraw = true;
                }
                Err(why) => {
                    debug!("select rejected: {:?}", why);
                    step.tone(Tone::Reject);
                }
            },
            NavState::DeviceMenu => {
                if let Some((room, device)) = self.active_pair() {
                    self.viewing = Some(device_key(&room, &device));
                    step.effects.push(Effect::RequestStatus { room, device });
                    step.tone(Tone::Select);
                    step.redraw = true;
                }
            }
            NavState::ViewingStatus => {
                // Only toggle what the user is looking at
                let pair = self.active_pair().filter(|(r, d)| {
                    self.viewing.as_deref() == Some(device_key(r, d).as_str())
                });
                if let Some((room, device)) = pair {
                    let now_on = self.states.toggle_optimistic(&device_key(&room, &device));
                    info!("toggle {}/{} -> {}", room, device, if now_on { "ON" } else { "OFF" });
                    step.effects.push(Effect::Toggle { room, device });
                    step.tone(Tone::Confirm);
                }
                self.viewing = None;
                step.redraw = true;
            }
            NavState::Sleeping => {}
        }
    }

    fn on_back(&mut self, step: &mut Step) {
        if self.menu.mode() == MenuMode::Devices {
            self.menu.leave_devices();
            self.viewing = None;
            step.tone(Tone::Back);
            step.redraw = true;
        }
    }

    fn active_pair(&self) -> Option<(String, String)> {
        let room = self.menu.active_room()?.label().to_string();
        let device = self.menu.active_device()?.to_string();
        Some((room, device))
    }

    fn viewing_key(&self) -> Option<String> {
        self.active_pair().map(|(r, d)| device_key(&r, &d))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current state.
    pub fn state(&self) -> NavState {
        if self.activity.is_sleeping() {
            return NavState::Sleeping;
        }
        match self.menu.mode() {
            MenuMode::Rooms => NavState::RoomsMenu,
            MenuMode::Devices if self.viewing.is_some() => NavState::ViewingStatus,
            MenuMode::Devices => NavState::DeviceMenu,
        }
    }

    /// What the displays should show right now.
    pub fn screen(&self) -> Screen {
        if self.activity.is_sleeping() {
            return if self.said_goodbye {
                Screen::Goodbye
            } else {
                Screen::Blank
            };
        }
        if self.welcome_until.is_some() {
            return Screen::Welcome;
        }
        if !self.menu_ready {
            return Screen::Waiting;
        }
        match self.state() {
            NavState::RoomsMenu => self
                .menu
                .active_room()
                .map_or(Screen::NoRooms, |r| Screen::Room(r.label().to_string())),
            NavState::DeviceMenu => self
                .menu
                .active_device()
                .map_or(Screen::NoRooms, |d| Screen::Device(d.to_string())),
            NavState::ViewingStatus => match self.active_pair() {
                Some((room, device)) => {
                    let on = self.states.get(&device_key(&room, &device));
                    Screen::Status { device, on }
                }
                None => Screen::NoRooms,
            },
            NavState::Sleeping => Screen::Blank,
        }
    }

    /// The menu.
    #[inline]
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Mutable menu access for add/remove operations.
    #[inline]
    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    /// The device state cache.
    #[inline]
    pub fn states(&self) -> &DeviceStates {
        &self.states
    }

    /// The activity clock.
    #[inline]
    pub fn activity(&self) -> &ActivityClock {
        &self.activity
    }
}

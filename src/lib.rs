//! # rs-braille
//!
//! A refreshable braille menu for MQTT home automation. Rooms and devices
//! arrive over MQTT, the user walks them with a rotary encoder and buttons,
//! and the current entry is raised on a chain of LED dot-matrix modules as
//! Grade 1 braille, mirrored in plain text on a small OLED panel.
//!
//! ## Features
//!
//! - **Braille encoding**: Letters, digits and `-` mapped to six-dot cells
//! - **Menu navigation**: Rooms, then devices, then a device's live status
//! - **Device control**: Toggle commands and status checks over MQTT
//! - **Power saving**: Sleep after an idle window, wake on input or proximity
//! - **Audio feedback**: Distinct buzzer tones per action
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and network abstractions
//! - `braille`, `layout` - Cell encoding and projection onto the dot matrix
//! - `menu`, `status` - Room/device model and cached device states
//! - `input`, `activity`, `tone` - Encoder decoding, idle tracking, buzzer timing
//! - `navigator` - The menu state machine
//! - `controller` - Ties the navigator to the display and buzzer
//! - `services` - MQTT feed handling (std only)
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_braille::{
//!     BrailleController, Config, InputEvents, NavState,
//!     hal::{MockMatrix, MockPanel, MockTone},
//! };
//!
//! let config = Config::default();
//! let mut controller =
//!     BrailleController::new(MockMatrix::new(), MockPanel::new(), MockTone::new(), &config);
//! controller.init(0).unwrap();
//! controller.load_feed("kitchen-light1;light2,bath").unwrap();
//!
//! // Proximity wakes the controller without a welcome screen
//! controller.apply_events(InputEvents::proximity(), 10).unwrap();
//! assert_eq!(controller.navigator().state(), NavState::RoomsMenu);
//! assert_eq!(controller.panel().lines(), ("Selected:", "kitchen"));
//!
//! // Select enters the device list
//! controller.apply_events(InputEvents::select(), 20).unwrap();
//! assert_eq!(controller.navigator().state(), NavState::DeviceMenu);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Idle tracking and sleep/wake transitions.
pub mod activity;
/// Grade 1 braille cell table and text encoding.
pub mod braille;
/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Main controller that drives the display and buzzer from the navigator.
pub mod controller;
/// MQTT topic classification and payload formats.
pub mod feed;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Encoder and button decoding.
pub mod input;
/// Projection of braille cells onto the LED matrix chain.
pub mod layout;
/// Room and device menu model.
pub mod menu;
/// Menu state machine.
pub mod navigator;
/// Cached on/off state per device.
pub mod status;
/// Buzzer feedback tones.
pub mod tone;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Network services for the MQTT feed (std only).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use activity::ActivityClock;
pub use braille::{encode, Cell, Cells};
pub use controller::{BrailleController, ControllerError, HardwareError};
pub use input::{InputDecoder, InputEvents, RawInputs, Rotation};
pub use layout::{project, CellLayout, DotWrite};
pub use menu::{Menu, MenuMode, MenuRejection, Room};
pub use navigator::{Effect, NavState, Navigator, Screen, Step};
pub use status::DeviceStates;
pub use tone::{Tone, ToneScheduler};
pub use traits::{
    // Hardware
    Clock,
    // Display
    DotMatrix,
    InputPins,
    // Network
    MqttClient,
    MqttMessage,
    TextPanel,
    ToneOutput,
};

// Config re-exports
pub use config::{Config, FeedConfig, MqttConfig, NavigationConfig, WifiConfig};

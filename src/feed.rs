//! Broker message formats.
//!
//! | Direction | Topic | Payload |
//! |-----------|-------|---------|
//! | out | request topic | empty |
//! | in  | response topic | `room-dev1;dev2,room2,...` |
//! | in  | `<room>/<device>_status` | `ON` / `OFF` (any case) |
//! | out | `<room>/<device>_status` | `check` |
//! | out | control topic | `<room>,<device>,toggle` |

use alloc::format;
use alloc::string::String;

use log::{debug, warn};

use crate::config::FeedConfig;

/// Payload asking a device to report its state.
pub const STATUS_CHECK: &str = "check";

/// Action word in control messages.
pub const TOGGLE_ACTION: &str = "toggle";

/// A classified inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// New room/device list.
    MenuList(&'a str),
    /// Authoritative device state.
    Status {
        /// Room label.
        room: &'a str,
        /// Device name.
        device: &'a str,
        /// Reported state.
        on: bool,
    },
    /// Not for us, or unparseable.
    Ignored,
}

/// Sorts an inbound message by topic.
///
/// ```rust
/// use rs_braille::config::FeedConfig;
/// use rs_braille::feed::{classify, Inbound};
///
/// let feed = FeedConfig::default();
/// assert_eq!(
///     classify(&feed, "kitchen/doorlock_status", "on"),
///     Inbound::Status { room: "kitchen", device: "doorlock", on: true }
/// );
/// assert_eq!(classify(&feed, "deviceList/response", "bath"), Inbound::MenuList("bath"));
/// ```
pub fn classify<'a>(config: &FeedConfig, topic: &'a str, payload: &'a str) -> Inbound<'a> {
    if topic == config.response_topic.as_str() {
        return Inbound::MenuList(payload);
    }

    let Some((room, device)) = split_status_topic(topic, config.status_suffix.as_str()) else {
        debug!("ignoring message on {}", topic);
        return Inbound::Ignored;
    };

    match parse_state(payload) {
        Some(on) => Inbound::Status { room, device, on },
        None => {
            if !payload.trim().eq_ignore_ascii_case(STATUS_CHECK) {
                warn!("unrecognised status '{}' on {}", payload, topic);
            }
            Inbound::Ignored
        }
    }
}

/// Splits `<room>/<device><suffix>` into its parts.
pub fn split_status_topic<'a>(topic: &'a str, suffix: &str) -> Option<(&'a str, &'a str)> {
    if suffix.is_empty() {
        return None;
    }
    let stem = topic.strip_suffix(suffix)?;
    let (room, device) = stem.split_once('/')?;
    if room.is_empty() || device.is_empty() || device.contains('/') {
        return None;
    }
    Some((room, device))
}

/// Parses `ON`/`OFF`, ignoring case and surrounding whitespace.
pub fn parse_state(payload: &str) -> Option<bool> {
    let payload = payload.trim();
    if payload.eq_ignore_ascii_case("on") {
        Some(true)
    } else if payload.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}

/// Builds the outbound toggle payload.
pub fn control_payload(room: &str, device: &str) -> String {
    format!("{},{},{}", room, device, TOGGLE_ACTION)
}

//! Two-level room/device menu built from the broker feed.
//!
//! The feed payload is a comma-separated list of room entries. Each entry is
//! either a bare room label or `label-device1;device2;...`:
//!
//! ```text
//! kitchen-light1;light2,bath,bedroom-lamp
//! ```
//!
//! The menu also owns the navigation cursors. Cursors wrap around rather than
//! clamp, and device mode can only be entered for a room with devices.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::menu::{Menu, MenuMode};
//!
//! let mut menu = Menu::new(10);
//! menu.load("kitchen-light1;light2,bath");
//!
//! assert_eq!(menu.len(), 2);
//! assert_eq!(menu.devices_of(0), ["light1", "light2"]);
//! assert!(menu.devices_of(1).is_empty());
//!
//! menu.prev_room(); // wraps to the last room
//! assert_eq!(menu.cursor_room(), 1);
//! assert!(menu.enter_devices().is_err()); // bath has no devices
//! assert_eq!(menu.mode(), MenuMode::Rooms);
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::braille::ROOM_DEVICE_SEPARATOR;

/// Default room capacity.
pub const DEFAULT_MAX_ROOMS: usize = 10;

/// Separates room entries in the feed payload.
pub const FEED_DELIMITER: char = ',';

/// Separates devices inside a room entry.
pub const DEVICE_DELIMITER: char = ';';

/// One room and its devices, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    label: String,
    devices: Vec<String>,
}

impl Room {
    /// Creates a room without devices.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            devices: Vec::new(),
        }
    }

    /// Parses one feed entry. Returns `None` when the entry or its label is empty.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }

        let (label, devices) = match entry.split_once(ROOM_DEVICE_SEPARATOR) {
            Some((label, list)) => (label.trim(), parse_devices(list)),
            None => (entry, Vec::new()),
        };

        if label.is_empty() || label.contains(DEVICE_DELIMITER) {
            return None;
        }

        Some(Self {
            label: label.to_string(),
            devices,
        })
    }

    /// Room label (the part before `-`).
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Devices in display order.
    #[inline]
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// True when the room has at least one device.
    #[inline]
    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }

    /// Serializes back to the feed entry form.
    pub fn encode(&self) -> String {
        let mut out = self.label.clone();
        if self.has_devices() {
            out.push(ROOM_DEVICE_SEPARATOR);
            for (i, device) in self.devices.iter().enumerate() {
                if i > 0 {
                    out.push(DEVICE_DELIMITER);
                }
                out.push_str(device);
            }
        }
        out
    }
}

fn parse_devices(list: &str) -> Vec<String> {
    list.split(DEVICE_DELIMITER)
        .map(str::trim)
        .filter(|d| is_valid_device_name(d))
        .map(ToString::to_string)
        .collect()
}

fn is_valid_device_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(ROOM_DEVICE_SEPARATOR)
        && !name.contains(FEED_DELIMITER)
        && !name.contains(DEVICE_DELIMITER)
}

fn is_valid_room_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(ROOM_DEVICE_SEPARATOR)
        && !name.contains(FEED_DELIMITER)
        && !name.contains(DEVICE_DELIMITER)
}

/// Which level of the menu the cursor is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MenuMode {
    /// Browsing rooms.
    #[default]
    Rooms,
    /// Browsing the devices of the active room.
    Devices,
}

/// Why a menu operation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuRejection {
    /// The menu has no rooms.
    Empty,
    /// The active room has no devices.
    NoDevices,
}

/// Room list plus cursors.
#[derive(Clone, Debug)]
pub struct Menu {
    rooms: Vec<Room>,
    capacity: usize,
    cursor_room: usize,
    cursor_device: usize,
    mode: MenuMode,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROOMS)
    }
}

impl Menu {
    /// Creates an empty menu holding at most `capacity` rooms.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Vec::new(),
            capacity,
            cursor_room: 0,
            cursor_device: 0,
            mode: MenuMode::Rooms,
        }
    }

    // =========================================================================
    // Feed
    // =========================================================================

    /// Replaces the room list with the parsed `feed`.
    ///
    /// Empty or malformed entries are dropped, as are entries past capacity.
    /// Never fails; the worst case is an empty menu. Cursors that no longer
    /// point at a valid room/device are reset.
    pub fn load(&mut self, feed: &str) {
        let mut rooms = Vec::new();

        for entry in feed.split(FEED_DELIMITER) {
            match Room::parse(entry) {
                Some(room) if rooms.len() < self.capacity => rooms.push(room),
                Some(room) => warn!("menu full, dropping room '{}'", room.label()),
                None if !entry.trim().is_empty() => warn!("dropping malformed entry '{}'", entry),
                None => {}
            }
        }

        self.rooms = rooms;
        self.fix_cursors();
        info!("menu loaded with {} rooms", self.rooms.len());
    }

    /// Serializes the whole menu back to feed form.
    pub fn to_feed(&self) -> String {
        let mut out = String::new();
        for (i, room) in self.rooms.iter().enumerate() {
            if i > 0 {
                out.push(FEED_DELIMITER);
            }
            out.push_str(&room.encode());
        }
        out
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Number of rooms.
    #[inline]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when the menu has no rooms.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Maximum number of rooms.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All rooms in display order.
    #[inline]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Room at `index`.
    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    /// Serialized entry of the room at `index`.
    pub fn entry(&self, index: usize) -> Option<String> {
        self.rooms.get(index).map(Room::encode)
    }

    /// Devices of the room at `index`; empty when out of range or device-less.
    pub fn devices_of(&self, index: usize) -> &[String] {
        self.rooms.get(index).map(Room::devices).unwrap_or(&[])
    }

    /// Finds a room by label, or by its full serialized entry.
    pub fn find_room_index(&self, name: &str) -> Option<usize> {
        self.rooms
            .iter()
            .position(|r| r.label == name || r.encode() == name)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Appends a room without devices.
    ///
    /// Refused (logged, no change) when at capacity, when the name is not a
    /// valid label, or when the room already exists. Returns whether it was added.
    pub fn add_room(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.rooms.len() >= self.capacity {
            warn!("cannot add room '{}': menu full ({})", name, self.capacity);
            return false;
        }
        if !is_valid_room_name(name) {
            warn!("cannot add room '{}': invalid name", name);
            return false;
        }
        if self.find_room_index(name).is_some() {
            debug!("room '{}' already present", name);
            return false;
        }
        self.rooms.push(Room::new(name));
        info!("room added: {}", name);
        true
    }

    /// Removes a room. Unknown rooms are ignored.
    pub fn remove_room(&mut self, name: &str) -> bool {
        let Some(idx) = self.find_room_index(name) else {
            return false;
        };
        self.rooms.remove(idx);
        if self.cursor_room > idx {
            self.cursor_room -= 1;
        } else if self.cursor_room == idx {
            self.cursor_device = 0;
            self.mode = MenuMode::Rooms;
        }
        self.fix_cursors();
        info!("room deleted: {}", name);
        true
    }

    /// Appends a device to a room. Unknown rooms, invalid names and
    /// duplicates are ignored. Returns whether it was added.
    pub fn add_device(&mut self, room: &str, device: &str) -> bool {
        let device = device.trim();
        if !is_valid_device_name(device) {
            warn!("cannot add device '{}': invalid name", device);
            return false;
        }
        let Some(idx) = self.find_room_index(room) else {
            return false;
        };
        let entry = &mut self.rooms[idx];
        if entry.devices.iter().any(|d| d == device) {
            return false;
        }
        entry.devices.push(device.to_string());
        info!("added device {} to {}", device, entry.label);
        true
    }

    /// Removes a device from a room. Unknown rooms/devices are ignored.
    pub fn remove_device(&mut self, room: &str, device: &str) -> bool {
        let Some(idx) = self.find_room_index(room) else {
            return false;
        };
        let entry = &mut self.rooms[idx];
        let before = entry.devices.len();
        entry.devices.retain(|d| d != device);
        if entry.devices.len() == before {
            return false;
        }
        info!("deleted device {} from {}", device, entry.label);
        self.fix_cursors();
        true
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    /// Current level.
    #[inline]
    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    /// Index of the highlighted room.
    #[inline]
    pub fn cursor_room(&self) -> usize {
        self.cursor_room
    }

    /// Index of the highlighted device (meaningful in device mode).
    #[inline]
    pub fn cursor_device(&self) -> usize {
        self.cursor_device
    }

    /// Highlighted room.
    pub fn active_room(&self) -> Option<&Room> {
        self.rooms.get(self.cursor_room)
    }

    /// Highlighted device, only in device mode.
    pub fn active_device(&self) -> Option<&str> {
        if self.mode != MenuMode::Devices {
            return None;
        }
        self.active_room()?
            .devices
            .get(self.cursor_device)
            .map(String::as_str)
    }

    /// Label of whatever the cursor is on.
    pub fn active_label(&self) -> Option<&str> {
        match self.mode {
            MenuMode::Rooms => self.active_room().map(Room::label),
            MenuMode::Devices => self.active_device(),
        }
    }

    /// Moves to the next room, wrapping past the end.
    pub fn next_room(&mut self) -> Result<(), MenuRejection> {
        self.cursor_room = step(self.cursor_room, self.rooms.len(), true)?;
        Ok(())
    }

    /// Moves to the previous room, wrapping before the start.
    pub fn prev_room(&mut self) -> Result<(), MenuRejection> {
        self.cursor_room = step(self.cursor_room, self.rooms.len(), false)?;
        Ok(())
    }

    /// Moves to the next device of the active room, wrapping.
    pub fn next_device(&mut self) -> Result<(), MenuRejection> {
        let count = self.devices_of(self.cursor_room).len();
        self.cursor_device = step(self.cursor_device, count, true)?;
        Ok(())
    }

    /// Moves to the previous device of the active room, wrapping.
    pub fn prev_device(&mut self) -> Result<(), MenuRejection> {
        let count = self.devices_of(self.cursor_room).len();
        self.cursor_device = step(self.cursor_device, count, false)?;
        Ok(())
    }

    /// Moves forward or back on the current level.
    pub fn rotate(&mut self, forward: bool) -> Result<(), MenuRejection> {
        match (self.mode, forward) {
            (MenuMode::Rooms, true) => self.next_room(),
            (MenuMode::Rooms, false) => self.prev_room(),
            (MenuMode::Devices, true) => self.next_device(),
            (MenuMode::Devices, false) => self.prev_device(),
        }
    }

    /// Switches to device mode with the first device highlighted.
    ///
    /// Rejected (mode unchanged) when the active room has no devices.
    pub fn enter_devices(&mut self) -> Result<(), MenuRejection> {
        let room = self.active_room().ok_or(MenuRejection::Empty)?;
        if !room.has_devices() {
            return Err(MenuRejection::NoDevices);
        }
        self.mode = MenuMode::Devices;
        self.cursor_device = 0;
        Ok(())
    }

    /// Returns to room mode and resets the device cursor.
    pub fn leave_devices(&mut self) {
        self.mode = MenuMode::Rooms;
        self.cursor_device = 0;
    }

    fn fix_cursors(&mut self) {
        if self.cursor_room >= self.rooms.len() {
            self.cursor_room = 0;
        }
        if self.mode == MenuMode::Devices {
            let count = self.devices_of(self.cursor_room).len();
            if count == 0 {
                self.leave_devices();
            } else if self.cursor_device >= count {
                self.cursor_device = 0;
            }
        }
    }
}

/// Wrapping step over `[0, len)`.
fn step(index: usize, len: usize, forward: bool) -> Result<usize, MenuRejection> {
    if len == 0 {
        return Err(MenuRejection::Empty);
    }
    let index = index.min(len - 1);
    Ok(if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    })
}

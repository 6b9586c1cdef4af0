//! Last-known on/off state per device.
//!
//! Keys are `room/device`. Inbound status messages are authoritative and
//! always overwrite; local toggles are optimistic and get corrected by the
//! next status message. Entries survive menu reloads.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use log::debug;

/// Builds the cache key for a device.
///
/// ```rust
/// assert_eq!(rs_braille::status::device_key("kitchen", "light1"), "kitchen/light1");
/// ```
pub fn device_key(room: &str, device: &str) -> String {
    format!("{}/{}", room, device)
}

/// Device state cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceStates {
    states: BTreeMap<String, bool>,
}

impl DeviceStates {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached state; `false` if never seen.
    pub fn get(&self, key: &str) -> bool {
        self.states.get(key).copied().unwrap_or(false)
    }

    /// True when the key has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// Authoritative update.
    pub fn set(&mut self, key: &str, on: bool) {
        debug!("status {} = {}", key, on);
        self.states.insert(String::from(key), on);
    }

    /// Creates `off` entries for devices seen for the first time.
    ///
    /// Existing entries are left alone. Returns how many were created.
    pub fn ensure_room<'a, I>(&mut self, room: &str, devices: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut created = 0;
        for device in devices {
            let key = device_key(room, device);
            if !self.states.contains_key(&key) {
                self.states.insert(key, false);
                created += 1;
            }
        }
        created
    }

    /// Flips the cached value and returns the new one.
    pub fn toggle_optimistic(&mut self, key: &str) -> bool {
        let next = !self.get(key);
        self.states.insert(String::from(key), next);
        next
    }

    /// Number of cached devices.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterates `(key, state)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

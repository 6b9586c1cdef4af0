//! Shared configuration for the ESP32 firmware and the desktop simulator.
//!
//! Uses `heapless::String` so the same types work without `std`. Every
//! section has defaults matching the stock hardware and broker topics, and
//! builder-style `with_*` setters.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::config::{Config, MqttConfig, NavigationConfig};
//!
//! let config = Config::default()
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_navigation(NavigationConfig::default().with_active_window_ms(30_000));
//!
//! assert_eq!(config.feed.request_topic.as_str(), "deviceList");
//! assert_eq!(config.navigation.max_cells, 13);
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (hostnames, topics)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (feed payloads, built topics)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Menu used when the broker never answers.
pub const DEFAULT_FALLBACK_FEED: &str = "bedroom-lights1;lights2,bathroom-gyser,kitchen-thermostats";

// ============================================================================
// Helpers for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let _ = hs.push_str(&s[..end]);
    hs
}

/// Create a ShortString from a &str, truncating at a char boundary if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating at a char boundary if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// MQTT client configuration
    pub mqtt: MqttConfig,
    /// Feed topics and fallback menu
    pub feed: FeedConfig,
    /// Timing and capacity of the navigator
    pub navigation: NavigationConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set MQTT configuration
    pub fn with_mqtt(mut self, mqtt: MqttConfig) -> Self {
        self.mqtt = mqtt;
        self
    }

    /// Set feed configuration
    pub fn with_feed(mut self, feed: FeedConfig) -> Self {
        self.feed = feed;
        self
    }

    /// Set navigation configuration
    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Parses a JSON document. Missing sections and fields keep their defaults.
    ///
    /// ```rust
    /// use rs_braille::config::Config;
    ///
    /// let config = Config::from_json_str(r#"{"mqtt": {"host": "broker.lan"}}"#).unwrap();
    /// assert_eq!(config.mqtt.host.as_str(), "broker.lan");
    /// assert_eq!(config.mqtt.port, 1883);
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// MQTT Config
// ============================================================================

/// MQTT client configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MqttConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Delay between reconnect attempts in milliseconds
    pub reconnect_delay_ms: u32,
    /// Whether MQTT is enabled
    pub enabled: bool,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("braille-controller"),
            username: ShortString::new(),
            password: ShortString::new(),
            keep_alive_secs: 30,
            reconnect_delay_ms: 5000,
            enabled: true,
        }
    }
}

impl MqttConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the keep-alive interval
    pub fn with_keep_alive_secs(mut self, secs: u16) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    /// Set the reconnect delay
    pub fn with_reconnect_delay_ms(mut self, ms: u32) -> Self {
        self.reconnect_delay_ms = ms;
        self
    }

    /// Enable or disable MQTT
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// Feed Config
// ============================================================================

/// Broker topics and the fallback menu
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    /// Topic the empty menu request is published on
    pub request_topic: ShortString,
    /// Topic carrying the room/device list
    pub response_topic: ShortString,
    /// Topic toggle commands are published on
    pub control_topic: ShortString,
    /// Suffix appended to `<room>/<device>` for status topics
    pub status_suffix: ShortString,
    /// Menu loaded if no response arrives in time (empty = never)
    pub fallback_feed: LongString,
    /// How long to wait for a response before using the fallback
    pub fallback_after_ms: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            request_topic: short_string("deviceList"),
            response_topic: short_string("deviceList/response"),
            control_topic: short_string("deviceControl"),
            status_suffix: short_string("_status"),
            fallback_feed: long_string(DEFAULT_FALLBACK_FEED),
            fallback_after_ms: 10_000,
        }
    }
}

impl FeedConfig {
    /// Set the request/response topic pair
    pub fn with_list_topics(mut self, request: &str, response: &str) -> Self {
        self.request_topic = short_string(request);
        self.response_topic = short_string(response);
        self
    }

    /// Set the control topic
    pub fn with_control_topic(mut self, topic: &str) -> Self {
        self.control_topic = short_string(topic);
        self
    }

    /// Set the status topic suffix
    pub fn with_status_suffix(mut self, suffix: &str) -> Self {
        self.status_suffix = short_string(suffix);
        self
    }

    /// Set the fallback menu (empty disables it)
    pub fn with_fallback_feed(mut self, feed: &str) -> Self {
        self.fallback_feed = long_string(feed);
        self
    }

    /// Set the fallback delay
    pub fn with_fallback_after_ms(mut self, ms: u32) -> Self {
        self.fallback_after_ms = ms;
        self
    }

    /// True when a fallback menu is configured
    pub fn has_fallback(&self) -> bool {
        !self.fallback_feed.is_empty()
    }

    /// Builds `<room>/<device><suffix>`, or `None` if it does not fit a
    /// [`LongString`].
    pub fn status_topic(&self, room: &str, device: &str) -> Option<LongString> {
        let mut topic = LongString::new();
        topic.push_str(room).ok()?;
        topic.push('/').ok()?;
        topic.push_str(device).ok()?;
        topic.push_str(self.status_suffix.as_str()).ok()?;
        Some(topic)
    }
}

// ============================================================================
// Navigation Config
// ============================================================================

/// Timing and capacity of the navigator
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationConfig {
    /// Idle time before sleeping
    pub active_window_ms: u64,
    /// Minimum spacing between accepted encoder steps
    pub debounce_ms: u64,
    /// How long the welcome screen is held after a wake
    pub welcome_ms: u64,
    /// Room capacity
    pub max_rooms: usize,
    /// Braille cells on the panel
    pub max_cells: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            active_window_ms: 10_000,
            debounce_ms: 100,
            welcome_ms: 2_000,
            max_rooms: 10,
            max_cells: 13,
        }
    }
}

impl NavigationConfig {
    /// Set the idle window
    pub fn with_active_window_ms(mut self, ms: u64) -> Self {
        self.active_window_ms = ms;
        self
    }

    /// Set the encoder debounce
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the welcome duration
    pub fn with_welcome_ms(mut self, ms: u64) -> Self {
        self.welcome_ms = ms;
        self
    }

    /// Set the room capacity
    pub fn with_max_rooms(mut self, rooms: usize) -> Self {
        self.max_rooms = rooms;
        self
    }

    /// Set the cell count, clamped to what the encoder supports
    pub fn with_max_cells(mut self, cells: usize) -> Self {
        self.max_cells = cells.min(crate::braille::MAX_CELLS);
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
    /// Whether WiFi is enabled
    pub enabled: bool,
    /// Maximum connection retry attempts (0 = unlimited)
    pub max_retries: u8,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            connect_timeout_ms: 30_000,
            enabled: true,
            max_retries: 5,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Enable or disable WiFi
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the maximum retry count
    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.navigation.active_window_ms, 10_000);
        assert_eq!(config.navigation.max_rooms, 10);
        assert_eq!(config.feed.response_topic.as_str(), "deviceList/response");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_mqtt(MqttConfig::default().with_host("broker.local").with_port(8883))
            .with_feed(FeedConfig::default().with_control_topic("home/control"));

        assert_eq!(config.mqtt.host.as_str(), "broker.local");
        assert_eq!(config.mqtt.port, 8883);
        assert_eq!(config.feed.control_topic.as_str(), "home/control");
    }

    // =========================================================================
    // MqttConfig Tests
    // =========================================================================

    #[test]
    fn mqtt_auth_detection() {
        assert!(!MqttConfig::default().has_auth());
        assert!(MqttConfig::default().with_auth("user", "pass").has_auth());
    }

    #[test]
    fn mqtt_config_full_builder() {
        let mqtt = MqttConfig::default()
            .with_client_id("panel-2")
            .with_keep_alive_secs(60)
            .with_reconnect_delay_ms(1000)
            .with_enabled(false);

        assert_eq!(mqtt.client_id.as_str(), "panel-2");
        assert_eq!(mqtt.keep_alive_secs, 60);
        assert_eq!(mqtt.reconnect_delay_ms, 1000);
        assert!(!mqtt.enabled);
    }

    // =========================================================================
    // FeedConfig Tests
    // =========================================================================

    #[test]
    fn status_topic_building() {
        let feed = FeedConfig::default();
        assert_eq!(
            feed.status_topic("kitchen", "doorlock").as_deref(),
            Some("kitchen/doorlock_status")
        );
    }

    #[test]
    fn status_topic_too_long_is_none() {
        let feed = FeedConfig::default();
        let room = "r".repeat(100);
        let device = "d".repeat(30);
        assert!(feed.status_topic(&room, &device).is_none());
        // Exactly at capacity still fits
        let device = "d".repeat(MAX_LONG_STRING - 100 - 1 - "_status".len());
        assert_eq!(
            feed.status_topic(&room, &device).map(|t| t.len()),
            Some(MAX_LONG_STRING)
        );
    }

    #[test]
    fn fallback_can_be_disabled() {
        assert!(FeedConfig::default().has_fallback());
        assert!(!FeedConfig::default().with_fallback_feed("").has_fallback());
    }

    #[test]
    fn default_fallback_fits() {
        assert_eq!(
            FeedConfig::default().fallback_feed.as_str(),
            DEFAULT_FALLBACK_FEED
        );
    }

    // =========================================================================
    // NavigationConfig Tests
    // =========================================================================

    #[test]
    fn navigation_builder() {
        let nav = NavigationConfig::default()
            .with_active_window_ms(5_000)
            .with_debounce_ms(50)
            .with_welcome_ms(0)
            .with_max_rooms(3)
            .with_max_cells(99);

        assert_eq!(nav.active_window_ms, 5_000);
        assert_eq!(nav.debounce_ms, 50);
        assert_eq!(nav.welcome_ms, 0);
        assert_eq!(nav.max_rooms, 3);
        assert_eq!(nav.max_cells, crate::braille::MAX_CELLS);
    }

    // =========================================================================
    // WifiConfig Tests
    // =========================================================================

    #[test]
    fn wifi_config_is_configured() {
        assert!(!WifiConfig::default().is_configured());
        assert!(WifiConfig::default().with_ssid("MyNetwork").is_configured());
        assert!(!WifiConfig::default().with_ssid("").is_configured());
    }

    #[test]
    fn wifi_config_builder() {
        let wifi = WifiConfig::default()
            .with_password("secret123")
            .with_connect_timeout_ms(15_000)
            .with_max_retries(3)
            .with_enabled(false);

        assert_eq!(wifi.password.as_str(), "secret123");
        assert_eq!(wifi.connect_timeout_ms, 15_000);
        assert_eq!(wifi.max_retries, 3);
        assert!(!wifi.enabled);
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let s = short_string(&"a".repeat(100));
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn long_string_truncation() {
        let s = long_string(&"b".repeat(200));
        assert_eq!(s.len(), MAX_LONG_STRING);
    }

    #[test]
    fn truncation_respects_utf8_boundary() {
        // 3-byte characters: 64 is not a multiple of 3.
        let s = short_string(&"€".repeat(30));
        assert_eq!(s.len(), 63);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_partial_document() {
        let config = Config::from_json_str(
            r#"{"feed": {"control_topic": "ctl"}, "navigation": {"max_rooms": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.feed.control_topic.as_str(), "ctl");
        assert_eq!(config.feed.request_topic.as_str(), "deviceList");
        assert_eq!(config.navigation.max_rooms, 4);
        assert_eq!(config.navigation.welcome_ms, 2_000);
    }
}

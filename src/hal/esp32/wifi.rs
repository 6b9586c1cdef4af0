//! WiFi station connection for the ESP32 controller.
//!
//! Joins the configured network and waits for DHCP, retrying up to
//! `max_retries` times before giving up.
//!
//! # Example
//!
//! ```ignore
//! use rs_braille::hal::esp32::Esp32Wifi;
//! use rs_braille::config::WifiConfig;
//!
//! let config = WifiConfig::default()
//!     .with_ssid("HomeNet")
//!     .with_password("secret123");
//!
//! let wifi = Esp32Wifi::connect(modem, sysloop, nvs, &config)?;
//! log::info!("IP: {:?}", wifi.ip_addr());
//! ```

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::config::WifiConfig;

/// Station-mode WiFi, kept up for the lifetime of this value.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> Esp32Wifi<'a> {
    /// Starts the driver and joins the configured network.
    ///
    /// # Errors
    ///
    /// Returns the last error if every attempt fails.
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let mut ssid: heapless::String<32> = heapless::String::new();
        let _ = ssid.push_str(config.ssid.as_str());
        let mut password: heapless::String<64> = heapless::String::new();
        let _ = password.push_str(config.password.as_str());

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;
        wifi.start()?;

        let attempts = u32::from(config.max_retries.max(1));
        let mut attempt = 1;
        loop {
            info!("WiFi joining '{}' ({}/{})", config.ssid, attempt, attempts);
            match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
                Ok(()) => break,
                Err(e) if attempt < attempts => {
                    warn!("WiFi attempt {} failed: {:?}", attempt, e);
                    let _ = wifi.disconnect();
                    thread::sleep(Duration::from_millis(u64::from(config.connect_timeout_ms)));
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let this = Self { wifi };
        info!("WiFi up, IP {:?}", this.ip_addr());
        Ok(this)
    }

    /// Current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    /// Whether the station is associated.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

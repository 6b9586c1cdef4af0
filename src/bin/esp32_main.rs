//! ESP32 braille menu controller.
//!
//! This is the main entry point for the physical device. It runs a 50Hz loop
//! that:
//! - Samples the encoder, buttons and proximity sensor
//! - Steps the menu navigator and plays feedback tones
//! - Redraws the braille matrix and text panel when the screen changes
//! - Exchanges menu lists, status reports and toggles over MQTT (if enabled)
//!
//! # Build
//!
//! ```bash
//! # Matrix, inputs and buzzer only (fallback menu)
//! cargo build --bin esp32_main --features esp32
//!
//! # With OLED panel and MQTT feed
//! WIFI_SSID=... WIFI_PASSWORD=... MQTT_HOST=... \
//!     cargo build --bin esp32_main --features display,esp32-mqtt
//! ```

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::IOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriverConfig};
use log::{error, info, warn};
use rs_braille::hal::esp32::{
    Esp32Buzzer, Esp32Clock, Esp32Inputs, InputWiring, Max7219Chain, DEFAULT_MODULES,
};
use rs_braille::traits::{Clock, InputPins};
use rs_braille::{BrailleController, Config, MqttConfig, WifiConfig};

/// Main loop interval in milliseconds (50Hz = 20ms)
const LOOP_INTERVAL_MS: u64 = 20;

/// MAX7219 brightness (0-15)
const MATRIX_INTENSITY: u8 = 5;

fn main() -> anyhow::Result<()> {
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("rs-braille starting");

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default()
        .with_wifi(
            WifiConfig::default()
                .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
                .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
        )
        .with_mqtt(
            MqttConfig::default()
                .with_host(option_env!("MQTT_HOST").unwrap_or("localhost"))
                .with_port(
                    option_env!("MQTT_PORT")
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(1883),
                ),
        );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Braille matrix (MAX7219 chain on SPI2, GPIO18/23/21)
    // =========================================================================
    let spi = SpiDeviceDriver::new_single(
        peripherals.spi2,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        Option::<esp_idf_hal::gpio::AnyIOPin>::None,
        Some(peripherals.pins.gpio21),
        &SpiDriverConfig::new(),
        &SpiConfig::new().baudrate(5.MHz().into()),
    )?;
    let mut matrix = Max7219Chain::new(spi, DEFAULT_MODULES);
    matrix
        .init(MATRIX_INTENSITY)
        .map_err(|e| anyhow::anyhow!("matrix init failed: {:?}", e))?;
    info!("matrix ready ({} modules)", matrix.modules());

    // =========================================================================
    // Inputs
    // =========================================================================
    let mut inputs = Esp32Inputs::new(InputWiring {
        clk: peripherals.pins.gpio2.downgrade(),
        dt: peripherals.pins.gpio4.downgrade(),
        enter: peripherals.pins.gpio12.downgrade(),
        back: peripherals.pins.gpio32.downgrade(),
        next: peripherals.pins.gpio14.downgrade(),
        prev: peripherals.pins.gpio27.downgrade(),
        proximity: peripherals.pins.gpio15.downgrade(),
    })?;

    // =========================================================================
    // Buzzer (LEDC on GPIO22)
    // =========================================================================
    let buzzer = Esp32Buzzer::new(
        peripherals.pins.gpio22,
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
    )?;

    // =========================================================================
    // Text panel (SSD1306 on GPIO25/26, or the log)
    // =========================================================================
    #[cfg(feature = "display")]
    let panel = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use rs_braille::hal::esp32::Esp32Panel;

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio25,
            peripherals.pins.gpio26,
            &I2cConfig::new().baudrate(400.kHz().into()),
        )?;
        Esp32Panel::new(i2c)
    };
    #[cfg(not(feature = "display"))]
    let panel = rs_braille::hal::esp32::LogPanel;

    // =========================================================================
    // WiFi + MQTT
    // =========================================================================
    #[cfg(feature = "esp32-mqtt")]
    let (_wifi, mut runner) = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;
        use rs_braille::hal::esp32::{Esp32Mqtt, Esp32Wifi};
        use rs_braille::services::FeedRunner;

        if config.wifi.is_configured() && config.mqtt.enabled {
            let sysloop = EspSystemEventLoop::take()?;
            let nvs = EspDefaultNvsPartition::take()?;
            let wifi = Esp32Wifi::connect(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;
            match Esp32Mqtt::connect(&config.mqtt) {
                Ok(mqtt) => (Some(wifi), Some(FeedRunner::new(mqtt, config.feed.clone()))),
                Err(e) => {
                    warn!("MQTT unavailable: {:?}", e);
                    (Some(wifi), None)
                }
            }
        } else {
            warn!("WiFi/MQTT not configured (set WIFI_SSID/MQTT_HOST)");
            (None, None)
        }
    };

    // =========================================================================
    // Controller
    // =========================================================================
    let clock = Esp32Clock::new();
    let mut controller = BrailleController::new(matrix, panel, buzzer, &config);
    controller.prime_inputs(inputs.read()?);
    controller
        .init(clock.now_ms())
        .map_err(|e| anyhow::anyhow!("display init failed: {}", e))?;

    #[cfg(feature = "esp32-mqtt")]
    let online = runner.is_some();
    #[cfg(not(feature = "esp32-mqtt"))]
    let online = false;
    if !online {
        info!("no network feed, loading fallback menu");
        controller
            .load_feed(config.feed.fallback_feed.as_str())
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    info!("entering control loop (50Hz)");

    // =========================================================================
    // Main Loop (50Hz)
    // =========================================================================
    loop {
        let now = clock.now_ms();

        #[cfg(feature = "esp32-mqtt")]
        if let Some(ref mut runner) = runner {
            if let Err(e) = runner.poll(&mut controller, now) {
                error!("feed: {}", e);
            }
        }

        match controller.tick(inputs.read()?, now) {
            Ok(effects) => {
                #[cfg(feature = "esp32-mqtt")]
                if let Some(ref mut runner) = runner {
                    if let Err(e) = runner.dispatch(&effects) {
                        error!("publish: {}", e);
                    }
                }
                #[cfg(not(feature = "esp32-mqtt"))]
                for effect in effects {
                    warn!("offline, dropping {:?}", effect);
                }
            }
            Err(e) => error!("tick: {}", e),
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}

//! Desktop simulator for the braille menu controller.
//!
//! Runs the real controller and MQTT feed against mock hardware: the braille
//! line is printed with Unicode braille characters, the text panel as plain
//! text, and the encoder/buttons are driven from the keyboard.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin desktop_sim --features mqtt
//! cargo run --bin desktop_sim --features mqtt -- braille.json
//! RUST_LOG=debug cargo run --bin desktop_sim --features mqtt
//! ```
//!
//! Keys (each followed by Enter): `n` next, `p` previous, `s` select,
//! `b` back, `x` proximity, `q` quit.
//!
//! # Configuration
//!
//! An optional JSON file overrides the defaults; missing fields keep their
//! default values:
//!
//! ```json
//! { "mqtt": { "host": "192.168.1.10" }, "navigation": { "active_window_ms": 30000 } }
//! ```

use std::convert::Infallible;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use rs_braille::hal::{MockMatrix, MockTone};
use rs_braille::input::Rotation;
use rs_braille::services::{FeedRunner, RumqttClient};
use rs_braille::{BrailleController, Config, InputEvents, TextPanel};

/// Loop interval in milliseconds (50Hz = 20ms)
const LOOP_INTERVAL_MS: u64 = 20;

/// Prints each screen to stdout.
struct TerminalPanel;

impl TextPanel for TerminalPanel {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Infallible> {
        println!("┌──────────────────┐");
        println!("│ {:<16} │", line1);
        println!("│ {:<16} │", line2);
        println!("└──────────────────┘");
        Ok(())
    }
}

/// Maps a typed command to input events.
fn parse_key(line: &str) -> Option<InputEvents> {
    match line.trim() {
        "n" => Some(InputEvents::rotate(Rotation::Next)),
        "p" => Some(InputEvents::rotate(Rotation::Prev)),
        "s" => Some(InputEvents::select()),
        "b" => Some(InputEvents::back()),
        "x" => Some(InputEvents::proximity()),
        _ => None,
    }
}

fn load_config() -> anyhow::Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            Config::from_json_str(&json).with_context(|| format!("parsing config {}", path))
        }
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    println!("=================================");
    println!("  rs-braille Desktop Simulator");
    println!("=================================");
    println!();
    println!("Broker: {}:{}", config.mqtt.host, config.mqtt.port);
    println!("Keys:   n next, p prev, s select, b back, x proximity, q quit");
    println!();

    let client = RumqttClient::spawn(&config.mqtt, &tokio::runtime::Handle::current());
    let mut runner = FeedRunner::new(client, config.feed.clone());

    let mut controller =
        BrailleController::new(MockMatrix::new(), TerminalPanel, MockTone::new(), &config);
    let cells = controller.layout().len();

    let (key_tx, mut key_rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if key_tx.send(line).is_err() {
                break;
            }
        }
    });

    let start = Instant::now();
    controller
        .init(0)
        .map_err(|e| anyhow::anyhow!("init failed: {}", e))?;

    let mut interval = tokio::time::interval(Duration::from_millis(LOOP_INTERVAL_MS));
    let mut flushes = controller.matrix().flush_count;
    let mut last_tone = None;

    loop {
        interval.tick().await;
        let now = start.elapsed().as_millis() as u64;

        if let Err(e) = runner.poll(&mut controller, now) {
            error!("feed: {}", e);
        }

        let mut events = InputEvents::default();
        while let Ok(line) = key_rx.try_recv() {
            if line.trim() == "q" {
                info!("bye");
                return Ok(());
            }
            match parse_key(&line) {
                Some(e) => {
                    events = e;
                    break;
                }
                None => println!("unknown key '{}'", line.trim()),
            }
        }

        match controller.apply_events(events, now) {
            Ok(effects) => {
                if let Err(e) = runner.dispatch(&effects) {
                    error!("publish: {}", e);
                }
            }
            Err(e) => error!("tick: {}", e),
        }

        let tone = controller.buzzer().frequency_hz;
        if tone.is_some() && tone != last_tone {
            println!("♪ {} Hz", tone.unwrap_or_default());
        }
        last_tone = tone;

        let matrix = controller.matrix();
        if matrix.flush_count != flushes {
            flushes = matrix.flush_count;
            let line: String = matrix
                .cells(controller.layout(), cells)
                .into_iter()
                .map(|c| c.to_unicode())
                .collect();
            println!("braille: {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_events() {
        assert_eq!(parse_key("n"), Some(InputEvents::rotate(Rotation::Next)));
        assert_eq!(parse_key(" p \n"), Some(InputEvents::rotate(Rotation::Prev)));
        assert_eq!(parse_key("s"), Some(InputEvents::select()));
        assert_eq!(parse_key("b"), Some(InputEvents::back()));
        assert_eq!(parse_key("x"), Some(InputEvents::proximity()));
        assert_eq!(parse_key("z"), None);
    }
}

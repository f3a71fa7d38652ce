//! Segment Clock Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Ht16k33 (I2C)   StationAdapter (WiFi)   TimeAdapter (SNTP)    │
//! │        └──────────── BoardAdapter ────────────┘                │
//! │  LogEventSink (EventSink)                Watchdog (TWDT)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ClockOrchestrator (pure logic)              │    │
//! │  │  display modes · SegmentRenderer · cron · sync         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{info, warn};

use segclock::adapters::board::BoardAdapter;
use segclock::adapters::ht16k33::{DEFAULT_ADDRESS, Ht16k33};
use segclock::adapters::log_sink::LogEventSink;
use segclock::adapters::station::{StationAdapter, validate_credentials};
use segclock::adapters::time::TimeAdapter;
use segclock::app::orchestrator::ClockOrchestrator;
use segclock::app::ports::TimePort;
use segclock::config::ClockConfig;
use segclock::drivers::watchdog::Watchdog;
use segclock::error::Error;
use segclock::sync::SyncState;

/// Display backpack bus speed.
const I2C_BAUDRATE_KHZ: u32 = 400;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Segclock v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (build-time, validated) ──────────────
    let config = ClockConfig::from_build_env()?;
    if let Err(e) = validate_credentials(&config.wifi_ssid, &config.wifi_password) {
        warn!("Config: {}, the clock will run unsynchronised", Error::from(e));
    }
    let watchdog = Watchdog::new(config.watchdog_timeout_secs);

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // HT16K33 backpack on SDA=GPIO21, SCL=GPIO22.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(I2C_BAUDRATE_KHZ.kHz().into()),
    )?;
    let display = Ht16k33::new(i2c, DEFAULT_ADDRESS)
        .map_err(|e| anyhow!("HT16K33 bring-up failed: {:?}", e))?;

    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;

    // ── 4. Construct adapters + orchestrator ──────────────────
    let mut board = BoardAdapter::new(display, StationAdapter::new(wifi), TimeAdapter::new(&config));
    let mut log_sink = LogEventSink::new();
    let mut clock = ClockOrchestrator::new(config)?;

    // ── 5. Initial sync (progress animation) ──────────────────
    if clock.start(&mut board, &mut log_sink) != SyncState::Succeeded {
        if let Some(e) = clock.last_sync_error() {
            warn!("Boot: {}, retry armed", Error::from(e));
        }
    }
    watchdog.feed();

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        clock.tick(&mut board, &mut log_sink);
        watchdog.feed();
        board.delay_ms(clock.config().tick_interval_ms);
    }
}

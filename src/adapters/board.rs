//! Board adapter — bridges the clock's peripherals to the port traits.
//!
//! Owns the display driver, the WiFi station and the time source and
//! exposes them as one value implementing every hardware port, so the
//! orchestrator can take a single `&mut` without double borrows. On
//! non-espidf targets the station and time source are simulations.

use log::info;

use crate::app::ports::{DisplayPort, MaintenancePort, StationPort, TimePort};
use crate::calendar::CalendarTime;
use crate::display::DISPLAY_RAM_LEN;
use crate::error::{StationError, SyncError};

use super::station::StationAdapter;
use super::time::TimeAdapter;

/// Concrete adapter that combines all hardware behind port traits.
pub struct BoardAdapter<D> {
    display: D,
    station: StationAdapter,
    time: TimeAdapter,
}

impl<D: DisplayPort> BoardAdapter<D> {
    pub fn new(display: D, station: StationAdapter, time: TimeAdapter) -> Self {
        Self {
            display,
            station,
            time,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn station(&self) -> &StationAdapter {
        &self.station
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort> DisplayPort for BoardAdapter<D> {
    fn write(&mut self, buffer: &[u8; DISPLAY_RAM_LEN]) {
        self.display.write(buffer);
    }

    fn set_brightness(&mut self, level: u8) {
        self.display.set_brightness(level);
    }

    fn set_blink_rate(&mut self, rate: u8) {
        self.display.set_blink_rate(rate);
    }
}

// ── StationPort implementation ────────────────────────────────

impl<D: DisplayPort> StationPort for BoardAdapter<D> {
    fn activate(&mut self, on: bool) {
        self.station.activate(on);
    }

    fn is_active(&self) -> bool {
        self.station.is_active()
    }

    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), StationError> {
        self.station.connect(ssid, password)
    }

    fn is_connected(&self) -> bool {
        self.station.is_connected()
    }

    fn disconnect(&mut self) {
        self.station.disconnect();
    }
}

// ── TimePort implementation ───────────────────────────────────

impl<D: DisplayPort> TimePort for BoardAdapter<D> {
    fn now(&self) -> CalendarTime {
        self.time.now()
    }

    fn uptime_ms(&self) -> u64 {
        self.time.uptime_ms()
    }

    fn sync_from_network(&mut self) -> Result<(), SyncError> {
        self.time.sync_from_network()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.delay_ms(ms);
    }
}

// ── MaintenancePort implementation ────────────────────────────

impl<D: DisplayPort> MaintenancePort for BoardAdapter<D> {
    #[cfg(target_os = "espidf")]
    fn run_maintenance(&mut self) {
        let free = unsafe { esp_idf_svc::sys::esp_get_free_heap_size() };
        let min_free = unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() };
        info!("Maintenance: heap free={} B, min-ever={} B", free, min_free);
    }

    #[cfg(not(target_os = "espidf"))]
    fn run_maintenance(&mut self) {
        info!("Maintenance(sim): nothing to reclaim");
    }
}

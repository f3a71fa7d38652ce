//! Port traits — the hexagonal boundary between the clock core and the device.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ClockOrchestrator / SyncStateMachine (domain)
//! ```
//!
//! Driven adapters (display, radio, wall clock, runtime housekeeping, event
//! sinks) implement these traits. The domain consumes them via generics at
//! each call site, so nothing in the core touches hardware directly and the
//! whole loop runs on the host against a mock board.
//!
//! All ports are fire-and-forget except [`StationPort::connect`] and
//! [`TimePort::sync_from_network`], whose failures drive the sync state
//! machine.

use crate::calendar::CalendarTime;
use crate::display::DISPLAY_RAM_LEN;
use crate::error::{StationError, SyncError};

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → segment controller)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the 4-digit segment display.
///
/// Bus faults are the adapter's problem: it logs them and carries on.
pub trait DisplayPort {
    /// Replace the whole display RAM.
    fn write(&mut self, buffer: &[u8; DISPLAY_RAM_LEN]);

    /// Brightness level, 0–15.
    fn set_brightness(&mut self, level: u8);

    /// Blink rate, 0 (off) to 3.
    fn set_blink_rate(&mut self, rate: u8);
}

// ───────────────────────────────────────────────────────────────
// Station port (driven adapter: domain ↔ WiFi radio)
// ───────────────────────────────────────────────────────────────

/// Raw WiFi station primitives.
pub trait StationPort {
    /// Power the station interface up or down.
    fn activate(&mut self, on: bool);

    fn is_active(&self) -> bool;

    /// Start an association. Returns as soon as the radio accepted the
    /// request; completion is observed through [`is_connected`](Self::is_connected).
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), StationError>;

    fn is_connected(&self) -> bool;

    /// Drop the association (no-op when not associated).
    fn disconnect(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ RTC / SNTP / scheduler)
// ───────────────────────────────────────────────────────────────

/// Wall clock, monotonic clock and network time source.
pub trait TimePort {
    /// Current local time (UTC offset already applied).
    fn now(&self) -> CalendarTime;

    /// Milliseconds since boot. Never goes backwards, unaffected by sync.
    fn uptime_ms(&self) -> u64;

    /// Set the wall clock from the network. Blocks for at most the
    /// adapter's own SNTP timeout.
    fn sync_from_network(&mut self) -> Result<(), SyncError>;

    /// Sleep the calling task.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Maintenance port (driven adapter: domain → runtime)
// ───────────────────────────────────────────────────────────────

/// Daily housekeeping hook.
pub trait MaintenancePort {
    fn run_maintenance(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

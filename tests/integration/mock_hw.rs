//! Mock board for integration tests.
//!
//! Implements every hardware port and records every call so tests can
//! assert on the full history. The wall clock is derived from the mock
//! uptime, so `delay_ms` moves both forward together.

use std::collections::VecDeque;

use segclock::app::events::AppEvent;
use segclock::app::ports::{DisplayPort, EventSink, MaintenancePort, StationPort, TimePort};
use segclock::calendar::CalendarTime;
use segclock::display::DISPLAY_RAM_LEN;
use segclock::error::{StationError, SyncError};

/// 2024-01-01 00:00:00 UTC
pub const NEW_YEAR_2024: i64 = 1_704_067_200;

/// Unix seconds for 2024-01-01 at `hh:mm:ss` UTC.
pub const fn jan1(hour: i64, minute: i64, second: i64) -> i64 {
    NEW_YEAR_2024 + hour * 3600 + minute * 60 + second
}

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    Write([u8; DISPLAY_RAM_LEN]),
    Brightness(u8),
    BlinkRate(u8),
    Activate(bool),
    Connect,
    Disconnect,
    Sync,
    Delay(u32),
    Maintenance,
}

/// How the station behaves when asked to associate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Associated this many milliseconds after `connect`.
    After(u64),
    /// Accepts `connect` but never associates.
    Never,
    /// Rejects `connect` outright.
    Refuse(StationError),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub link: Link,
    /// Results handed out by `sync_from_network`, front first; `Ok` once empty.
    pub sync_results: VecDeque<Result<(), SyncError>>,
    boot_unix: i64,
    uptime_ms: u64,
    active: bool,
    connected_at: Option<u64>,
}

#[allow(dead_code)]
impl MockHardware {
    /// Board whose wall clock reads `boot_unix` at uptime zero.
    pub fn at(boot_unix: i64, link: Link) -> Self {
        Self {
            calls: Vec::new(),
            link,
            sync_results: VecDeque::new(),
            boot_unix,
            uptime_ms: 0,
            active: false,
            connected_at: None,
        }
    }

    /// Let time pass without a call being recorded.
    pub fn advance_ms(&mut self, ms: u64) {
        self.uptime_ms += ms;
    }

    pub fn fail_next_syncs(&mut self, err: SyncError, count: usize) {
        for _ in 0..count {
            self.sync_results.push_back(Err(err));
        }
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn connects(&self) -> usize {
        self.count(&HwCall::Connect)
    }

    pub fn syncs(&self) -> usize {
        self.count(&HwCall::Sync)
    }

    pub fn maintenance_runs(&self) -> usize {
        self.count(&HwCall::Maintenance)
    }

    pub fn last_frame(&self) -> Option<[u8; DISPLAY_RAM_LEN]> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Write(frame) => Some(*frame),
            _ => None,
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = &[u8; DISPLAY_RAM_LEN]> {
        self.calls.iter().filter_map(|c| match c {
            HwCall::Write(frame) => Some(frame),
            _ => None,
        })
    }

    pub fn radio_on(&self) -> bool {
        self.active
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl DisplayPort for MockHardware {
    fn write(&mut self, buffer: &[u8; DISPLAY_RAM_LEN]) {
        self.calls.push(HwCall::Write(*buffer));
    }

    fn set_brightness(&mut self, level: u8) {
        self.calls.push(HwCall::Brightness(level));
    }

    fn set_blink_rate(&mut self, rate: u8) {
        self.calls.push(HwCall::BlinkRate(rate));
    }
}

impl StationPort for MockHardware {
    fn activate(&mut self, on: bool) {
        self.calls.push(HwCall::Activate(on));
        self.active = on;
        if !on {
            self.connected_at = None;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), StationError> {
        match self.link {
            Link::Refuse(e) => Err(e),
            Link::Never => {
                self.calls.push(HwCall::Connect);
                self.connected_at = None;
                Ok(())
            }
            Link::After(latency) => {
                self.calls.push(HwCall::Connect);
                self.connected_at = Some(self.uptime_ms + latency);
                Ok(())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.active && self.connected_at.is_some_and(|at| self.uptime_ms >= at)
    }

    fn disconnect(&mut self) {
        self.calls.push(HwCall::Disconnect);
        self.connected_at = None;
    }
}

impl TimePort for MockHardware {
    fn now(&self) -> CalendarTime {
        let secs = self.boot_unix + (self.uptime_ms / 1000) as i64;
        CalendarTime::from_unix(secs, 0).expect("mock clock in range")
    }

    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    fn sync_from_network(&mut self) -> Result<(), SyncError> {
        self.calls.push(HwCall::Sync);
        self.sync_results.pop_front().unwrap_or(Ok(()))
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::Delay(ms));
        self.uptime_ms += u64::from(ms);
    }
}

impl MaintenancePort for MockHardware {
    fn run_maintenance(&mut self) {
        self.calls.push(HwCall::Maintenance);
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

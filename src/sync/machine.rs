//! Network time synchronisation state machine.
//!
//! One association attempt at a time, spread over as many polls as it takes:
//!
//! ```text
//!            request_resync()
//!   Idle ─────────────┐
//!                     ▼
//!          ┌── ConnectingPending ◀──┐  (not yet associated, deadline armed)
//!          │          │ advance()   │
//!          │          └─────────────┘
//!          │
//!          ├── associated ──▶ sync_from_network ──┬─ Ok  ──▶ Succeeded
//!          │                                      └─ Err ──▶ ProtocolFailed
//!          └── deadline passed / connect refused ──────────▶ TimedOut
//! ```
//!
//! Every terminal outcome releases the station (disconnect, radio off)
//! through [`StationLease`]; only the still-connecting path keeps it. Failed
//! outcomes latch the `error` flag, keep the pending request set, and hold
//! the next attempt back by an exponential retry delay that
//! [`request_resync`](SyncStateMachine::request_resync) cancels.

use heapless::String;
use log::{debug, info, warn};

use super::timer::ConnectionTimer;
use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink, StationPort, TimePort};
use crate::config::ClockConfig;
use crate::display::SegmentRenderer;
use crate::error::{StationError, SyncError};

/// Shown while the time exchange runs.
const SYNC_TEXT: &str = "sync";
/// Shown for the error pause after a failed attempt.
const ERROR_TEXT: &str = "err ";

// ═══════════════════════════════════════════════════════════════
//  State
// ═══════════════════════════════════════════════════════════════

/// Outcome of the most recent poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No attempt has run yet.
    #[default]
    Idle,
    /// Association requested, not complete, deadline not passed.
    ConnectingPending,
    /// Clock set from the network.
    Succeeded,
    /// Association did not complete in time (or was refused).
    TimedOut,
    /// Associated, but the time exchange failed.
    ProtocolFailed,
}

// ═══════════════════════════════════════════════════════════════
//  Scoped station lease
// ═══════════════════════════════════════════════════════════════

/// Exclusive use of the station for one `advance()`.
///
/// Dropping the lease releases the station and clears the connection
/// deadline. [`retain`](Self::retain) hands it over to the next poll instead.
struct StationLease<'a, H: StationPort> {
    station: &'a mut H,
    timer: &'a mut ConnectionTimer,
    retained: bool,
}

impl<'a, H: StationPort> StationLease<'a, H> {
    fn acquire(station: &'a mut H, timer: &'a mut ConnectionTimer) -> Self {
        Self {
            station,
            timer,
            retained: false,
        }
    }

    /// Start an association unless one is complete or already outstanding.
    /// Returns `true` when a new attempt was started.
    fn ensure_connecting(
        &mut self,
        ssid: &str,
        password: &str,
        deadline_ms: u64,
    ) -> Result<bool, StationError> {
        if self.station.is_connected() {
            self.timer.clear();
            return Ok(false);
        }
        if self.timer.is_armed() {
            return Ok(false);
        }
        if !self.station.is_active() {
            self.station.activate(true);
        }
        self.station.connect(ssid, password)?;
        self.timer.start(deadline_ms);
        Ok(true)
    }

    fn is_connected(&self) -> bool {
        self.station.is_connected()
    }

    fn is_expired(&self, now_ms: u64) -> bool {
        self.timer.is_expired(now_ms)
    }

    fn station(&mut self) -> &mut H {
        self.station
    }

    /// Keep the association open across polls.
    fn retain(mut self) {
        self.retained = true;
    }
}

impl<H: StationPort> Drop for StationLease<'_, H> {
    fn drop(&mut self) {
        if self.retained {
            return;
        }
        self.station.disconnect();
        self.station.activate(false);
        self.timer.clear();
    }
}

// ═══════════════════════════════════════════════════════════════
//  State machine
// ═══════════════════════════════════════════════════════════════

pub struct SyncStateMachine {
    ssid: String<32>,
    password: String<64>,
    connect_timeout_ms: u64,
    error_pause_ms: u32,
    progress_frame_ms: u32,
    backoff_min_ms: u64,
    backoff_max_ms: u64,

    state: SyncState,
    /// Coalesced "an attempt should run" flag.
    pending: bool,
    /// Latched until the next success.
    error: bool,
    last_error: Option<SyncError>,
    timer: ConnectionTimer,
    /// Earliest uptime at which `run()` may start the next attempt.
    retry_at_ms: Option<u64>,
    /// Delay applied after the next failure.
    backoff_ms: u64,
    progress_count: u32,
}

impl SyncStateMachine {
    pub fn new(config: &ClockConfig) -> Self {
        let backoff_min_ms = u64::from(config.retry_backoff_min_secs) * 1000;
        Self {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            connect_timeout_ms: config.connect_timeout_ms(),
            error_pause_ms: config.error_pause_ms,
            progress_frame_ms: config.progress_frame_ms,
            backoff_min_ms,
            backoff_max_ms: u64::from(config.retry_backoff_max_secs) * 1000,
            state: SyncState::Idle,
            pending: false,
            error: false,
            last_error: None,
            timer: ConnectionTimer::new(),
            retry_at_ms: None,
            backoff_ms: backoff_min_ms,
            progress_count: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// `true` from a failed attempt until the next successful one.
    pub fn error(&self) -> bool {
        self.error
    }

    pub fn last_error(&self) -> Option<SyncError> {
        self.last_error
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Deadline of the outstanding association, if any.
    pub fn connection_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    pub fn retry_at_ms(&self) -> Option<u64> {
        self.retry_at_ms
    }

    /// Frame index for the progress animation; advances on every call.
    pub fn next_progress_frame(&mut self) -> u32 {
        let frame = self.progress_count;
        self.progress_count = self.progress_count.wrapping_add(1);
        frame
    }

    // ── Commands ──────────────────────────────────────────────

    /// Ask for an attempt at the next `run()`, skipping any retry delay.
    ///
    /// Requests coalesce. Returns `false` when the call changed nothing
    /// (an attempt was already due or in progress).
    pub fn request_resync(&mut self) -> bool {
        let changed = !self.pending || self.retry_at_ms.is_some();
        if changed {
            info!("Sync: resync requested");
        }
        self.pending = true;
        self.retry_at_ms = None;
        changed
    }

    /// Poll once if an attempt is due; otherwise a no-op.
    pub fn run<H>(
        &mut self,
        hw: &mut H,
        renderer: &mut SegmentRenderer,
        sink: &mut impl EventSink,
    ) -> SyncState
    where
        H: StationPort + TimePort + DisplayPort,
    {
        if !self.pending {
            return self.state;
        }
        if let Some(retry_at) = self.retry_at_ms {
            if hw.uptime_ms() < retry_at {
                return self.state;
            }
            self.retry_at_ms = None;
        }
        self.advance(hw, renderer, sink)
    }

    /// Drive an attempt to completion, one progress frame per poll.
    ///
    /// Used once at startup. Bounded by the connection deadline.
    pub fn sync<H>(
        &mut self,
        hw: &mut H,
        renderer: &mut SegmentRenderer,
        sink: &mut impl EventSink,
    ) -> SyncState
    where
        H: StationPort + TimePort + DisplayPort,
    {
        self.progress_count = 0;
        self.pending = true;
        self.retry_at_ms = None;
        loop {
            let state = self.advance(hw, renderer, sink);
            if state != SyncState::ConnectingPending {
                return state;
            }
            let frame = self.next_progress_frame();
            renderer.render_progress(frame, hw);
            hw.delay_ms(self.progress_frame_ms);
        }
    }

    /// One step of the attempt.
    pub fn advance<H>(
        &mut self,
        hw: &mut H,
        renderer: &mut SegmentRenderer,
        sink: &mut impl EventSink,
    ) -> SyncState
    where
        H: StationPort + TimePort + DisplayPort,
    {
        let now_ms = hw.uptime_ms();
        let deadline_ms = now_ms.saturating_add(self.connect_timeout_ms);
        let mut lease = StationLease::acquire(hw, &mut self.timer);

        let started = match lease.ensure_connecting(&self.ssid, &self.password, deadline_ms) {
            Ok(started) => started,
            Err(e) => {
                drop(lease);
                return self.fail(SyncError::Station(e), SyncState::TimedOut, hw, renderer, sink);
            }
        };
        if started {
            info!("Sync: connecting to '{}' (deadline {} ms)", self.ssid, deadline_ms);
            self.progress_count = 0;
            sink.emit(&AppEvent::SyncStarted);
        }

        if lease.is_connected() {
            renderer.render_text(SYNC_TEXT, lease.station());
            let outcome = lease.station().sync_from_network();
            drop(lease);
            return match outcome {
                Ok(()) => self.succeed(sink),
                Err(e) => {
                    let state = if e.is_protocol_failure() {
                        SyncState::ProtocolFailed
                    } else {
                        SyncState::TimedOut
                    };
                    self.fail(e, state, hw, renderer, sink)
                }
            };
        }

        if lease.is_expired(now_ms) {
            drop(lease);
            return self.fail(SyncError::ConnectionTimeout, SyncState::TimedOut, hw, renderer, sink);
        }

        lease.retain();
        debug!("Sync: waiting for association");
        self.pending = true;
        self.state = SyncState::ConnectingPending;
        self.state
    }

    // ── Outcomes ──────────────────────────────────────────────

    fn succeed(&mut self, sink: &mut impl EventSink) -> SyncState {
        info!("Sync: clock set from network");
        self.pending = false;
        self.error = false;
        self.last_error = None;
        self.retry_at_ms = None;
        self.backoff_ms = self.backoff_min_ms;
        self.state = SyncState::Succeeded;
        sink.emit(&AppEvent::SyncSucceeded);
        self.state
    }

    fn fail<H>(
        &mut self,
        err: SyncError,
        state: SyncState,
        hw: &mut H,
        renderer: &mut SegmentRenderer,
        sink: &mut impl EventSink,
    ) -> SyncState
    where
        H: TimePort + DisplayPort,
    {
        warn!("Sync: attempt failed: {}", err);
        self.pending = true;
        self.error = true;
        self.last_error = Some(err);
        self.state = state;
        sink.emit(&AppEvent::SyncFailed(err));

        renderer.render_text(ERROR_TEXT, hw);
        hw.delay_ms(self.error_pause_ms);

        let delay_ms = self.backoff_ms;
        self.retry_at_ms = Some(hw.uptime_ms().saturating_add(delay_ms));
        self.backoff_ms = delay_ms.saturating_mul(2).min(self.backoff_max_ms);
        let in_secs = u32::try_from(delay_ms / 1000).unwrap_or(u32::MAX);
        info!("Sync: next attempt in {} s", in_secs);
        sink.emit(&AppEvent::RetryScheduled { in_secs });
        self.state
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

//! Clock orchestrator — the root of the core.
//!
//! [`ClockOrchestrator`] owns the renderer, the sync state machine and the
//! cron dispatcher, and decides what the display shows each tick. All I/O
//! flows through port traits injected at call sites.
//!
//! ```text
//!  TimePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!               │      ClockOrchestrator       │
//! DisplayPort ◀─│  mode machine · cron · sync  │──▶ MaintenancePort
//!               └──────────────┬───────────────┘
//!                              ▼
//!                         StationPort
//! ```
//!
//! Per tick: read the time, render (progress frame while an association is
//! outstanding, otherwise the display-mode machine), run cron, apply what
//! the hooks asked for, then poll the sync machine. Sync and cron effects
//! therefore reach the display on the next tick at the latest.

use log::{debug, info};

use crate::calendar::CalendarTime;
use crate::config::ClockConfig;
use crate::cron::{Boundary, CronHooks, PeriodicDispatcher};
use crate::display::SegmentRenderer;
use crate::error::{Error, Result, SyncError};
use crate::sync::{SyncState, SyncStateMachine};

use super::events::{AppEvent, DisplayMode};
use super::ports::{DisplayPort, EventSink, MaintenancePort, StationPort, TimePort};

// ───────────────────────────────────────────────────────────────
// Cron wiring
// ───────────────────────────────────────────────────────────────

/// What the orchestrator's cron hooks see and ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CronContext {
    /// Sync error flag at the time of the run.
    pub sync_error: bool,
    pub resync_requested: bool,
    pub maintenance_requested: bool,
}

/// Self-healing: only resync hourly while the last attempt failed.
fn hourly_resync_on_error(ctx: &mut CronContext, _now: &CalendarTime) {
    if ctx.sync_error {
        ctx.resync_requested = true;
    }
}

fn daily_resync_and_maintenance(ctx: &mut CronContext, _now: &CalendarTime) {
    ctx.resync_requested = true;
    ctx.maintenance_requested = true;
}

// ───────────────────────────────────────────────────────────────
// Tick report
// ───────────────────────────────────────────────────────────────

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Face rendered, or `None` when a progress frame replaced it.
    pub shown: Option<DisplayMode>,
    /// Deepest cron boundary fired.
    pub fired: Option<Boundary>,
    /// Sync machine state after this tick's poll.
    pub sync: SyncState,
}

// ───────────────────────────────────────────────────────────────
// ClockOrchestrator
// ───────────────────────────────────────────────────────────────

pub struct ClockOrchestrator {
    config: ClockConfig,
    renderer: SegmentRenderer,
    sync: SyncStateMachine,
    cron: PeriodicDispatcher<CronContext>,
    mode: DisplayMode,
    tick_count: u64,
}

impl ClockOrchestrator {
    /// Validate `config` and wire the periodic hooks.
    pub fn new(config: ClockConfig) -> Result<Self> {
        config.validate()?;

        let mut cron = PeriodicDispatcher::from_config(&config);
        cron.add(
            CronHooks::new("clock")
                .hourly(hourly_resync_on_error)
                .daily(daily_resync_and_maintenance),
        )
        .ok_or(Error::Init("cron: no free registrant slot"))?;

        Ok(Self {
            sync: SyncStateMachine::new(&config),
            renderer: SegmentRenderer::new(),
            cron,
            mode: DisplayMode::Time,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Display bring-up and the initial sync (with progress animation).
    ///
    /// Blocks until the first attempt succeeds or fails; a failure leaves a
    /// retry armed and the main loop starts anyway.
    pub fn start(
        &mut self,
        hw: &mut (impl DisplayPort + StationPort + TimePort),
        sink: &mut impl EventSink,
    ) -> SyncState {
        hw.set_brightness(self.config.brightness);
        hw.set_blink_rate(self.config.blink_rate);
        self.renderer.clear(hw);

        info!("Clock: initial sync via '{}'", self.config.ntp_server);
        let state = self.sync.sync(hw, &mut self.renderer, sink);
        info!("Clock: started (sync {:?})", state);
        sink.emit(&AppEvent::Started);
        state
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One main-loop iteration. Never blocks beyond the sync machine's own
    /// bounded phases.
    pub fn tick(
        &mut self,
        hw: &mut (impl DisplayPort + StationPort + TimePort + MaintenancePort),
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;
        let now = hw.now();

        // 1. Render
        let shown = if self.sync.state() == SyncState::ConnectingPending {
            let frame = self.sync.next_progress_frame();
            self.renderer.render_progress(frame, hw);
            None
        } else {
            Some(self.step_display(&now, hw, sink))
        };

        // 2. Periodic hooks
        let mut ctx = CronContext {
            sync_error: self.sync.error(),
            ..CronContext::default()
        };
        let fired = self.cron.run(&now, &mut ctx);
        if let Some(boundary) = fired {
            sink.emit(&AppEvent::CronFired(boundary));
        }
        if ctx.resync_requested && self.sync.request_resync() {
            sink.emit(&AppEvent::ResyncRequested);
        }
        if ctx.maintenance_requested {
            hw.run_maintenance();
            sink.emit(&AppEvent::Maintenance);
        }

        // 3. Sync
        let sync = self.sync.run(hw, &mut self.renderer, sink);

        TickReport { shown, fired, sync }
    }

    /// Queue a resync from outside the cron schedule.
    pub fn request_resync(&mut self, sink: &mut impl EventSink) {
        if self.sync.request_resync() {
            sink.emit(&AppEvent::ResyncRequested);
        }
    }

    // ── Display-mode machine ──────────────────────────────────

    fn step_display(
        &mut self,
        now: &CalendarTime,
        hw: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> DisplayMode {
        let on_boundary = now.minute % self.config.display_interval_minutes == 0;
        let error = self.sync.error();

        let (shown, next) = match self.mode {
            DisplayMode::Time if on_boundary => {
                self.renderer.render_year(now, hw);
                (DisplayMode::Year, DisplayMode::Date)
            }
            DisplayMode::Time => {
                self.renderer.render_time(now, error, hw);
                (DisplayMode::Time, DisplayMode::Time)
            }
            DisplayMode::Year | DisplayMode::Date => {
                self.renderer.render_date(now, hw);
                (DisplayMode::Date, DisplayMode::TimeGuard)
            }
            DisplayMode::TimeGuard => {
                self.renderer.render_time(now, error, hw);
                let next = if on_boundary {
                    DisplayMode::TimeGuard
                } else {
                    DisplayMode::Time
                };
                (DisplayMode::TimeGuard, next)
            }
        };

        if next != self.mode {
            debug!("Clock: mode {:?} -> {:?}", self.mode, next);
            sink.emit(&AppEvent::ModeChanged {
                from: self.mode,
                to: next,
            });
            self.mode = next;
        }
        shown
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn sync_error(&self) -> bool {
        self.sync.error()
    }

    /// Why the most recent attempt failed, until the next success.
    pub fn last_sync_error(&self) -> Option<SyncError> {
        self.sync.last_error()
    }

    pub fn is_resync_pending(&self) -> bool {
        self.sync.is_pending()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn renderer(&self) -> &SegmentRenderer {
        &self.renderer
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }
}

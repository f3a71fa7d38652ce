//! Periodic-trigger dispatcher ("cron").
//!
//! Called once per main-loop tick with the current wall-clock time. The
//! first call that lands inside the delay window (the first few seconds of a
//! minute) fires the minute boundary; nested inside it the hour boundary
//! (minute 0) and inside that the day boundary (minute 0 of the maintenance
//! hour). A guard flag keeps the window from firing twice; it re-arms once a
//! call lands outside the window.
//!
//! ```text
//!   second:   0   1   2   3   4   5 │ 6  ...  59 │ 0   1 ...
//!   window:  [fire  ─ ─ guarded ─ ─]│  re-arm    │[fire ─ ─
//! ```
//!
//! A minute whose whole window passes without a call is skipped; there is
//! no catch-up.
//!
//! Registrants supply a [`CronHooks`] record of optional handlers, resolved
//! once when they are added. Handlers get a caller-chosen context `C` to
//! write their requests into, which keeps the dispatcher ignorant of what the
//! hooks actually do.

use heapless::Vec;
use log::{debug, info};

use crate::calendar::CalendarTime;
use crate::config::ClockConfig;

// ═══════════════════════════════════════════════════════════════
//  Hook types
// ═══════════════════════════════════════════════════════════════

/// A periodic handler.
pub type CronHandler<C> = fn(&mut C, &CalendarTime);

/// Which boundary a dispatch reached. Ordered by depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    Minute,
    Hour,
    Day,
}

/// One registrant's capabilities. Any subset of the three may be present.
pub struct CronHooks<C> {
    /// Human-readable label, used in logs.
    pub label: &'static str,
    pub minutely: Option<CronHandler<C>>,
    pub hourly: Option<CronHandler<C>>,
    pub daily: Option<CronHandler<C>>,
}

impl<C> CronHooks<C> {
    /// A registrant with no hooks yet.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            minutely: None,
            hourly: None,
            daily: None,
        }
    }

    pub fn minutely(mut self, handler: CronHandler<C>) -> Self {
        self.minutely = Some(handler);
        self
    }

    pub fn hourly(mut self, handler: CronHandler<C>) -> Self {
        self.hourly = Some(handler);
        self
    }

    pub fn daily(mut self, handler: CronHandler<C>) -> Self {
        self.daily = Some(handler);
        self
    }
}

// ═══════════════════════════════════════════════════════════════
//  Dispatcher
// ═══════════════════════════════════════════════════════════════

/// Maximum number of registrants (stack-allocated).
pub const MAX_REGISTRANTS: usize = 4;

pub struct PeriodicDispatcher<C> {
    registrants: Vec<CronHooks<C>, MAX_REGISTRANTS>,
    /// Seconds at the top of the minute during which a fire is allowed.
    delay_window_secs: u8,
    /// Hour of day at which the day boundary fires.
    daily_hour: u8,
    /// Set once the current window has fired.
    guard: bool,
}

impl<C> PeriodicDispatcher<C> {
    pub fn new(delay_window_secs: u8, daily_hour: u8) -> Self {
        Self {
            registrants: Vec::new(),
            delay_window_secs,
            daily_hour,
            guard: false,
        }
    }

    pub fn from_config(config: &ClockConfig) -> Self {
        Self::new(config.cron_delay_window_secs, config.maintenance_hour)
    }

    /// Register a set of hooks. Returns the slot index, or `None` if full.
    pub fn add(&mut self, hooks: CronHooks<C>) -> Option<usize> {
        let label = hooks.label;
        let slot = self.registrants.len();
        match self.registrants.push(hooks) {
            Ok(()) => {
                info!("Cron: registered '{}' at slot {}", label, slot);
                Some(slot)
            }
            Err(_) => None,
        }
    }

    pub fn registrant_count(&self) -> usize {
        self.registrants.len()
    }

    /// Whether the current delay window has already fired.
    pub fn is_guarded(&self) -> bool {
        self.guard
    }

    /// Fire whatever is due at `now`. Returns the deepest boundary fired,
    /// or `None` if nothing was due.
    pub fn run(&mut self, now: &CalendarTime, ctx: &mut C) -> Option<Boundary> {
        if now.second >= self.delay_window_secs {
            self.guard = false;
            return None;
        }
        if self.guard {
            return None;
        }
        self.guard = true;

        debug!("Cron: minute boundary {:02}:{:02}", now.hour, now.minute);
        for hooks in &self.registrants {
            if let Some(handler) = hooks.minutely {
                handler(ctx, now);
            }
        }
        if now.minute != 0 {
            return Some(Boundary::Minute);
        }

        info!("Cron: hour boundary {:02}:00", now.hour);
        for hooks in &self.registrants {
            if let Some(handler) = hooks.hourly {
                debug!("Cron: '{}' hourly", hooks.label);
                handler(ctx, now);
            }
        }
        if now.hour != self.daily_hour {
            return Some(Boundary::Hour);
        }

        info!("Cron: day boundary {:04}-{:02}-{:02}", now.year, now.month, now.day);
        for hooks in &self.registrants {
            if let Some(handler) = hooks.daily {
                debug!("Cron: '{}' daily", hooks.label);
                handler(ctx, now);
            }
        }
        Some(Boundary::Day)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

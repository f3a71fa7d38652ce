//! Outbound application events.
//!
//! The [`ClockOrchestrator`](super::orchestrator::ClockOrchestrator) and the
//! [`SyncStateMachine`](crate::sync::SyncStateMachine) emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them.

use crate::cron::Boundary;
use crate::error::SyncError;

/// Display-mode machine state, and the face a tick rendered.
///
/// The machine rests in `Time`, `Date` or `TimeGuard`. `Year` is the face
/// rendered on the tick that leaves `Time`; the machine goes straight on to
/// `Date` from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Clock face.
    #[default]
    Time,
    /// Year face.
    Year,
    /// Month.day face.
    Date,
    /// Clock face, held until the boundary minute has passed.
    TimeGuard,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Bring-up and the initial sync are done; the main loop is about to run.
    Started,

    /// The display-mode machine moved.
    ModeChanged { from: DisplayMode, to: DisplayMode },

    /// A resync was requested (coalesced with any already pending).
    ResyncRequested,

    /// A new association attempt was started.
    SyncStarted,

    /// The wall clock was set from the network.
    SyncSucceeded,

    /// A sync attempt ended without setting the clock.
    SyncFailed(SyncError),

    /// The next attempt is held back for this long.
    RetryScheduled { in_secs: u32 },

    /// Periodic hooks fired, up to and including this boundary.
    CronFired(Boundary),

    /// The daily housekeeping hook ran.
    Maintenance,
}

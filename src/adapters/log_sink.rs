//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the ESP-IDF logger on the device, UART / USB-CDC).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::cron::Boundary;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | main loop running"),
            AppEvent::ModeChanged { from, to } => debug!("MODE  | {:?} -> {:?}", from, to),
            AppEvent::ResyncRequested => info!("SYNC  | resync requested"),
            AppEvent::SyncStarted => info!("SYNC  | connecting"),
            AppEvent::SyncSucceeded => info!("SYNC  | ok"),
            AppEvent::SyncFailed(e) => warn!("SYNC  | failed: {}", e),
            AppEvent::RetryScheduled { in_secs } => info!("SYNC  | retry in {}s", in_secs),
            // One per minute; too chatty for info.
            AppEvent::CronFired(Boundary::Minute) => debug!("CRON  | minute"),
            AppEvent::CronFired(boundary) => info!("CRON  | {:?}", boundary),
            AppEvent::Maintenance => info!("MAINT | daily housekeeping ran"),
        }
    }
}

//! ESP32 time adapter.
//!
//! Implements [`TimePort`]: local wall-clock time, monotonic uptime, SNTP
//! synchronisation and task delays.
//!
//! - **`target_os = "espidf"`**: wall clock from `gettimeofday()`, uptime
//!   from `esp_timer_get_time()` (microsecond precision, monotonic), SNTP via
//!   `esp_idf_svc::sntp`, delays via FreeRTOS.
//! - **`not(target_os = "espidf")`**: `std::time::SystemTime` / `Instant`
//!   and `thread::sleep` for host-side simulation; sync always succeeds.
//!
//! The UTC offset is applied here, once, so the core only ever sees local
//! [`CalendarTime`].

use heapless::String;
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};

use crate::app::ports::TimePort;
use crate::calendar::CalendarTime;
use crate::config::ClockConfig;
use crate::error::SyncError;

/// Shown when the wall clock cannot be read at all.
const UNIX_EPOCH: CalendarTime = CalendarTime::new(1970, 1, 1, 0, 0, 0);

/// SNTP status poll period while waiting for the first reply.
#[cfg(target_os = "espidf")]
const SNTP_POLL_MS: u32 = 100;

/// Time adapter for the ESP32 platform.
pub struct TimeAdapter {
    utc_offset_secs: i32,
    ntp_server: String<64>,
    sntp_timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl TimeAdapter {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            utc_offset_secs: config.utc_offset_secs,
            ntp_server: config.ntp_server.clone(),
            sntp_timeout_ms: config.sntp_timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Seconds since the unix epoch (UTC), if the wall clock is readable.
    #[cfg(target_os = "espidf")]
    fn unix_secs(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        Some(i64::from(tv.tv_sec))
    }

    #[cfg(not(target_os = "espidf"))]
    fn unix_secs(&self) -> Option<i64> {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        i64::try_from(since_epoch.as_secs()).ok()
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_uptime_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    #[cfg(target_os = "espidf")]
    fn platform_sync(&mut self) -> Result<(), SyncError> {
        let mut conf: SntpConf<'_> = SntpConf::default();
        conf.servers[0] = self.ntp_server.as_str();

        // Dropping the client stops SNTP; each sync is one scoped exchange.
        let sntp = EspSntp::new(&conf).map_err(|e| {
            warn!("SNTP: start failed: {}", e);
            SyncError::Network
        })?;

        let started = self.platform_uptime_ms();
        while sntp.get_sync_status() != SyncStatus::Completed {
            if self.platform_uptime_ms().saturating_sub(started) > u64::from(self.sntp_timeout_ms) {
                return Err(SyncError::ServerTimeout);
            }
            FreeRtos::delay_ms(SNTP_POLL_MS);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_sync(&mut self) -> Result<(), SyncError> {
        info!(
            "SNTP(sim): host clock assumed correct (timeout {} ms unused)",
            self.sntp_timeout_ms
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

impl TimePort for TimeAdapter {
    fn now(&self) -> CalendarTime {
        self.unix_secs()
            .and_then(|secs| CalendarTime::from_unix(secs, self.utc_offset_secs))
            .unwrap_or(UNIX_EPOCH)
    }

    fn uptime_ms(&self) -> u64 {
        self.platform_uptime_ms()
    }

    fn sync_from_network(&mut self) -> Result<(), SyncError> {
        info!("SNTP: syncing from '{}'", self.ntp_server);
        self.platform_sync()?;
        let now = self.now();
        info!(
            "SNTP: clock set to {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            now.year, now.month, now.day, now.hour, now.minute, now.second
        );
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.platform_delay_ms(ms);
    }
}

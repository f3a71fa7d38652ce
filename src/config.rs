//! System configuration parameters
//!
//! All tunable parameters for the clock. The configuration is built once at
//! boot (defaults, optionally overlaid from the build environment) and passed
//! by reference into the components that need it. Nothing is persisted.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    // --- Network ---
    /// Station SSID (1-32 printable ASCII bytes).
    pub wifi_ssid: String<32>,
    /// WPA2 passphrase (8-64 bytes) or empty for an open network.
    pub wifi_password: String<64>,
    /// SNTP server host name.
    pub ntp_server: String<64>,
    /// Fixed local offset from UTC, in seconds.
    pub utc_offset_secs: i32,

    // --- Sync ---
    /// Deadline for one association attempt (seconds).
    pub connect_timeout_secs: u16,
    /// Bound on one SNTP exchange (milliseconds).
    pub sntp_timeout_ms: u32,
    /// First retry delay after a failed attempt (seconds).
    pub retry_backoff_min_secs: u32,
    /// Retry delay cap (seconds).
    pub retry_backoff_max_secs: u32,

    // --- Timing ---
    /// Main loop period (milliseconds).
    pub tick_interval_ms: u32,
    /// Frame period of the startup progress animation (milliseconds).
    pub progress_frame_ms: u32,
    /// Pause after a failed attempt while "err" is shown (milliseconds).
    pub error_pause_ms: u32,
    /// Task watchdog timeout (seconds); must outlast the initial sync.
    pub watchdog_timeout_secs: u32,

    // --- Display ---
    /// Year/date rotation interval (minutes).
    pub display_interval_minutes: u8,
    /// Display brightness (0-15).
    pub brightness: u8,
    /// Display blink rate (0 = off, 1-3 = 2 Hz / 1 Hz / 0.5 Hz).
    pub blink_rate: u8,

    // --- Cron ---
    /// Seconds at the top of each minute during which periodic hooks may fire.
    pub cron_delay_window_secs: u8,
    /// Hour of day (0-23) at which daily hooks fire.
    pub maintenance_hour: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        let mut ntp_server = String::new();
        // Fits: 12 bytes into a 64-byte buffer.
        let _ = ntp_server.push_str("pool.ntp.org");

        Self {
            // Network
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            ntp_server,
            utc_offset_secs: 0,

            // Sync
            connect_timeout_secs: 30,
            sntp_timeout_ms: 5000,
            retry_backoff_min_secs: 30,
            retry_backoff_max_secs: 3600,

            // Timing
            tick_interval_ms: 1000,
            progress_frame_ms: 200,
            error_pause_ms: 500,
            watchdog_timeout_secs: 60,

            // Display
            display_interval_minutes: 5,
            brightness: 1,
            blink_rate: 0,

            // Cron
            cron_delay_window_secs: 6,
            maintenance_hour: 2,
        }
    }
}

/// Earliest and latest real-world UTC offsets.
const MIN_UTC_OFFSET_SECS: i32 = -12 * 3600;
const MAX_UTC_OFFSET_SECS: i32 = 14 * 3600;

impl ClockConfig {
    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_UTC_OFFSET_SECS..=MAX_UTC_OFFSET_SECS).contains(&self.utc_offset_secs) {
            return Err(Error::Config("utc_offset_secs: outside -12h..=+14h"));
        }
        if self.ntp_server.is_empty() {
            return Err(Error::Config("ntp_server: empty"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::Config("connect_timeout_secs: must be non-zero"));
        }
        if self.sntp_timeout_ms == 0 {
            return Err(Error::Config("sntp_timeout_ms: must be non-zero"));
        }
        if self.retry_backoff_min_secs == 0 || self.retry_backoff_min_secs > self.retry_backoff_max_secs {
            return Err(Error::Config("retry_backoff: need 0 < min <= max"));
        }
        if self.tick_interval_ms == 0 || self.progress_frame_ms == 0 {
            return Err(Error::Config("tick/progress interval: must be non-zero"));
        }
        if u64::from(self.watchdog_timeout_secs) * 1000 <= self.longest_blocking_ms() {
            return Err(Error::Config("watchdog_timeout_secs: must exceed the initial sync"));
        }
        if self.display_interval_minutes == 0 || self.display_interval_minutes > 60 {
            return Err(Error::Config("display_interval_minutes: must be 1..=60"));
        }
        if self.brightness > 15 {
            return Err(Error::Config("brightness: must be 0..=15"));
        }
        if self.blink_rate > 3 {
            return Err(Error::Config("blink_rate: must be 0..=3"));
        }
        if self.cron_delay_window_secs == 0 || self.cron_delay_window_secs > 59 {
            return Err(Error::Config("cron_delay_window_secs: must be 1..=59"));
        }
        if self.maintenance_hour > 23 {
            return Err(Error::Config("maintenance_hour: must be 0..=23"));
        }
        Ok(())
    }

    /// Parse a JSON document (missing fields take their defaults) and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration from compile-time environment.
    ///
    /// `SEGCLOCK_CONFIG_JSON` wins when set; otherwise the individual
    /// `SEGCLOCK_WIFI_SSID`, `SEGCLOCK_WIFI_PASSWORD`, `SEGCLOCK_NTP_SERVER`
    /// and `SEGCLOCK_UTC_OFFSET_SECS` variables are overlaid on the defaults.
    pub fn from_build_env() -> Result<Self> {
        if let Some(json) = option_env!("SEGCLOCK_CONFIG_JSON") {
            return Self::from_json(json);
        }
        Self::from_parts(
            option_env!("SEGCLOCK_WIFI_SSID"),
            option_env!("SEGCLOCK_WIFI_PASSWORD"),
            option_env!("SEGCLOCK_NTP_SERVER"),
            option_env!("SEGCLOCK_UTC_OFFSET_SECS"),
        )
    }

    fn from_parts(
        ssid: Option<&str>,
        password: Option<&str>,
        ntp_server: Option<&str>,
        utc_offset: Option<&str>,
    ) -> Result<Self> {
        let mut config = Self::default();
        if let Some(ssid) = ssid {
            config.wifi_ssid =
                String::try_from(ssid).map_err(|_| Error::Config("wifi_ssid: longer than 32 bytes"))?;
        }
        if let Some(password) = password {
            config.wifi_password = String::try_from(password)
                .map_err(|_| Error::Config("wifi_password: longer than 64 bytes"))?;
        }
        if let Some(server) = ntp_server {
            config.ntp_server = String::try_from(server)
                .map_err(|_| Error::Config("ntp_server: longer than 64 bytes"))?;
        }
        if let Some(offset) = utc_offset {
            config.utc_offset_secs = offset
                .trim()
                .parse()
                .map_err(|_| Error::Config("utc_offset_secs: not an integer"))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Connection deadline in milliseconds.
    pub fn connect_timeout_ms(&self) -> u64 {
        u64::from(self.connect_timeout_secs) * 1000
    }

    /// Worst case for the initial sync before the watchdog is first fed:
    /// the full deadline plus the last progress frame (expiry is strict),
    /// an SNTP exchange for a link that came up just in time, and the
    /// error pause.
    pub fn longest_blocking_ms(&self) -> u64 {
        self.connect_timeout_ms()
            + u64::from(self.progress_frame_ms)
            + u64::from(self.sntp_timeout_ms)
            + u64::from(self.error_pause_ms)
    }
}

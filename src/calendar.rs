//! Broken-down local calendar time.
//!
//! The time source hands the core a [`CalendarTime`] with the configured
//! UTC offset already applied. The core only ever compares fields; it never
//! does date arithmetic itself.

use chrono::{DateTime, Datelike, Timelike};

/// Wall-clock reading with one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Convert unix seconds (UTC) to local calendar time using a fixed offset.
    ///
    /// Returns `None` when the result is outside the representable range
    /// (years before 0 or after 65535).
    pub fn from_unix(unix_secs: i64, utc_offset_secs: i32) -> Option<Self> {
        let local = unix_secs.checked_add(i64::from(utc_offset_secs))?;
        let dt = DateTime::from_timestamp(local, 0)?;
        let year = u16::try_from(dt.year()).ok()?;
        Some(Self {
            year,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        })
    }
}

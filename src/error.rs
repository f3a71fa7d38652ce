//! Unified error types for the clock firmware.
//!
//! Every variant is `Copy` so failures can be latched in state machines and
//! carried in [`AppEvent`](crate::app::events::AppEvent)s without allocation.
//! None of these ever terminate the main loop: network failures are recovered
//! locally by the sync state machine, configuration failures are reported
//! once at boot.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A time synchronisation attempt failed.
    Sync(SyncError),
    /// The WiFi station rejected a request.
    Station(StationError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(e) => write!(f, "sync: {e}"),
            Self::Station(e) => write!(f, "station: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Station errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`StationPort`](crate::app::ports::StationPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationError {
    /// No SSID has been configured.
    NoCredentials,
    /// SSID is empty, too long, or not printable ASCII.
    InvalidSsid,
    /// Password length is not valid for WPA2 (8-64 bytes) or open (empty).
    InvalidPassword,
    /// The radio refused to start an association.
    ConnectionFailed,
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl From<StationError> for Error {
    fn from(e: StationError) -> Self {
        Self::Station(e)
    }
}

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

/// Why a synchronisation attempt did not complete.
///
/// A pending association is not an error; it is reported as
/// [`SyncState::ConnectingPending`](crate::sync::SyncState).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// The station did not associate before the connection deadline.
    ConnectionTimeout,
    /// The station refused to start an association.
    Station(StationError),
    /// Associated, but the time server did not answer in time.
    ServerTimeout,
    /// Associated, but the time exchange failed at the network layer.
    Network,
}

impl SyncError {
    /// `true` when the radio link was up and the time exchange itself failed.
    pub const fn is_protocol_failure(self) -> bool {
        matches!(self, Self::ServerTimeout | Self::Network)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionTimeout => write!(f, "connection timed out"),
            Self::Station(e) => write!(f, "station refused connect: {e}"),
            Self::ServerTimeout => write!(f, "time server did not respond"),
            Self::Network => write!(f, "network error during time exchange"),
        }
    }
}

impl From<StationError> for SyncError {
    fn from(e: StationError) -> Self {
        Self::Station(e)
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        Self::Sync(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

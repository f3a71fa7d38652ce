//! WiFi station-mode adapter.
//!
//! Implements [`StationPort`]: raw radio on/off, association start, link
//! state and teardown. Deadlines, retries and the release-after-sync policy
//! live in the sync state machine, not here.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//!   `connect` only starts the association; `is_connected` reports an
//!   associated link with an IP address.
//! - **all other targets**: simulation that associates immediately.

use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

use crate::app::ports::StationPort;
use crate::error::StationError;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), StationError> {
    if ssid.is_empty() {
        return Err(StationError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(StationError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), StationError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(StationError::InvalidPassword);
    }
    Ok(())
}

/// Check credentials the same way [`StationPort::connect`] will.
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), StationError> {
    validate_ssid(ssid)?;
    validate_password(password)
}

// ───────────────────────────────────────────────────────────────
// Station adapter
// ───────────────────────────────────────────────────────────────

pub struct StationAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Simulation: radio powered.
    #[cfg(not(target_os = "espidf"))]
    sim_active: bool,
    /// Simulation: associated.
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    /// Simulation: counts platform_connect() calls.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
}

#[cfg(not(target_os = "espidf"))]
impl Default for StationAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StationAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self { wifi }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            sim_active: false,
            sim_connected: false,
            sim_connect_counter: 0,
        }
    }

    /// Association attempts accepted so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn connect_count(&self) -> u32 {
        self.sim_connect_counter
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_activate(&mut self, on: bool) {
        let result = if on { self.wifi.start() } else { self.wifi.stop() };
        if let Err(e) = result {
            warn!("WiFi: {} failed: {}", if on { "start" } else { "stop" }, e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_activate(&mut self, on: bool) {
        self.sim_active = on;
        if !on {
            self.sim_connected = false;
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_active(&self) -> bool {
        self.wifi.is_started().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_active(&self) -> bool {
        self.sim_active
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, ssid: &str, password: &str) -> Result<(), StationError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| StationError::InvalidSsid)?,
            password: password.try_into().map_err(|_| StationError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        self.wifi.set_configuration(&config).map_err(|e| {
            warn!("WiFi: set_configuration failed: {}", e);
            StationError::ConnectionFailed
        })?;
        if !self.platform_is_active() {
            self.platform_activate(true);
        }
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            StationError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, ssid: &str, _password: &str) -> Result<(), StationError> {
        if !self.sim_active {
            warn!("WiFi(sim): connect while radio off");
            return Err(StationError::ConnectionFailed);
        }
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        self.sim_connected = true;
        info!("WiFi(sim): associated with '{}' (attempt {})", ssid, self.sim_connect_counter);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_connected = false;
    }
}

// ───────────────────────────────────────────────────────────────
// StationPort
// ───────────────────────────────────────────────────────────────

impl StationPort for StationAdapter {
    fn activate(&mut self, on: bool) {
        if on != self.platform_is_active() {
            info!("WiFi: radio {}", if on { "on" } else { "off" });
        }
        self.platform_activate(on);
    }

    fn is_active(&self) -> bool {
        self.platform_is_active()
    }

    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), StationError> {
        validate_credentials(ssid, password)?;
        info!("WiFi: connecting to '{}'", ssid);
        self.platform_connect(ssid, password)
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("WiFi: disconnected");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

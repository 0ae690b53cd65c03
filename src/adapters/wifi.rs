//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Connection policy
//!
//! Boot blocks in [`WifiAdapter::connect_with_retry`] until the station
//! associates, retrying at a fixed short interval.  After that the
//! driver's own auto-reconnect handles drops.

use core::fmt;
use log::{info, warn};

use super::utils::is_printable_ascii;
use crate::error::{CommsError, Error};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        match e {
            ConnectivityError::NoCredentials
            | ConnectivityError::InvalidSsid
            | ConnectivityError::InvalidPassword => Self::Config("WiFi credentials rejected"),
            ConnectivityError::ConnectionFailed | ConnectivityError::AlreadyConnected => {
                Self::Comms(CommsError::WifiConnectFailed)
            }
        }
    }
}

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    /// Simulation: number of upcoming connect attempts that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            sim_failures_left: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Simulation: connect attempts made so far (successful or not).
    #[cfg(not(target_os = "espidf"))]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Block until associated, retrying every `retry_ms` milliseconds.
    ///
    /// Only connection failures are retried; bad or missing credentials
    /// return immediately.
    pub fn connect_with_retry(&mut self, retry_ms: u32) -> Result<(), ConnectivityError> {
        loop {
            match self.connect() {
                Ok(()) | Err(ConnectivityError::AlreadyConnected) => return Ok(()),
                Err(ConnectivityError::ConnectionFailed) => {
                    std::thread::sleep(std::time::Duration::from_millis(u64::from(retry_ms)));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Simulation: make the next `n` connect attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next_connects(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.bring_up(&conf).map_err(|e| {
            warn!("WiFi(espidf): {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        if let Ok(ip) = self.driver.wifi().sta_netif().get_ip_info() {
            info!("WiFi(espidf): IP {:?}", ip.ip);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn bring_up(
        &mut self,
        conf: &esp_idf_svc::wifi::Configuration,
    ) -> Result<(), esp_idf_svc::sys::EspError> {
        self.driver.set_configuration(conf)?;
        if !self.driver.is_started()? {
            self.driver.start()?;
        }
        self.driver.connect()?;
        self.driver.wait_netif_up()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!("WiFi(sim): simulated association failure (attempt {})", self.attempts);
            return Err(ConnectivityError::ConnectionFailed);
        }
        info!("WiFi(sim): connected to '{}' (attempt {})", self.ssid, self.attempts);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi(espidf): disconnect: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        self.attempts = self.attempts.saturating_add(1);
        if self.attempts == 1 {
            info!("WiFi: connecting to '{}'", self.ssid);
        }
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected after {} attempt(s)", self.attempts);
                Ok(())
            }
            Err(e) => {
                self.state = WifiState::Disconnected;
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

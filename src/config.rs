//! System configuration parameters
//!
//! All tunable parameters for the GasGuard firmware.  Everything is
//! compiled in; there is no runtime provisioning path.  Network secrets
//! come from build-time environment variables so they never land in the
//! source tree.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Sensor report + heartbeat interval (milliseconds)
    pub sensor_report_interval_ms: u32,
    /// Buzzer self-test step interval (milliseconds)
    pub buzzer_step_interval_ms: u32,
    /// Diagnostic dump interval (milliseconds)
    pub diagnostic_dump_interval_ms: u32,
    /// Sleep between orchestrator passes (milliseconds)
    pub loop_idle_ms: u32,

    // --- Diagnostics ---
    /// Echo the last sensor values to the log on every dump interval
    pub diagnostic_dump_enabled: bool,

    // --- Sensors ---
    /// Full-scale raw ADC reading (maps to 100 %)
    pub adc_max_raw: u16,

    // --- Remote commands ---
    /// Smoke threshold until the database pushes one
    pub default_smoke_threshold: i32,

    // --- Realtime database ---
    /// Delay before a dropped event stream reconnects (milliseconds)
    pub stream_retry_ms: u32,
    /// Refresh the ID token this many seconds before it expires
    pub token_refresh_margin_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            sensor_report_interval_ms: 5_000,
            buzzer_step_interval_ms: 1_000,
            diagnostic_dump_interval_ms: 5_000,
            loop_idle_ms: 10,

            // Diagnostics
            diagnostic_dump_enabled: false,

            // Sensors
            adc_max_raw: crate::pins::ADC_MAX_RAW,

            // Remote commands
            default_smoke_threshold: 20,

            // Realtime database
            stream_retry_ms: 2_000,
            token_refresh_margin_secs: 300,
        }
    }
}

impl SystemConfig {
    /// Reject values that would stall or break the main loop.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sensor_report_interval_ms == 0 {
            return Err(Error::Config("sensor_report_interval_ms must be > 0"));
        }
        if self.buzzer_step_interval_ms == 0 {
            return Err(Error::Config("buzzer_step_interval_ms must be > 0"));
        }
        if self.diagnostic_dump_interval_ms == 0 {
            return Err(Error::Config("diagnostic_dump_interval_ms must be > 0"));
        }
        if self.adc_max_raw == 0 {
            return Err(Error::Config("adc_max_raw must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Network configuration
// ---------------------------------------------------------------------------

/// Credentials and endpoints for WiFi and the realtime database.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    /// Web API key of the Firebase project.
    pub api_key: &'static str,
    /// Database URL, e.g. `https://my-project-default-rtdb.firebaseio.com/`.
    pub database_url: &'static str,
    pub ntp_server: &'static str,
}

impl NetworkConfig {
    /// Build from `GASGUARD_*` variables captured at compile time.
    /// Missing variables become empty strings and fail [`validate`](Self::validate).
    pub fn from_build_env() -> Self {
        Self {
            wifi_ssid: option_env!("GASGUARD_WIFI_SSID").unwrap_or(""),
            wifi_password: option_env!("GASGUARD_WIFI_PASSWORD").unwrap_or(""),
            api_key: option_env!("GASGUARD_API_KEY").unwrap_or(""),
            database_url: option_env!("GASGUARD_DATABASE_URL").unwrap_or(""),
            ntp_server: "pool.ntp.org",
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.wifi_ssid.is_empty() {
            return Err(Error::Config("GASGUARD_WIFI_SSID not set at build time"));
        }
        if self.api_key.is_empty() {
            return Err(Error::Config("GASGUARD_API_KEY not set at build time"));
        }
        if crate::rtdb::normalize_host(self.database_url).is_empty() {
            return Err(Error::Config("GASGUARD_DATABASE_URL not set at build time"));
        }
        Ok(())
    }
}

//! ESP32 time adapter.
//!
//! Implements [`ClockPort`] for the GasGuard firmware.
//!
//! - **`target_os = "espidf"`** — monotonic time from `esp_timer_get_time()`
//!   (microsecond precision), wall clock from `gettimeofday()`, which SNTP
//!   keeps in sync once [`start_sntp`] has been called.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` and
//!   `SystemTime` for host-side testing and simulation.

use crate::app::ports::ClockPort;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Seconds since the Unix epoch.  Near zero until SNTP has synced.
    #[cfg(target_os = "espidf")]
    fn wall_clock_secs(&self) -> u64 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec.max(0) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn wall_clock_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }

    fn epoch_secs(&self) -> u64 {
        self.wall_clock_secs()
    }
}

/// Start background SNTP against `server`.  The returned handle must be
/// kept alive for the clock to stay in sync.
#[cfg(target_os = "espidf")]
pub fn start_sntp(
    server: &'static str,
) -> Result<esp_idf_svc::sntp::EspSntp<'static>, crate::error::CommsError> {
    use esp_idf_svc::sntp::{EspSntp, SntpConf};

    let mut conf = SntpConf::default();
    conf.servers[0] = server;
    let sntp = EspSntp::new(&conf).map_err(|e| {
        log::error!("SNTP: start failed: {}", e);
        crate::error::CommsError::SntpStartFailed
    })?;
    log::info!("SNTP: syncing against {}", server);
    Ok(sntp)
}

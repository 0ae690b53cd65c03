//! GasGuard Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        FirebaseAdapter      LogEventSink      │
//! │  (Sensor+Buzzer+LED)    (RemoteState)        (EventSink)       │
//! │  WifiAdapter            Esp32TimeAdapter                       │
//! │  (Connectivity)         (Clock, SNTP)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Reporter · Listener · BuzzerSequencer · Scheduler     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use gasguard::adapters::firebase::FirebaseAdapter;
use gasguard::adapters::hardware::HardwareAdapter;
use gasguard::adapters::log_sink::LogEventSink;
use gasguard::adapters::time::{Esp32TimeAdapter, start_sntp};
use gasguard::adapters::wifi::{ConnectivityPort, WifiAdapter};
use gasguard::app::service::AppService;
use gasguard::config::{NetworkConfig, SystemConfig};
use gasguard::drivers::hw_init;
use gasguard::error::Error;

/// Delay between WiFi association attempts at boot.
const WIFI_RETRY_MS: u32 = 300;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GasGuard v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Compiled-in configuration ──────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    let net = NetworkConfig::from_build_env();
    net.validate()?;

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Outputs stay inert; the remote half still runs.
        error!("HAL init failed: {}", e);
    }
    let mut hw = HardwareAdapter::new();

    // ── 4. WiFi (blocks until associated) ─────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver);
    wifi.set_credentials(net.wifi_ssid, net.wifi_password)
        .map_err(Error::from)?;
    wifi.connect_with_retry(WIFI_RETRY_MS).map_err(Error::from)?;

    // ── 5. Wall clock ─────────────────────────────────────────
    let _sntp = match start_sntp(net.ntp_server) {
        Ok(sntp) => Some(sntp),
        Err(e) => {
            warn!("SNTP unavailable ({}); heartbeat timestamps will lag", e);
            None
        }
    };
    let clock = Esp32TimeAdapter::new();

    // ── 6. Realtime database + app service ────────────────────
    let mut firebase = FirebaseAdapter::new(&net, &config)?;
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut firebase, &mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 7. Main loop ──────────────────────────────────────────
    let idle = Duration::from_millis(u64::from(config.loop_idle_ms));
    loop {
        app.run_pass(&mut hw, &mut firebase, &clock, &mut log_sink);
        std::thread::sleep(idle);
    }
}

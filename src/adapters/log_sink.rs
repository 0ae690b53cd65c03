//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the ESP-IDF logger (UART in production).  Failures go out at `warn`,
//! ignored values at `debug`, everything else at `info`.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { signed_in } => {
                info!("START | signed_in={}", signed_in);
            }
            AppEvent::SignUpFailed(e) => {
                warn!("AUTH  | sign-up failed: {} (remote half disabled)", e);
            }
            AppEvent::WatchStarted { path } => {
                info!("WATCH | {} open", path);
            }
            AppEvent::WatchFailed { path, error } => {
                warn!("WATCH | {} begin error: {}", path, error);
            }
            AppEvent::SensorWritten { channel, percent } => {
                info!("SENSE | sensor{} = {}%", channel, percent);
            }
            AppEvent::SensorWriteFailed { channel, error } => {
                warn!("SENSE | sensor{} write failed: {}", channel, error);
            }
            AppEvent::HeartbeatSent { epoch_secs } => {
                info!("BEAT  | lastSeen = {}", epoch_secs);
            }
            AppEvent::HeartbeatFailed(e) => {
                warn!("BEAT  | heartbeat failed: {}", e);
            }
            AppEvent::WatchReadFailed { path, error } => {
                warn!("WATCH | {} read error: {}", path, error);
            }
            AppEvent::ValueIgnored { path, tag } => {
                debug!("WATCH | {} ignored value of type {}", path, tag);
            }
            AppEvent::BuzzerTestChanged(on) => {
                info!("CMD   | buzzer test {}", if *on { "on" } else { "off" });
            }
            AppEvent::SmokeThresholdChanged(t) => {
                info!("CMD   | smoke threshold = {}", t);
            }
            AppEvent::BuzzerStep { phase } => {
                info!("BUZZ  | state {} ({})", phase.index(), phase.pattern());
            }
            AppEvent::LinkChanged(online) => {
                if *online {
                    info!("LINK  | online");
                } else {
                    warn!("LINK  | offline");
                }
            }
            AppEvent::Diagnostics { sensor_values } => {
                info!(
                    "DIAG  | sensors = {}% {}% {}% {}%",
                    sensor_values[0], sensor_values[1], sensor_values[2], sensor_values[3]
                );
            }
        }
    }
}

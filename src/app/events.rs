//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Every observable action
//! in the core (each remote write attempt, each accepted command, each
//! buzzer step) maps to exactly one event.

use crate::error::RemoteError;
use crate::pins::SENSOR_COUNT;
use crate::rtdb::ValueTag;

use super::buzzer::BuzzerPhase;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup finished; `signed_in` tells whether the remote half is live.
    Started { signed_in: bool },

    /// Anonymous sign-up failed.  Reporting and listening stay off.
    SignUpFailed(RemoteError),

    WatchStarted { path: &'static str },
    WatchFailed { path: &'static str, error: RemoteError },

    /// A sensor percentage was written (channel is 1-based).
    SensorWritten { channel: u8, percent: i32 },
    SensorWriteFailed { channel: u8, error: RemoteError },

    /// Heartbeat timestamp written.
    HeartbeatSent { epoch_secs: u64 },
    HeartbeatFailed(RemoteError),

    /// Polling a watched path failed; the path is skipped this pass.
    WatchReadFailed { path: &'static str, error: RemoteError },

    /// A value of the wrong type arrived on a watched path.
    ValueIgnored { path: &'static str, tag: ValueTag },

    BuzzerTestChanged(bool),
    SmokeThresholdChanged(i32),

    /// The sequencer applied `phase`.
    BuzzerStep { phase: BuzzerPhase },

    /// Remote preconditions started (`true`) or stopped holding.
    LinkChanged(bool),

    /// Throttled echo of the last reported sensor values.
    Diagnostics { sensor_values: [i32; SENSOR_COUNT] },
}

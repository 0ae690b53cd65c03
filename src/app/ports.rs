//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (ADC, buzzers, LED, clock, realtime database, event
//! sinks) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::error::RemoteError;
use crate::rtdb::RemoteValue;

use super::buzzer::BuzzerPattern;
use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the analog gas sensors.
pub trait SensorPort {
    /// Raw ADC sample for sensor `channel` (0-based).  Out-of-range
    /// channels read as 0.
    fn read_analog(&mut self, channel: usize) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Buzzer / indicator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait BuzzerPort {
    /// Drive all four buzzer channels to `pattern` in one step.
    fn apply_pattern(&mut self, pattern: BuzzerPattern);

    /// Force every buzzer channel low.
    fn all_low(&mut self) {
        self.apply_pattern(BuzzerPattern::SILENT);
    }
}

pub trait IndicatorPort {
    fn set_status_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Wall-clock seconds since the Unix epoch (0 before NTP sync).
    fn epoch_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Remote state port (driven adapter: domain ↔ realtime database)
// ───────────────────────────────────────────────────────────────

/// Outcome of a successful [`RemoteStatePort::poll_watch`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchPoll {
    /// Latest value written to the path since the previous poll, if any.
    pub value: Option<RemoteValue>,
}

impl WatchPoll {
    pub fn nothing() -> Self {
        Self { value: None }
    }

    pub fn new_value(value: RemoteValue) -> Self {
        Self { value: Some(value) }
    }
}

/// Cloud key/value store with point writes and watched paths.
///
/// Every method may block for a network round trip.  Failures are
/// reported inline; the domain logs them and carries on.
pub trait RemoteStatePort {
    /// Whether the client can currently issue authenticated requests.
    /// May refresh credentials as a side effect.
    fn is_ready(&mut self) -> bool;

    /// One-time anonymous sign-up.
    fn sign_up(&mut self) -> Result<(), RemoteError>;

    fn write_int(&mut self, path: &str, value: i64) -> Result<(), RemoteError>;

    /// Start watching `path`.  Called once per path at startup.
    fn begin_watch(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Take the latest value observed on a watched path.
    fn poll_watch(&mut self, path: &str) -> Result<WatchPoll, RemoteError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

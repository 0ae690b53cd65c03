//! Realtime-database protocol helpers.
//!
//! Pure, allocation-light building blocks shared by the Firebase adapter
//! on ESP-IDF and by host-side tests:
//!
//! ```text
//!  ┌──────────────┐   PUT  <host>/<path>.json?auth=<token>   ┌──────────┐
//!  │              │ ───────────────────────────────────────▶ │          │
//!  │   Firebase   │   GET  (Accept: text/event-stream)       │ Realtime │
//!  │   adapter    │ ◀─────────────────────────────────────── │ Database │
//!  │              │        event: put / data: {...}          │          │
//!  └──────────────┘                                          └──────────┘
//!        │ codec  — JSON value ⇄ tagged RemoteValue
//!        │ stream — server-sent-events decoder
//!        │ auth   — anonymous sign-up + ID-token refresh
//! ```

pub mod auth;
pub mod codec;
pub mod stream;

pub use codec::{RemoteValue, ValueTag};

/// Database paths the device reads and writes.
pub mod paths {
    /// Device-written sensor percentages, channels 1–4.
    pub const SENSOR_VALUES: [&str; 4] = [
        "sensorValue/sensor1",
        "sensorValue/sensor2",
        "sensorValue/sensor3",
        "sensorValue/sensor4",
    ];
    /// Device-written heartbeat (epoch seconds).
    pub const LAST_SEEN: &str = "thingStat/lastSeen";
    /// Externally-written boolean: run the buzzer self-test.
    pub const BUZZER_TEST: &str = "userInput/buzzerTest";
    /// Externally-written integer: smoke alarm threshold.
    pub const SMOKE_THRESHOLD: &str = "userInput/smokeThreshold";
}

/// Strip scheme and trailing slashes from a database URL.
///
/// Accepts both `https://x.firebaseio.com/` and bare `x.firebaseio.com`.
pub fn normalize_host(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.trim_end_matches('/')
}

/// Canonical form of a database path: no leading or trailing slash.
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// REST endpoint for `path`, optionally authenticated with an ID token.
pub fn rest_url(host: &str, path: &str, id_token: Option<&str>) -> String {
    let mut url = format!(
        "https://{}/{}.json",
        normalize_host(host),
        normalize_path(path)
    );
    if let Some(token) = id_token {
        url.push_str("?auth=");
        url.push_str(token);
    }
    url
}

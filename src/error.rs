//! Unified error types for the GasGuard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level error handling uniform.  All variants are `Copy` so they can be
//! carried inside [`AppEvent`](crate::app::events::AppEvent)s and logged
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A realtime-database operation failed.
    Remote(RemoteError),
    /// Network connectivity failed.
    Comms(CommsError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Realtime-database errors
// ---------------------------------------------------------------------------

/// Failure reason reported by the remote state client.
///
/// Every remote operation reports one of these inline; callers log it and
/// carry on.  Nothing here is retried by the domain layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// Client not ready (no token, token expired and refresh failed).
    NotReady,
    /// Anonymous sign-up has not succeeded.
    NotSignedIn,
    /// `poll_watch` on a path that was never passed to `begin_watch`.
    NotWatching,
    /// Watch table is full.
    TooManyWatches,
    /// The server answered with a non-success HTTP status.
    Http(u16),
    /// Socket / TLS / HTTP client failure (raw `esp_err_t`).
    Transport(i32),
    /// Response body could not be decoded.
    Malformed(&'static str),
    /// The event stream was closed by the server.
    StreamClosed,
    /// The server revoked the stream's credentials.
    AuthRevoked,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "client not ready"),
            Self::NotSignedIn => write!(f, "not signed in"),
            Self::NotWatching => write!(f, "path is not being watched"),
            Self::TooManyWatches => write!(f, "watch table full"),
            Self::Http(403) => write!(f, "permission denied (HTTP 403)"),
            Self::Http(401) => write!(f, "unauthorized (HTTP 401)"),
            Self::Http(status) => write!(f, "HTTP status {status}"),
            Self::Transport(code) => write!(f, "transport error (esp_err={code})"),
            Self::Malformed(what) => write!(f, "malformed response: {what}"),
            Self::StreamClosed => write!(f, "stream closed by server"),
            Self::AuthRevoked => write!(f, "stream auth revoked"),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    SntpStartFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::SntpStartFailed => write!(f, "SNTP start failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

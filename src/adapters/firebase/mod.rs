//! Firebase Realtime Database adapter.
//!
//! Implements [`RemoteStatePort`] on top of the REST/streaming interface:
//!
//! ```text
//!   AppService ──write_int──▶ PUT  <host>/<path>.json?auth=<id token>
//!              ──sign_up───▶ POST identitytoolkit accounts:signUp
//!              ──is_ready──▶ POST securetoken token   (near expiry only)
//!              ──begin_watch──▶ reader thread per path
//!                                 GET <path>.json  Accept: text/event-stream
//!                                   │ StreamDecoder
//!                                   ▼
//!              ◀─poll_watch── WatchSlot mailbox (latest value | error)
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: HTTPS via `esp_idf_svc::http::client`
//!   (see `esp_impl`), one core-pinned reader thread per watch.
//! - **all other targets**: an in-memory backend.  Tests push stream
//!   events with [`FirebaseAdapter::sim_push`] / [`FirebaseAdapter::sim_feed`]
//!   and inspect writes with [`FirebaseAdapter::sim_writes`].

#[cfg(target_os = "espidf")]
mod esp_impl;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use serde_json::Value;

use super::time::Esp32TimeAdapter;
use super::utils::is_printable_ascii;
use crate::app::ports::{ClockPort, RemoteStatePort, WatchPoll};
use crate::config::{NetworkConfig, SystemConfig};
use crate::error::{Error, RemoteError};
use crate::rtdb::auth::{AuthSession, RefreshResponse, SignUpResponse};
use crate::rtdb::stream::StreamEvent;
use crate::rtdb::{self, RemoteValue};

#[cfg(not(target_os = "espidf"))]
use crate::rtdb::stream::StreamDecoder;

/// Upper bound on concurrently watched paths.
pub const MAX_WATCHES: usize = 4;

// ───────────────────────────────────────────────────────────────
// Watch mailbox
// ───────────────────────────────────────────────────────────────

/// Latest state observed on one watched path, shared between the stream
/// reader and the orchestrator.
#[derive(Debug, Default)]
pub struct WatchSlot {
    latest: Option<RemoteValue>,
    error: Option<RemoteError>,
    events: u32,
}

pub type SharedSlot = Arc<Mutex<WatchSlot>>;

pub(crate) fn lock_slot(slot: &Mutex<WatchSlot>) -> MutexGuard<'_, WatchSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WatchSlot {
    /// Fold one stream event into the mailbox.
    ///
    /// Returns `false` when the server ended the subscription and the
    /// stream has to be reopened.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        self.events = self.events.wrapping_add(1);
        match event {
            StreamEvent::Put { path, data } => {
                let child = rtdb::normalize_path(&path);
                let value = if child.is_empty() {
                    data
                } else {
                    // A child of the watched node changed; the node itself
                    // is an object now.
                    let mut map = serde_json::Map::new();
                    map.insert(child.to_owned(), data);
                    Value::Object(map)
                };
                self.latest = Some(RemoteValue::from_json(value));
                true
            }
            StreamEvent::Patch { data, .. } => {
                self.latest = Some(RemoteValue::from_json(data));
                true
            }
            StreamEvent::KeepAlive => true,
            StreamEvent::Cancel => {
                self.error = Some(RemoteError::Http(403));
                false
            }
            StreamEvent::AuthRevoked => {
                self.error = Some(RemoteError::AuthRevoked);
                false
            }
        }
    }

    /// Record a reader failure unless a more specific error is pending.
    pub fn fail(&mut self, error: RemoteError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Drain the mailbox.  A pending error is reported before any value.
    pub fn take(&mut self) -> Result<WatchPoll, RemoteError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        Ok(WatchPoll {
            value: self.latest.take(),
        })
    }

    /// Events applied since the slot was created.
    pub fn event_count(&self) -> u32 {
        self.events
    }
}

struct Watch {
    path: String,
    slot: SharedSlot,
    #[cfg(not(target_os = "espidf"))]
    decoder: StreamDecoder,
}

// ───────────────────────────────────────────────────────────────
// Host backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
struct SimBackend {
    sign_up_error: Option<RemoteError>,
    refresh_error: Option<RemoteError>,
    next_write_error: Option<RemoteError>,
    token_lifetime_secs: u64,
    tokens_issued: u32,
    writes: Vec<(String, i64)>,
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimBackend {
    fn default() -> Self {
        Self {
            sign_up_error: None,
            refresh_error: None,
            next_write_error: None,
            token_lifetime_secs: 3600,
            tokens_issued: 0,
            writes: Vec::new(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct FirebaseAdapter {
    api_key: &'static str,
    host: String,
    session: Option<AuthSession>,
    /// Current ID token, shared with the stream readers so that a
    /// reopened stream picks up refreshed credentials.
    token: Arc<Mutex<String>>,
    refresh_margin_secs: u32,
    stream_retry_ms: u32,
    /// Earliest time a failed refresh may be retried.
    next_refresh_ms: u64,
    clock: Esp32TimeAdapter,
    watches: heapless::Vec<Watch, MAX_WATCHES>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBackend,
}

impl FirebaseAdapter {
    pub fn new(net: &NetworkConfig, config: &SystemConfig) -> Result<Self, Error> {
        if net.api_key.is_empty() || !is_printable_ascii(net.api_key) {
            return Err(Error::Config("database API key missing or not printable"));
        }
        let host = rtdb::normalize_host(net.database_url);
        if host.is_empty() || !is_printable_ascii(host) {
            return Err(Error::Config("database URL missing or not printable"));
        }
        info!("RTDB: host {}", host);
        Ok(Self {
            api_key: net.api_key,
            host: host.to_owned(),
            session: None,
            token: Arc::new(Mutex::new(String::new())),
            refresh_margin_secs: config.token_refresh_margin_secs,
            stream_retry_ms: config.stream_retry_ms,
            next_refresh_ms: 0,
            clock: Esp32TimeAdapter::new(),
            watches: heapless::Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim: SimBackend::default(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn id_token(&self) -> Option<&str> {
        self.session.as_ref().map(AuthSession::id_token)
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    fn find_watch(&self, path: &str) -> Option<&Watch> {
        let path = rtdb::normalize_path(path);
        self.watches.iter().find(|w| w.path == path)
    }

    fn install_token(&self, token: &str) {
        let mut shared = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        shared.clear();
        shared.push_str(token);
    }

    /// Refresh the ID token when it is close to expiry.
    fn maybe_refresh(&mut self, now: u64) {
        let Some(session) = &self.session else {
            return;
        };
        if !session.needs_refresh(now, self.refresh_margin_secs) || now < self.next_refresh_ms {
            return;
        }
        let refresh_token = session.refresh_token().to_owned();
        let applied = self
            .transport_refresh(&refresh_token)
            .and_then(|resp| match self.session.as_mut() {
                Some(s) => s.apply_refresh(resp, now),
                None => Err(RemoteError::NotSignedIn),
            });
        match applied {
            Ok(()) => {
                if let Some(token) = self.session.as_ref().map(|s| s.id_token().to_owned()) {
                    self.install_token(&token);
                }
                info!("RTDB: ID token refreshed");
            }
            Err(e) => {
                self.next_refresh_ms = now.saturating_add(u64::from(self.stream_retry_ms));
                warn!("RTDB: token refresh failed: {}", e);
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn transport_sign_up(&mut self) -> Result<SignUpResponse, RemoteError> {
        use crate::rtdb::auth::{self, SignUpRequest};

        let body = serde_json::to_vec(&SignUpRequest::default())
            .map_err(|_| RemoteError::Malformed("sign-up body"))?;
        let (status, resp) =
            esp_impl::post(&auth::sign_up_url(self.api_key), "application/json", &body)?;
        if !(200..300).contains(&status) {
            if let Some(msg) = auth::error_message(&resp) {
                warn!("RTDB: sign-up rejected: {}", msg);
            }
            return Err(RemoteError::Http(status));
        }
        serde_json::from_slice(&resp).map_err(|_| RemoteError::Malformed("sign-up response"))
    }

    #[cfg(not(target_os = "espidf"))]
    fn transport_sign_up(&mut self) -> Result<SignUpResponse, RemoteError> {
        if let Some(e) = self.sim.sign_up_error {
            return Err(e);
        }
        info!(
            "RTDB(sim): anonymous sign-up ({}-byte API key)",
            self.api_key.len()
        );
        self.sim.tokens_issued += 1;
        Ok(SignUpResponse {
            id_token: format!("sim-id-{}", self.sim.tokens_issued),
            refresh_token: "sim-refresh".into(),
            expires_in: self.sim.token_lifetime_secs.to_string(),
            local_id: "sim-uid".into(),
        })
    }

    #[cfg(target_os = "espidf")]
    fn transport_refresh(&mut self, refresh_token: &str) -> Result<RefreshResponse, RemoteError> {
        use crate::rtdb::auth;

        let body = auth::refresh_body(refresh_token);
        let (status, resp) = esp_impl::post(
            &auth::refresh_url(self.api_key),
            "application/x-www-form-urlencoded",
            body.as_bytes(),
        )?;
        if !(200..300).contains(&status) {
            if let Some(msg) = auth::error_message(&resp) {
                warn!("RTDB: refresh rejected: {}", msg);
            }
            return Err(RemoteError::Http(status));
        }
        serde_json::from_slice(&resp).map_err(|_| RemoteError::Malformed("refresh response"))
    }

    #[cfg(not(target_os = "espidf"))]
    fn transport_refresh(&mut self, refresh_token: &str) -> Result<RefreshResponse, RemoteError> {
        if let Some(e) = self.sim.refresh_error {
            return Err(e);
        }
        self.sim.tokens_issued += 1;
        Ok(RefreshResponse {
            id_token: format!("sim-id-{}", self.sim.tokens_issued),
            refresh_token: refresh_token.to_owned(),
            expires_in: self.sim.token_lifetime_secs.to_string(),
        })
    }

    #[cfg(target_os = "espidf")]
    fn transport_put(&mut self, path: &str, value: i64) -> Result<(), RemoteError> {
        let token = self.id_token().ok_or(RemoteError::NotSignedIn)?;
        let url = rtdb::rest_url(&self.host, path, Some(token));
        let body = rtdb::codec::encode_int(value);
        let (status, _) = esp_impl::put(&url, body.as_bytes())?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(RemoteError::Http(status))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn transport_put(&mut self, path: &str, value: i64) -> Result<(), RemoteError> {
        if let Some(e) = self.sim.next_write_error.take() {
            return Err(e);
        }
        self.sim
            .writes
            .push((rtdb::normalize_path(path).to_owned(), value));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn transport_open_watch(&mut self, path: &str, slot: SharedSlot) -> Result<(), RemoteError> {
        esp_impl::spawn_stream_reader(esp_impl::StreamTarget {
            path: path.to_owned(),
            url: rtdb::rest_url(&self.host, path, None),
            token: Arc::clone(&self.token),
            slot,
            retry_ms: self.stream_retry_ms,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn transport_open_watch(&mut self, path: &str, _slot: SharedSlot) -> Result<(), RemoteError> {
        info!("RTDB(sim): watching /{}", path);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// RemoteStatePort
// ───────────────────────────────────────────────────────────────

impl RemoteStatePort for FirebaseAdapter {
    fn is_ready(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.maybe_refresh(now);
        self.session.as_ref().is_some_and(|s| !s.is_expired(now))
    }

    fn sign_up(&mut self) -> Result<(), RemoteError> {
        let now = self.clock.now_ms();
        let resp = self.transport_sign_up()?;
        let session = AuthSession::from_sign_up(resp, now)?;
        self.install_token(session.id_token());
        info!("RTDB: signed up anonymously (uid={})", session.uid);
        self.session = Some(session);
        Ok(())
    }

    fn write_int(&mut self, path: &str, value: i64) -> Result<(), RemoteError> {
        if self.session.is_none() {
            return Err(RemoteError::NotSignedIn);
        }
        if !self.is_ready() {
            return Err(RemoteError::NotReady);
        }
        self.transport_put(path, value)
    }

    fn begin_watch(&mut self, path: &str) -> Result<(), RemoteError> {
        let path = rtdb::normalize_path(path);
        if self.find_watch(path).is_some() {
            return Ok(());
        }
        if self.session.is_none() {
            return Err(RemoteError::NotSignedIn);
        }
        if self.watches.is_full() {
            return Err(RemoteError::TooManyWatches);
        }
        let slot: SharedSlot = Arc::new(Mutex::new(WatchSlot::default()));
        self.transport_open_watch(path, Arc::clone(&slot))?;
        self.watches
            .push(Watch {
                path: path.to_owned(),
                slot,
                #[cfg(not(target_os = "espidf"))]
                decoder: StreamDecoder::new(),
            })
            .map_err(|_| RemoteError::TooManyWatches)
    }

    fn poll_watch(&mut self, path: &str) -> Result<WatchPoll, RemoteError> {
        let watch = self.find_watch(path).ok_or(RemoteError::NotWatching)?;
        lock_slot(&watch.slot).take()
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation hooks
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl FirebaseAdapter {
    /// Deliver a stream event to the watch on `path`.  Returns `false` if
    /// the path is not watched.
    pub fn sim_push_event(&mut self, path: &str, event: StreamEvent) -> bool {
        match self.find_watch(path) {
            Some(w) => {
                lock_slot(&w.slot).apply(event);
                true
            }
            None => false,
        }
    }

    /// Simulate an external write of `value` to a watched path.
    pub fn sim_push(&mut self, path: &str, value: Value) -> bool {
        self.sim_push_event(
            path,
            StreamEvent::Put {
                path: "/".into(),
                data: value,
            },
        )
    }

    /// Feed raw event-stream bytes to the watch on `path`.
    pub fn sim_feed(&mut self, path: &str, bytes: &[u8]) -> bool {
        let path = rtdb::normalize_path(path);
        let Some(watch) = self.watches.iter_mut().find(|w| w.path == path) else {
            return false;
        };
        let slot = Arc::clone(&watch.slot);
        watch.decoder.feed(bytes, |event| {
            lock_slot(&slot).apply(event);
        });
        true
    }

    /// Record a reader-side failure on `path`.
    pub fn sim_stream_error(&mut self, path: &str, error: RemoteError) -> bool {
        match self.find_watch(path) {
            Some(w) => {
                lock_slot(&w.slot).fail(error);
                true
            }
            None => false,
        }
    }

    pub fn sim_fail_sign_up(&mut self, error: RemoteError) {
        self.sim.sign_up_error = Some(error);
    }

    pub fn sim_fail_refresh(&mut self, error: Option<RemoteError>) {
        self.sim.refresh_error = error;
    }

    pub fn sim_fail_next_write(&mut self, error: RemoteError) {
        self.sim.next_write_error = Some(error);
    }

    /// Lifetime of tokens issued from now on.
    pub fn sim_set_token_lifetime(&mut self, secs: u64) {
        self.sim.token_lifetime_secs = secs;
    }

    /// Successful writes in order, as `(path, value)`.
    pub fn sim_writes(&self) -> &[(String, i64)] {
        &self.sim.writes
    }

    /// Token currently shared with the stream readers.
    pub fn sim_shared_token(&self) -> String {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

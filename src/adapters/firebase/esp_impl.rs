//! ESP-IDF HTTP helpers for `FirebaseAdapter`.
//!
//! Compiled only for `target_os = "espidf"`.  One-shot requests (sign-up,
//! refresh, PUT) open a fresh TLS connection each time; every watched path
//! gets a reader thread that holds an event-stream GET open and reconnects
//! after a fixed delay.
//!
//! All items are `pub(super)` to keep them private to the adapter.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use embedded_svc::http::Method;
use embedded_svc::http::client::Client;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use esp_idf_svc::io::EspIOError;
use esp_idf_svc::sys::EspError;
use log::{info, warn};

use super::{SharedSlot, lock_slot};
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::RemoteError;
use crate::rtdb::stream::StreamDecoder;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The server sends keep-alives every 30 s; a longer silence means the
/// connection is gone.
const STREAM_READ_TIMEOUT: Duration = Duration::from_secs(45);

/// Largest response body accepted from a one-shot request.
const MAX_RESPONSE: usize = 4096;

const READER_PRIORITY: u8 = 5;
const READER_STACK_KB: usize = 8;

fn esp_err(e: EspError) -> RemoteError {
    RemoteError::Transport(e.code())
}

fn io_err(e: EspIOError) -> RemoteError {
    esp_err(e.0)
}

fn new_client(timeout: Duration) -> Result<Client<EspHttpConnection>, RemoteError> {
    let conn = EspHttpConnection::new(&Configuration {
        timeout: Some(timeout),
        crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
        ..Default::default()
    })
    .map_err(esp_err)?;
    Ok(Client::wrap(conn))
}

// ── One-shot requests ─────────────────────────────────────────

fn send(
    method: Method,
    url: &str,
    content_type: &str,
    body: &[u8],
) -> Result<(u16, Vec<u8>), RemoteError> {
    let mut client = new_client(REQUEST_TIMEOUT)?;
    let len = body.len().to_string();
    let headers = [("content-type", content_type), ("content-length", len.as_str())];

    let mut req = client.request(method, url, &headers).map_err(io_err)?;
    req.write_all(body).map_err(io_err)?;
    req.flush().map_err(io_err)?;
    let mut resp = req.submit().map_err(io_err)?;

    let status = resp.status();
    let mut out = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = resp.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        if out.len() + n > MAX_RESPONSE {
            return Err(RemoteError::Malformed("response too large"));
        }
        out.extend_from_slice(&buf[..n]);
    }
    Ok((status, out))
}

pub(super) fn post(url: &str, content_type: &str, body: &[u8]) -> Result<(u16, Vec<u8>), RemoteError> {
    send(Method::Post, url, content_type, body)
}

pub(super) fn put(url: &str, body: &[u8]) -> Result<(u16, Vec<u8>), RemoteError> {
    send(Method::Put, url, "application/json", body)
}

// ── Stream readers ────────────────────────────────────────────

pub(super) struct StreamTarget {
    pub path: String,
    /// REST URL without credentials; the token is appended per connection.
    pub url: String,
    pub token: Arc<Mutex<String>>,
    pub slot: SharedSlot,
    pub retry_ms: u32,
}

pub(super) fn spawn_stream_reader(target: StreamTarget) -> Result<(), RemoteError> {
    let path = target.path.clone();
    spawn_on_core(
        Core::Pro,
        READER_PRIORITY,
        READER_STACK_KB,
        "rtdb-watch\0",
        move || reader_loop(&target),
    )
    .map(|_| ())
    .map_err(|e| {
        warn!("RTDB: reader for /{} not started: {}", path, e);
        RemoteError::Transport(esp_idf_svc::sys::ESP_FAIL)
    })
}

fn reader_loop(target: &StreamTarget) {
    let mut decoder = StreamDecoder::new();
    loop {
        decoder.reset();
        let token = target
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let error = read_stream(target, &token, &mut decoder)
            .err()
            .unwrap_or(RemoteError::StreamClosed);
        lock_slot(&target.slot).fail(error);
        if decoder.malformed_count() > 0 {
            warn!(
                "RTDB: stream /{} carried {} malformed event(s)",
                target.path,
                decoder.malformed_count()
            );
        }
        warn!(
            "RTDB: stream /{} ended ({}); reopening in {} ms",
            target.path, error, target.retry_ms
        );
        std::thread::sleep(Duration::from_millis(u64::from(target.retry_ms)));
    }
}

/// Hold one event-stream connection open until the server ends it.
fn read_stream(
    target: &StreamTarget,
    token: &str,
    decoder: &mut StreamDecoder,
) -> Result<(), RemoteError> {
    let url = format!("{}?auth={}", target.url, token);
    let mut client = new_client(STREAM_READ_TIMEOUT)?;
    let headers = [("accept", "text/event-stream")];
    let req = client
        .request(Method::Get, &url, &headers)
        .map_err(io_err)?;
    let mut resp = req.submit().map_err(io_err)?;
    let status = resp.status();
    if status != 200 {
        return Err(RemoteError::Http(status));
    }
    info!("RTDB: stream /{} open", target.path);

    let mut buf = [0u8; 512];
    loop {
        let n = resp.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            return Ok(());
        }
        let mut open = true;
        decoder.feed(&buf[..n], |event| {
            if !lock_slot(&target.slot).apply(event) {
                open = false;
            }
        });
        if !open {
            return Ok(());
        }
    }
}

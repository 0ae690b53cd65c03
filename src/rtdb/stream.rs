//! Server-sent-events decoder for database streams.
//!
//! Wire format (one event, terminated by a blank line):
//! ```text
//! event: put
//! data: {"path":"/","data":true}
//!
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete events.
//! This handles partial reads gracefully — a single socket read may
//! return half a line, or several events concatenated.

use serde::Deserialize;
use serde_json::Value;

/// Maximum accumulated size of one event's lines (protects against
/// memory exhaustion from a misbehaving server).
const MAX_EVENT_SIZE: usize = 4096;

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Value at `path` (relative to the watched location) replaced.
    Put { path: String, data: Value },
    /// Children at `path` merged.
    Patch { path: String, data: Value },
    /// Server heartbeat, no payload.
    KeepAlive,
    /// Security rules no longer allow reading the location.
    Cancel,
    /// The ID token used to open the stream expired.
    AuthRevoked,
}

#[derive(Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

/// Streaming event decoder.
pub struct StreamDecoder {
    line: Vec<u8>,
    event_name: String,
    data: String,
    /// Current event exceeded [`MAX_EVENT_SIZE`]; skip to the next blank line.
    discarding: bool,
    malformed: u32,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            line: Vec::new(),
            event_name: String::new(),
            data: String::new(),
            discarding: false,
            malformed: 0,
        }
    }

    /// Feed bytes into the decoder, invoking `on_event` for every complete
    /// event.  Unknown event names are skipped; undecodable payloads bump
    /// [`malformed_count`](Self::malformed_count).
    pub fn feed(&mut self, data: &[u8], mut on_event: impl FnMut(StreamEvent)) {
        for &byte in data {
            if byte != b'\n' {
                if self.line.len() + self.data.len() < MAX_EVENT_SIZE {
                    self.line.push(byte);
                } else {
                    self.discarding = true;
                }
                continue;
            }

            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }

            if self.line.is_empty() {
                if !self.discarding {
                    if let Some(event) = self.dispatch() {
                        on_event(event);
                    }
                } else {
                    self.malformed = self.malformed.saturating_add(1);
                }
                self.event_name.clear();
                self.data.clear();
                self.discarding = false;
            } else if !self.discarding {
                self.take_field();
            }
            self.line.clear();
        }
    }

    /// Reset decoder state (e.g. after a stream reconnect).
    pub fn reset(&mut self) {
        self.line.clear();
        self.event_name.clear();
        self.data.clear();
        self.discarding = false;
    }

    /// Events dropped because they were oversized or undecodable.
    pub fn malformed_count(&self) -> u32 {
        self.malformed
    }

    fn take_field(&mut self) {
        // Lines starting with ':' are comments.
        if self.line.first() == Some(&b':') {
            return;
        }
        let Ok(line) = core::str::from_utf8(&self.line) else {
            self.discarding = true;
            return;
        };
        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };
        match field {
            "event" => {
                self.event_name.clear();
                self.event_name.push_str(value);
            }
            "data" => {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let event = match self.event_name.as_str() {
            "put" | "patch" => {
                let Ok(body) = serde_json::from_str::<PathData>(&self.data) else {
                    self.malformed = self.malformed.saturating_add(1);
                    return None;
                };
                if self.event_name == "put" {
                    StreamEvent::Put {
                        path: body.path,
                        data: body.data,
                    }
                } else {
                    StreamEvent::Patch {
                        path: body.path,
                        data: body.data,
                    }
                }
            }
            "keep-alive" => StreamEvent::KeepAlive,
            "cancel" => StreamEvent::Cancel,
            "auth_revoked" => StreamEvent::AuthRevoked,
            _ => return None,
        };
        Some(event)
    }
}

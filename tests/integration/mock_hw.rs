//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history without
//! touching real GPIO/ADC registers or the network.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use gasguard::app::buzzer::BuzzerPattern;
use gasguard::app::events::AppEvent;
use gasguard::app::ports::{
    BuzzerPort, ClockPort, EventSink, IndicatorPort, RemoteStatePort, SensorPort, WatchPoll,
};
use gasguard::error::RemoteError;
use gasguard::rtdb::RemoteValue;

// ── MockHw ────────────────────────────────────────────────────

/// Hardware double: fixed ADC readings, recorded buzzer and LED output.
pub struct MockHw {
    pub raw: [u16; 4],
    pub patterns: Vec<BuzzerPattern>,
    pub led: Option<bool>,
    pub led_writes: usize,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new() -> Self {
        Self {
            raw: [0; 4],
            patterns: Vec::new(),
            led: None,
            led_writes: 0,
        }
    }

    pub fn with_raw(raw: [u16; 4]) -> Self {
        Self { raw, ..Self::new() }
    }

    pub fn last_pattern(&self) -> Option<BuzzerPattern> {
        self.patterns.last().copied()
    }

    /// Patterns applied that had at least one channel high.
    pub fn audible(&self) -> Vec<BuzzerPattern> {
        self.patterns
            .iter()
            .copied()
            .filter(|p| p.active_count() > 0)
            .collect()
    }
}

impl SensorPort for MockHw {
    fn read_analog(&mut self, channel: usize) -> u16 {
        self.raw.get(channel).copied().unwrap_or(0)
    }
}

impl BuzzerPort for MockHw {
    fn apply_pattern(&mut self, pattern: BuzzerPattern) {
        self.patterns.push(pattern);
    }
}

impl IndicatorPort for MockHw {
    fn set_status_led(&mut self, on: bool) {
        self.led = Some(on);
        self.led_writes += 1;
    }
}

// ── MockRemote ────────────────────────────────────────────────

/// Realtime-database double with scriptable failures.
pub struct MockRemote {
    pub ready: bool,
    pub sign_up_result: Result<(), RemoteError>,
    pub sign_up_calls: usize,
    pub watched: Vec<String>,
    pub writes: Vec<(String, i64)>,
    pub write_attempts: usize,
    /// Paths whose writes fail with the given error.
    pub failing_writes: HashMap<String, RemoteError>,
    /// Queued poll outcomes per path; an empty queue polls as "nothing new".
    pub polls: HashMap<String, VecDeque<Result<WatchPoll, RemoteError>>>,
}

#[allow(dead_code)]
impl MockRemote {
    pub fn new() -> Self {
        Self {
            ready: true,
            sign_up_result: Ok(()),
            sign_up_calls: 0,
            watched: Vec::new(),
            writes: Vec::new(),
            write_attempts: 0,
            failing_writes: HashMap::new(),
            polls: HashMap::new(),
        }
    }

    pub fn push_value(&mut self, path: &str, value: RemoteValue) {
        self.polls
            .entry(path.to_owned())
            .or_default()
            .push_back(Ok(WatchPoll::new_value(value)));
    }

    pub fn push_error(&mut self, path: &str, error: RemoteError) {
        self.polls
            .entry(path.to_owned())
            .or_default()
            .push_back(Err(error));
    }

    pub fn fail_writes_to(&mut self, path: &str, error: RemoteError) {
        self.failing_writes.insert(path.to_owned(), error);
    }

    pub fn writes_to(&self, path: &str) -> Vec<i64> {
        self.writes
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RemoteStatePort for MockRemote {
    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn sign_up(&mut self) -> Result<(), RemoteError> {
        self.sign_up_calls += 1;
        self.sign_up_result
    }

    fn write_int(&mut self, path: &str, value: i64) -> Result<(), RemoteError> {
        self.write_attempts += 1;
        if let Some(e) = self.failing_writes.get(path) {
            return Err(*e);
        }
        self.writes.push((path.to_owned(), value));
        Ok(())
    }

    fn begin_watch(&mut self, path: &str) -> Result<(), RemoteError> {
        self.watched.push(path.to_owned());
        Ok(())
    }

    fn poll_watch(&mut self, path: &str) -> Result<WatchPoll, RemoteError> {
        self.polls
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(WatchPoll::nothing()))
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    pub now: Cell<u64>,
    pub epoch: Cell<u64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            epoch: Cell::new(1_700_000_000),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
        self.epoch.set(self.epoch.get() + ms / 1000);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn epoch_secs(&self) -> u64 {
        self.epoch.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

//! Integration tests for the AppService orchestration loop.
//!
//! Drive whole passes against mock adapters and a hand-stepped clock and
//! check what reaches the database, the buzzers and the event log.

use gasguard::app::buzzer::{BuzzerPattern, BuzzerPhase};
use gasguard::app::events::AppEvent;
use gasguard::app::service::AppService;
use gasguard::config::SystemConfig;
use gasguard::error::RemoteError;
use gasguard::rtdb::{RemoteValue, ValueTag, paths};

use crate::mock_hw::{MockClock, MockHw, MockRemote, RecordingSink};

struct Rig {
    app: AppService,
    hw: MockHw,
    remote: MockRemote,
    clock: MockClock,
    sink: RecordingSink,
}

impl Rig {
    fn with(config: &SystemConfig, remote: MockRemote) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            hw: MockHw::with_raw([0, 2048, 4095, 1024]),
            remote,
            clock: MockClock::new(),
            sink: RecordingSink::new(),
        };
        rig.app.start(&mut rig.remote, &mut rig.sink);
        rig
    }

    fn new() -> Self {
        Self::with(&SystemConfig::default(), MockRemote::new())
    }

    fn pass_at(&mut self, ms: u64) {
        self.clock.set(ms);
        self.app
            .run_pass(&mut self.hw, &mut self.remote, &self.clock, &mut self.sink);
    }

    fn sensor_writes(&self) -> usize {
        self.remote
            .writes
            .iter()
            .filter(|(p, _)| p.starts_with("sensorValue/"))
            .count()
    }
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_signs_up_once_and_watches_both_paths() {
    let rig = Rig::new();
    assert_eq!(rig.remote.sign_up_calls, 1);
    assert_eq!(
        rig.remote.watched,
        vec![paths::BUZZER_TEST.to_owned(), paths::SMOKE_THRESHOLD.to_owned()]
    );
    assert!(rig.app.state().signed_in);
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::Started { signed_in: true })
    );
}

#[test]
fn defaults_before_any_remote_value() {
    let rig = Rig::new();
    assert_eq!(rig.app.state().smoke_threshold, 20);
    assert!(!rig.app.state().buzzer_test);
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel1);
}

// ── Reporting ────────────────────────────────────────────────

#[test]
fn report_fires_immediately_then_every_five_seconds() {
    let mut rig = Rig::new();

    rig.pass_at(0);
    assert_eq!(rig.sensor_writes(), 4);
    assert_eq!(rig.remote.writes_to(paths::LAST_SEEN).len(), 1);

    rig.pass_at(2_500);
    rig.pass_at(4_999);
    assert_eq!(rig.sensor_writes(), 4, "no second report before 5000 ms");

    rig.pass_at(5_000);
    assert_eq!(rig.sensor_writes(), 8);

    rig.pass_at(9_999);
    assert_eq!(rig.sensor_writes(), 8);
    rig.pass_at(10_000);
    assert_eq!(rig.sensor_writes(), 12);
}

#[test]
fn report_publishes_percentages_and_heartbeat() {
    let mut rig = Rig::new();
    rig.clock.epoch.set(1_712_345_678);
    rig.pass_at(0);

    let expected = [0, 50, 100, 25];
    for (path, pct) in paths::SENSOR_VALUES.iter().zip(expected) {
        assert_eq!(rig.remote.writes_to(path), vec![pct]);
    }
    assert_eq!(rig.remote.writes_to(paths::LAST_SEEN), vec![1_712_345_678]);
    assert_eq!(rig.app.state().sensor_values, [0, 50, 100, 25]);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::HeartbeatSent { epoch_secs: 1_712_345_678 }));
}

#[test]
fn failed_write_does_not_block_the_others() {
    let mut remote = MockRemote::new();
    remote.fail_writes_to(paths::SENSOR_VALUES[1], RemoteError::Http(401));
    let mut rig = Rig::with(&SystemConfig::default(), remote);

    rig.pass_at(0);

    assert_eq!(rig.remote.write_attempts, 5);
    assert_eq!(rig.sensor_writes(), 3);
    assert_eq!(rig.remote.writes_to(paths::LAST_SEEN).len(), 1);
    assert!(rig.sink.events.contains(&AppEvent::SensorWriteFailed {
        channel: 2,
        error: RemoteError::Http(401),
    }));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SensorWritten { .. })),
        3
    );
}

#[test]
fn failed_heartbeat_is_logged_and_not_retried() {
    let mut remote = MockRemote::new();
    remote.fail_writes_to(paths::LAST_SEEN, RemoteError::Transport(-1));
    let mut rig = Rig::with(&SystemConfig::default(), remote);

    rig.pass_at(0);
    rig.pass_at(10);
    assert_eq!(rig.remote.write_attempts, 5);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::HeartbeatFailed(_))),
        1
    );
}

// ── Connectivity gate ────────────────────────────────────────

#[test]
fn sign_up_failure_disables_remote_half_for_good() {
    let mut remote = MockRemote::new();
    remote.sign_up_result = Err(RemoteError::Http(400));
    remote.push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));
    let mut rig = Rig::with(&SystemConfig::default(), remote);

    assert!(!rig.app.state().signed_in);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::SignUpFailed(RemoteError::Http(400))));

    for t in (0..30_000).step_by(1_000) {
        rig.pass_at(t);
    }

    assert_eq!(rig.remote.sign_up_calls, 1, "sign-up is never retried");
    assert_eq!(rig.remote.write_attempts, 0);
    assert!(!rig.app.state().buzzer_test, "listener never polled");
    assert_eq!(rig.hw.led, Some(false));
    assert!(!rig.app.is_online());
    // Buzzer logic keeps running: outputs are held low every pass.
    assert_eq!(rig.hw.patterns.len(), 30);
    assert!(rig.hw.patterns.iter().all(|p| *p == BuzzerPattern::SILENT));
}

#[test]
fn not_ready_skips_report_and_listen_until_ready() {
    let mut remote = MockRemote::new();
    remote.ready = false;
    remote.push_value(paths::SMOKE_THRESHOLD, RemoteValue::integer(42));
    let mut rig = Rig::with(&SystemConfig::default(), remote);

    rig.pass_at(0);
    rig.pass_at(6_000);
    assert_eq!(rig.remote.write_attempts, 0);
    assert_eq!(rig.app.state().smoke_threshold, 20);
    assert_eq!(rig.hw.led, Some(false));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::LinkChanged(_))),
        0,
        "initial offline state is not a transition"
    );

    rig.remote.ready = true;
    rig.pass_at(6_010);
    assert_eq!(rig.sensor_writes(), 4, "first report fires on the first online pass");
    assert_eq!(rig.app.state().smoke_threshold, 42);
    assert_eq!(rig.hw.led, Some(true));
    assert!(rig.sink.events.contains(&AppEvent::LinkChanged(true)));

    rig.remote.ready = false;
    rig.pass_at(6_020);
    assert_eq!(rig.hw.led, Some(false));
    assert!(rig.sink.events.contains(&AppEvent::LinkChanged(false)));
}

#[test]
fn led_written_only_on_transitions() {
    let mut rig = Rig::new();
    for t in 0..10 {
        rig.pass_at(t * 10);
    }
    assert_eq!(rig.hw.led_writes, 1);
    assert_eq!(rig.hw.led, Some(true));
}

// ── Remote commands ──────────────────────────────────────────

#[test]
fn threshold_update_then_string_is_ignored() {
    let mut rig = Rig::new();

    rig.remote
        .push_value(paths::SMOKE_THRESHOLD, RemoteValue::integer(35));
    rig.pass_at(0);
    assert_eq!(rig.app.state().smoke_threshold, 35);
    assert!(rig.sink.events.contains(&AppEvent::SmokeThresholdChanged(35)));

    rig.remote
        .push_value(paths::SMOKE_THRESHOLD, RemoteValue::string("high"));
    rig.pass_at(10);
    assert_eq!(rig.app.state().smoke_threshold, 35);
    assert!(rig.sink.events.contains(&AppEvent::ValueIgnored {
        path: paths::SMOKE_THRESHOLD,
        tag: ValueTag::String,
    }));
}

#[test]
fn non_boolean_on_test_flag_leaves_it_unchanged() {
    let mut rig = Rig::new();

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::integer(1));
    rig.pass_at(0);
    assert!(!rig.app.state().buzzer_test);

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::string("true"));
    rig.pass_at(10);
    assert!(!rig.app.state().buzzer_test);

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));
    rig.pass_at(20);
    assert!(rig.app.state().buzzer_test);

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::string("false"));
    rig.pass_at(30);
    assert!(rig.app.state().buzzer_test, "mismatch must not clear the flag");
}

#[test]
fn out_of_range_threshold_is_ignored() {
    let mut rig = Rig::new();
    rig.remote.push_value(
        paths::SMOKE_THRESHOLD,
        RemoteValue::integer(i64::from(i32::MAX) + 1),
    );
    rig.pass_at(0);
    assert_eq!(rig.app.state().smoke_threshold, 20);
}

#[test]
fn poll_failure_skips_only_that_path() {
    let mut rig = Rig::new();
    rig.remote
        .push_error(paths::BUZZER_TEST, RemoteError::StreamClosed);
    rig.remote
        .push_value(paths::SMOKE_THRESHOLD, RemoteValue::integer(40));

    rig.pass_at(0);

    assert_eq!(rig.app.state().smoke_threshold, 40);
    assert!(rig.sink.events.contains(&AppEvent::WatchReadFailed {
        path: paths::BUZZER_TEST,
        error: RemoteError::StreamClosed,
    }));
}

#[test]
fn last_write_wins_without_debounce() {
    let mut rig = Rig::new();
    for v in [10, 11, 12] {
        rig.remote
            .push_value(paths::SMOKE_THRESHOLD, RemoteValue::integer(v));
    }
    rig.pass_at(0);
    rig.pass_at(10);
    rig.pass_at(20);
    assert_eq!(rig.app.state().smoke_threshold, 12);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SmokeThresholdChanged(_))),
        3
    );
}

// ── Buzzer sequencer ─────────────────────────────────────────

#[test]
fn sequencer_cycles_one_phase_per_second() {
    let mut rig = Rig::new();
    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));

    for k in 0..12u64 {
        rig.pass_at(k * 1_000);
        rig.pass_at(k * 1_000 + 500);
        rig.pass_at(k * 1_000 + 999);
    }

    let expected: Vec<BuzzerPattern> = BuzzerPhase::ALL
        .iter()
        .chain(BuzzerPhase::ALL.iter())
        .map(|p| p.pattern())
        .collect();
    assert_eq!(rig.hw.patterns, expected);

    let phases: Vec<BuzzerPhase> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::BuzzerStep { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases.len(), 12);
    assert_eq!(&phases[..6], &BuzzerPhase::ALL);
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel1);
}

#[test]
fn deactivation_forces_low_and_holds_phase() {
    let mut rig = Rig::new();
    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));
    rig.pass_at(0);
    rig.pass_at(1_000);
    rig.pass_at(2_000);
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel4);

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(false));
    rig.pass_at(2_100);
    assert_eq!(rig.hw.last_pattern(), Some(BuzzerPattern::SILENT));
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel4);

    for t in [3_000, 4_000, 9_000] {
        rig.pass_at(t);
        assert_eq!(rig.hw.last_pattern(), Some(BuzzerPattern::SILENT));
    }
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel4);

    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));
    rig.pass_at(10_000);
    assert_eq!(
        rig.hw.last_pattern(),
        Some(BuzzerPhase::Channel4.pattern()),
        "resumes from the held phase"
    );
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::AllOn);
}

#[test]
fn buzzer_runs_offline_once_flag_is_set() {
    let mut rig = Rig::new();
    rig.remote
        .push_value(paths::BUZZER_TEST, RemoteValue::boolean(true));
    rig.pass_at(0);
    rig.remote.ready = false;
    rig.pass_at(1_000);
    rig.pass_at(2_000);
    assert_eq!(rig.hw.audible().len(), 3);
    assert_eq!(rig.app.buzzer_phase(), BuzzerPhase::Channel4);
}

// ── Diagnostics ──────────────────────────────────────────────

#[test]
fn diagnostic_dump_disabled_by_default() {
    let mut rig = Rig::new();
    for t in (0..20_000).step_by(1_000) {
        rig.pass_at(t);
    }
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Diagnostics { .. })),
        0
    );
}

#[test]
fn diagnostic_dump_throttled_when_enabled() {
    let config = SystemConfig {
        diagnostic_dump_enabled: true,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with(&config, MockRemote::new());
    for t in (0..=10_000).step_by(500) {
        rig.pass_at(t);
    }
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Diagnostics { .. })),
        3
    );
    assert!(rig.sink.events.contains(&AppEvent::Diagnostics {
        sensor_values: [0, 50, 100, 25],
    }));
    assert_eq!(rig.app.pass_count(), 21);
}

//! End-to-end flow through the simulated board and database.
//!
//! `HardwareAdapter` runs on the thread-local ADC/GPIO simulation and
//! `FirebaseAdapter` on its in-memory backend, so these tests cover the
//! real adapters from ADC sample to database write and from stream bytes
//! to buzzer pin levels.

use gasguard::adapters::firebase::FirebaseAdapter;
use gasguard::adapters::hardware::HardwareAdapter;
use gasguard::app::events::AppEvent;
use gasguard::app::service::AppService;
use gasguard::config::{NetworkConfig, SystemConfig};
use gasguard::drivers::hw_init::{self, sim_output_level, sim_set_adc};
use gasguard::error::RemoteError;
use gasguard::pins;
use gasguard::rtdb::paths;
use serde_json::json;

use crate::mock_hw::{MockClock, RecordingSink};

fn net() -> NetworkConfig {
    NetworkConfig {
        wifi_ssid: "TestNet",
        wifi_password: "password1",
        api_key: "AIzaSy-integration",
        database_url: "https://gasguard-test-default-rtdb.firebaseio.com/",
        ntp_server: "pool.ntp.org",
    }
}

struct Board {
    app: AppService,
    hw: HardwareAdapter,
    db: FirebaseAdapter,
    clock: MockClock,
    sink: RecordingSink,
}

impl Board {
    fn boot(db: FirebaseAdapter) -> Self {
        let config = SystemConfig::default();
        let mut board = Self {
            app: AppService::new(&config),
            hw: HardwareAdapter::new(),
            db,
            clock: MockClock::new(),
            sink: RecordingSink::new(),
        };
        board.app.start(&mut board.db, &mut board.sink);
        board
    }

    fn pass_at(&mut self, ms: u64) {
        self.clock.set(ms);
        self.app
            .run_pass(&mut self.hw, &mut self.db, &self.clock, &mut self.sink);
    }

    fn buzzer_pins(&self) -> [bool; 4] {
        pins::BUZZER_GPIOS.map(sim_output_level)
    }
}

fn fresh_db() -> FirebaseAdapter {
    hw_init::init_peripherals().unwrap();
    FirebaseAdapter::new(&net(), &SystemConfig::default()).unwrap()
}

#[test]
fn adc_samples_reach_the_database() {
    let db = fresh_db();
    for (ch, raw) in pins::SENSOR_ADC1_CHANNELS.iter().zip([4095, 2048, 1024, 0]) {
        sim_set_adc(*ch, raw);
    }
    let mut board = Board::boot(db);
    board.clock.epoch.set(1_720_000_000);

    board.pass_at(0);

    let writes = board.db.sim_writes();
    assert_eq!(writes.len(), 5);
    assert_eq!(writes[0], (paths::SENSOR_VALUES[0].to_owned(), 100));
    assert_eq!(writes[1], (paths::SENSOR_VALUES[1].to_owned(), 50));
    assert_eq!(writes[2], (paths::SENSOR_VALUES[2].to_owned(), 25));
    assert_eq!(writes[3], (paths::SENSOR_VALUES[3].to_owned(), 0));
    assert_eq!(writes[4], (paths::LAST_SEEN.to_owned(), 1_720_000_000));
    assert!(sim_output_level(pins::STATUS_LED_GPIO), "LED lit while online");
}

#[test]
fn pushed_flag_drives_buzzer_pins() {
    let mut board = Board::boot(fresh_db());
    board.pass_at(0);
    assert_eq!(board.buzzer_pins(), [false; 4]);

    assert!(board.db.sim_push(paths::BUZZER_TEST, json!(true)));
    board.pass_at(100);
    assert_eq!(board.buzzer_pins(), [true, false, false, false]);

    board.pass_at(1_100);
    assert_eq!(board.buzzer_pins(), [false, true, false, false]);
    board.pass_at(2_100);
    assert_eq!(board.buzzer_pins(), [false, false, true, false]);
    board.pass_at(3_100);
    assert_eq!(board.buzzer_pins(), [false, false, false, true]);
    board.pass_at(4_100);
    assert_eq!(board.buzzer_pins(), [true; 4]);

    board.db.sim_push(paths::BUZZER_TEST, json!(false));
    board.pass_at(4_200);
    assert_eq!(board.buzzer_pins(), [false; 4]);
}

#[test]
fn threshold_arrives_over_event_stream() {
    let mut board = Board::boot(fresh_db());
    board.pass_at(0);

    let chunk_a = b"event: put\ndata: {\"path\":\"/\",";
    let chunk_b = b"\"data\":35}\n\nevent: keep-alive\ndata: null\n\n";
    assert!(board.db.sim_feed(paths::SMOKE_THRESHOLD, chunk_a));
    board.pass_at(10);
    assert_eq!(board.app.state().smoke_threshold, 20);

    assert!(board.db.sim_feed(paths::SMOKE_THRESHOLD, chunk_b));
    board.pass_at(20);
    assert_eq!(board.app.state().smoke_threshold, 35);

    board.db.sim_push(paths::SMOKE_THRESHOLD, json!("loud"));
    board.pass_at(30);
    assert_eq!(board.app.state().smoke_threshold, 35);
}

#[test]
fn revoked_stream_is_reported_then_recovers() {
    let mut board = Board::boot(fresh_db());
    board
        .db
        .sim_feed(paths::BUZZER_TEST, b"event: auth_revoked\ndata: credential is no longer valid\n\n");
    board.pass_at(0);
    assert!(board.sink.events.contains(&AppEvent::WatchReadFailed {
        path: paths::BUZZER_TEST,
        error: RemoteError::AuthRevoked,
    }));

    board.db.sim_push(paths::BUZZER_TEST, json!(true));
    board.pass_at(10);
    assert!(board.app.state().buzzer_test);
}

#[test]
fn failed_sign_up_keeps_board_local() {
    let mut db = fresh_db();
    db.sim_fail_sign_up(RemoteError::Http(400));
    let mut board = Board::boot(db);

    assert_eq!(
        board
            .sink
            .count(|e| matches!(e, AppEvent::WatchFailed { error: RemoteError::NotSignedIn, .. })),
        2
    );
    for t in (0..12_000).step_by(1_000) {
        board.pass_at(t);
    }
    assert!(board.db.sim_writes().is_empty());
    assert!(!sim_output_level(pins::STATUS_LED_GPIO));
    assert_eq!(board.buzzer_pins(), [false; 4]);
}

#[test]
fn dropped_write_is_superseded_next_period() {
    let mut db = fresh_db();
    sim_set_adc(pins::SENSOR_ADC1_CHANNELS[0], 2048);
    db.sim_fail_next_write(RemoteError::Transport(-1));
    let mut board = Board::boot(db);

    board.pass_at(0);
    assert_eq!(board.db.sim_writes().len(), 4);
    board.pass_at(5_000);
    let sensor1: Vec<i64> = board
        .db
        .sim_writes()
        .iter()
        .filter(|(p, _)| p == paths::SENSOR_VALUES[0])
        .map(|(_, v)| *v)
        .collect();
    assert_eq!(sensor1, vec![50]);
}

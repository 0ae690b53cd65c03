//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the device state, the scheduler and the three
//! components (reporter, listener, sequencer).  All I/O flows through port
//! traits injected at call sites, so the whole service runs against mock
//! adapters in tests.
//!
//! ```text
//!   SensorPort ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                  │        AppService         │
//!   BuzzerPort ◀── │  Scheduler · DeviceState  │ ◀─▶ RemoteStatePort
//! IndicatorPort ◀──│ Reporter·Listener·Buzzer  │ ◀── ClockPort
//!                  └───────────────────────────┘
//! ```
//!
//! One [`run_pass`](AppService::run_pass):
//!
//! 1. online = signed in at startup AND client ready; LED follows
//! 2. online AND report task due → sample + publish
//! 3. online → poll watched paths, apply commands
//! 4. buzzer test on → step task due → sequencer tick; off → all low
//! 5. diagnostic dump task due → echo sensor values

use log::info;

use crate::config::SystemConfig;
use crate::scheduler::{Scheduler, TaskId};

use super::buzzer::{BuzzerPhase, BuzzerSequencer};
use super::commands::RemoteCommand;
use super::events::AppEvent;
use super::listener::{CommandListener, WATCHED_PATHS};
use super::ports::{
    BuzzerPort, ClockPort, EventSink, IndicatorPort, RemoteStatePort, SensorPort,
};
use super::reporter::SensorReporter;
use super::state::DeviceState;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    state: DeviceState,
    scheduler: Scheduler,
    reporter: SensorReporter,
    listener: CommandListener,
    sequencer: BuzzerSequencer,
    /// Last value pushed to the status LED; `None` before the first pass.
    online: Option<bool>,
    pass_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the network — call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: DeviceState::new(config.default_smoke_threshold),
            scheduler: Scheduler::from_config(config),
            reporter: SensorReporter::new(config.adc_max_raw),
            listener: CommandListener::new(),
            sequencer: BuzzerSequencer::new(),
            online: None,
            pass_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Sign up once and open both watches.
    ///
    /// A failed sign-up is final: the service keeps running the buzzer
    /// logic but never reports or listens.  Watch failures are logged and
    /// not retried.
    pub fn start(&mut self, remote: &mut impl RemoteStatePort, sink: &mut impl EventSink) {
        match remote.sign_up() {
            Ok(()) => self.state.signed_in = true,
            Err(e) => sink.emit(&AppEvent::SignUpFailed(e)),
        }

        for path in WATCHED_PATHS {
            match remote.begin_watch(path) {
                Ok(()) => sink.emit(&AppEvent::WatchStarted { path }),
                Err(error) => sink.emit(&AppEvent::WatchFailed { path, error }),
            }
        }

        sink.emit(&AppEvent::Started {
            signed_in: self.state.signed_in,
        });
        info!("AppService started (signed_in={})", self.state.signed_in);
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one orchestrator pass.
    ///
    /// The `hw` parameter satisfies every hardware port at once — this
    /// avoids a double mutable borrow while keeping the port boundary
    /// explicit.
    pub fn run_pass(
        &mut self,
        hw: &mut (impl SensorPort + BuzzerPort + IndicatorPort),
        remote: &mut impl RemoteStatePort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        self.pass_count += 1;
        let now = clock.now_ms();

        // 1. Connectivity gate
        let online = self.state.signed_in && remote.is_ready();
        if self.online != Some(online) {
            hw.set_status_led(online);
            if self.online.is_some() || online {
                sink.emit(&AppEvent::LinkChanged(online));
            }
            self.online = Some(online);
        }

        // 2. Sensor report + heartbeat
        if online && self.scheduler.try_fire(TaskId::SensorReport, now) {
            self.reporter
                .report(hw, remote, clock, &mut self.state, sink);
        }

        // 3. Remote commands
        if online {
            for cmd in self.listener.poll(remote, sink) {
                self.handle_command(cmd, sink);
            }
        }

        // 4. Buzzer self-test
        if self.state.buzzer_test {
            if self.scheduler.try_fire(TaskId::BuzzerStep, now) {
                let phase = self.sequencer.step(hw);
                sink.emit(&AppEvent::BuzzerStep { phase });
            }
        } else {
            hw.all_low();
        }

        // 5. Diagnostic dump
        if self.scheduler.try_fire(TaskId::DiagnosticDump, now) {
            sink.emit(&AppEvent::Diagnostics {
                sensor_values: self.state.sensor_values,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a command to device state.  Every accepted value is logged,
    /// even when it equals the current one.
    pub fn handle_command(&mut self, cmd: RemoteCommand, sink: &mut impl EventSink) {
        match cmd {
            RemoteCommand::SetBuzzerTest(on) => {
                self.state.buzzer_test = on;
                sink.emit(&AppEvent::BuzzerTestChanged(on));
            }
            RemoteCommand::SetSmokeThreshold(threshold) => {
                self.state.smoke_threshold = threshold;
                sink.emit(&AppEvent::SmokeThresholdChanged(threshold));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Phase the next buzzer tick will apply.
    pub fn buzzer_phase(&self) -> BuzzerPhase {
        self.sequencer.phase()
    }

    /// Whether the remote preconditions held on the last pass.
    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(false)
    }

    /// Passes executed since startup.
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }
}

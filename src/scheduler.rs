//! Periodic task scheduler.
//!
//! Every timed activity in the main loop is a named [`PeriodicTask`] with
//! its own interval and last-run stamp.  The orchestrator asks
//! [`Scheduler::try_fire`] once per pass; the scheduler never reads a clock
//! itself, so tests drive it with plain integers.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Scheduler                             │
//! │                                                              │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐  │
//! │  │ SensorReport   │  │ BuzzerStep     │  │ DiagnosticDump │  │
//! │  │ every 5000 ms  │  │ every 1000 ms  │  │ every 5000 ms  │  │
//! │  └───────┬────────┘  └───────┬────────┘  └───────┬────────┘  │
//! │          │   try_fire(id, now_ms) → bool         │           │
//! │          ▼                   ▼                   ▼           │
//! │                    AppService.run_pass()                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A task that has never run is due immediately.  After that it is due
//! once `now - last_run >= interval`.  Firing stamps `now` as the new
//! last-run time, so a late pass never produces a burst of catch-up fires.

use log::info;

use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Task types
// ═══════════════════════════════════════════════════════════════

/// Identity of a scheduled activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Sample sensors, publish values and heartbeat.
    SensorReport,
    /// Advance the buzzer self-test pattern.
    BuzzerStep,
    /// Echo the last sensor values to the log.
    DiagnosticDump,
}

/// A single periodic task entry.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    pub id: TaskId,
    /// Human-readable label for logs.
    pub label: &'static str,
    pub interval_ms: u32,
    /// Disabled tasks are never due.
    pub enabled: bool,
    last_run_ms: Option<u64>,
}

impl PeriodicTask {
    pub fn new(id: TaskId, label: &'static str, interval_ms: u32) -> Self {
        Self {
            id,
            label,
            interval_ms,
            enabled: true,
            last_run_ms: None,
        }
    }

    fn is_due(&self, now_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.interval_ms),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent tasks (stack-allocated).
const MAX_TASKS: usize = 4;

pub struct Scheduler {
    tasks: heapless::Vec<PeriodicTask, MAX_TASKS>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: heapless::Vec::new(),
        }
    }

    /// The firmware's standard task set, timed from `config`.
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut sched = Self::new();
        sched.add(PeriodicTask::new(
            TaskId::SensorReport,
            "sensor-report",
            config.sensor_report_interval_ms,
        ));
        sched.add(PeriodicTask::new(
            TaskId::BuzzerStep,
            "buzzer-step",
            config.buzzer_step_interval_ms,
        ));
        let mut dump = PeriodicTask::new(
            TaskId::DiagnosticDump,
            "diagnostic-dump",
            config.diagnostic_dump_interval_ms,
        );
        dump.enabled = config.diagnostic_dump_enabled;
        sched.add(dump);
        sched
    }

    /// Register a task.  Returns `false` if the table is full or the id
    /// is already registered.
    pub fn add(&mut self, task: PeriodicTask) -> bool {
        if self.find(task.id).is_some() {
            return false;
        }
        let (label, interval) = (task.label, task.interval_ms);
        if self.tasks.push(task).is_err() {
            return false;
        }
        info!("Scheduler: added '{}' (every {} ms)", label, interval);
        true
    }

    /// Whether `id` would fire at `now_ms`.  Unknown ids are never due.
    pub fn is_due(&self, id: TaskId, now_ms: u64) -> bool {
        self.find(id).is_some_and(|t| t.is_due(now_ms))
    }

    /// Fire `id` if it is due, stamping `now_ms` as its last run.
    pub fn try_fire(&mut self, id: TaskId, now_ms: u64) -> bool {
        match self.find_mut(id) {
            Some(task) if task.is_due(now_ms) => {
                task.last_run_ms = Some(now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn set_enabled(&mut self, id: TaskId, enabled: bool) {
        if let Some(task) = self.find_mut(id) {
            task.enabled = enabled;
        }
    }

    /// Last time `id` fired, if ever.
    pub fn last_run(&self, id: TaskId) -> Option<u64> {
        self.find(id).and_then(|t| t.last_run_ms)
    }

    /// Number of enabled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.enabled).count()
    }

    fn find(&self, id: TaskId) -> Option<&PeriodicTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: TaskId) -> Option<&mut PeriodicTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

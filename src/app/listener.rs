//! Remote command listener.
//!
//! Polls both watched paths once per call and turns accepted values into
//! [`RemoteCommand`]s.  Acceptance is by declared type only:
//!
//! | Path                       | Accepts | Command               |
//! |----------------------------|---------|-----------------------|
//! | `userInput/buzzerTest`     | boolean | `SetBuzzerTest`       |
//! | `userInput/smokeThreshold` | int     | `SetSmokeThreshold`   |
//!
//! Anything else on those paths is dropped without touching state.

use log::warn;

use crate::rtdb::{RemoteValue, paths};

use super::commands::RemoteCommand;
use super::events::AppEvent;
use super::ports::{EventSink, RemoteStatePort};

/// Number of watched paths; also the most commands one poll can yield.
pub const WATCH_COUNT: usize = 2;

/// Paths watched for remote commands, in poll order.
pub const WATCHED_PATHS: [&str; WATCH_COUNT] = [paths::BUZZER_TEST, paths::SMOKE_THRESHOLD];

/// Interpret a value observed on `path`.  `None` for type mismatches and
/// unknown paths.
pub fn decode(path: &str, value: &RemoteValue) -> Option<RemoteCommand> {
    match path {
        paths::BUZZER_TEST => value.as_bool().map(RemoteCommand::SetBuzzerTest),
        paths::SMOKE_THRESHOLD => value
            .as_int()
            .and_then(|v| i32::try_from(v).ok())
            .map(RemoteCommand::SetSmokeThreshold),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct CommandListener;

impl CommandListener {
    pub fn new() -> Self {
        Self
    }

    /// Poll every watched path.  Commands come back in poll order.
    pub fn poll(
        &mut self,
        remote: &mut impl RemoteStatePort,
        sink: &mut impl EventSink,
    ) -> heapless::Vec<RemoteCommand, WATCH_COUNT> {
        let mut commands = heapless::Vec::new();
        for path in WATCHED_PATHS {
            let value = match remote.poll_watch(path) {
                Ok(poll) => poll.value,
                Err(error) => {
                    sink.emit(&AppEvent::WatchReadFailed { path, error });
                    continue;
                }
            };
            let Some(value) = value else { continue };
            match decode(path, &value) {
                Some(cmd) => {
                    if let Err(dropped) = commands.push(cmd) {
                        warn!("Listener: command batch full, dropping {:?}", dropped);
                    }
                }
                None => sink.emit(&AppEvent::ValueIgnored {
                    path,
                    tag: value.tag(),
                }),
            }
        }
        commands
    }
}

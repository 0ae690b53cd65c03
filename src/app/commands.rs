//! Inbound commands to the application service.
//!
//! Produced by the [`CommandListener`](super::listener::CommandListener)
//! from values pushed to the watched database paths, and interpreted by
//! the [`AppService`](super::service::AppService).

/// Commands that the remote side can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Start (`true`) or stop the buzzer self-test pattern.
    SetBuzzerTest(bool),

    /// Replace the stored smoke alarm threshold.
    SetSmokeThreshold(i32),
}

//! Buzzer self-test sequencer.
//!
//! Six named phases, each mapped to a fixed pattern on the four buzzer
//! channels.  Every tick applies the *current* phase and then advances:
//!
//! ```text
//!   Channel1 ──▶ Channel2 ──▶ Channel3 ──▶ Channel4 ──▶ AllOn ──▶ AllOff
//!     1000         0100         0010         0001        1111       0000
//!      ▲                                                              │
//!      └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequencer has no notion of time or of the test flag; the
//! orchestrator decides when to tick.  Not ticking freezes the phase.

use core::fmt;

use crate::pins::BUZZER_COUNT;

use super::ports::BuzzerPort;

// ───────────────────────────────────────────────────────────────
// Pattern
// ───────────────────────────────────────────────────────────────

/// Output levels for the four buzzer channels (index 0 = channel 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerPattern(pub [bool; BUZZER_COUNT]);

impl BuzzerPattern {
    pub const SILENT: Self = Self([false; BUZZER_COUNT]);

    pub fn level(&self, channel: usize) -> bool {
        self.0.get(channel).copied().unwrap_or(false)
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&on| on).count()
    }
}

/// Renders as the four-character bit string, channel 1 first (`"1000"`).
impl fmt::Display for BuzzerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &on in &self.0 {
            f.write_str(if on { "1" } else { "0" })?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Phase
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerPhase {
    Channel1,
    Channel2,
    Channel3,
    Channel4,
    AllOn,
    AllOff,
}

impl BuzzerPhase {
    /// Phases in sequence order.
    pub const ALL: [Self; 6] = [
        Self::Channel1,
        Self::Channel2,
        Self::Channel3,
        Self::Channel4,
        Self::AllOn,
        Self::AllOff,
    ];

    pub fn pattern(self) -> BuzzerPattern {
        match self {
            Self::Channel1 => BuzzerPattern([true, false, false, false]),
            Self::Channel2 => BuzzerPattern([false, true, false, false]),
            Self::Channel3 => BuzzerPattern([false, false, true, false]),
            Self::Channel4 => BuzzerPattern([false, false, false, true]),
            Self::AllOn => BuzzerPattern([true; BUZZER_COUNT]),
            Self::AllOff => BuzzerPattern::SILENT,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Channel1 => Self::Channel2,
            Self::Channel2 => Self::Channel3,
            Self::Channel3 => Self::Channel4,
            Self::Channel4 => Self::AllOn,
            Self::AllOn => Self::AllOff,
            Self::AllOff => Self::Channel1,
        }
    }

    /// Ordinal 0..=5.
    pub fn index(self) -> usize {
        self as usize
    }
}

// ───────────────────────────────────────────────────────────────
// Sequencer
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BuzzerSequencer {
    phase: BuzzerPhase,
}

impl Default for BuzzerSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzerSequencer {
    pub fn new() -> Self {
        Self {
            phase: BuzzerPhase::Channel1,
        }
    }

    /// Phase that the next [`step`](Self::step) will apply.
    pub fn phase(&self) -> BuzzerPhase {
        self.phase
    }

    /// Apply the current phase's pattern, then advance.  Returns the phase
    /// that was applied.
    pub fn step(&mut self, hw: &mut impl BuzzerPort) -> BuzzerPhase {
        let applied = self.phase;
        hw.apply_pattern(applied.pattern());
        self.phase = applied.next();
        applied
    }
}

//! Room timer — countdown state machine feeding the system variables.
//!
//! The timer owns the two read-only system variables every room gets at
//! activation: [`TIMER_STATE`] holds the state name and
//! [`TIMER_REMAINING`] the remaining whole seconds. Invalid transitions
//! (pause while stopped, resume while running, …) are deliberate no-ops
//! rather than errors.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Name of the system variable holding the timer state.
pub const TIMER_STATE: &str = "timer_main";

/// Name of the system variable holding the remaining whole seconds.
pub const TIMER_REMAINING: &str = "timer_main_remaining";

/// A command applied to the room timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TimerCommand {
    /// Start counting down from `duration_secs`. Only valid while stopped.
    Start { duration_secs: u64 },
    Pause,
    Resume,
    Stop,
    /// Add (or with a negative delta, remove) seconds from the countdown.
    Adjust { delta_secs: i64 },
}

impl std::fmt::Display for TimerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start { duration_secs } => write!(f, "start({duration_secs}s)"),
            Self::Pause => f.write_str("pause"),
            Self::Resume => f.write_str("resume"),
            Self::Stop => f.write_str("stop"),
            Self::Adjust { delta_secs } => write!(f, "adjust({delta_secs}s)"),
        }
    }
}

/// Externally visible timer state, mirrored into [`TIMER_STATE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Stopped,
    Running { ends_at: Timestamp },
    Paused { remaining_secs: u64 },
}

/// Countdown state machine for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTimer {
    phase: Phase,
}

impl Default for RoomTimer {
    fn default() -> Self {
        Self {
            phase: Phase::Stopped,
        }
    }
}

impl RoomTimer {
    /// Create a stopped timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        match self.phase {
            Phase::Stopped => TimerState::Stopped,
            Phase::Running { .. } => TimerState::Running,
            Phase::Paused { .. } => TimerState::Paused,
        }
    }

    /// Remaining whole seconds at `now`, rounded up so a countdown shows
    /// its full duration until a whole second has elapsed. Zero while
    /// stopped.
    #[must_use]
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        match &self.phase {
            Phase::Stopped => 0,
            Phase::Running { ends_at } => {
                let millis = (*ends_at - now).num_milliseconds();
                if millis <= 0 {
                    0
                } else {
                    u64::try_from(millis).unwrap_or(0).div_ceil(1000)
                }
            }
            Phase::Paused { remaining_secs } => *remaining_secs,
        }
    }

    /// Whether a running countdown has reached zero.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(&self.phase, Phase::Running { ends_at } if *ends_at <= now)
    }

    /// Apply a command, returning `true` when the timer actually changed.
    ///
    /// Invalid transitions are no-ops returning `false`.
    pub fn apply(&mut self, command: &TimerCommand, now: Timestamp) -> bool {
        let next = match (&self.phase, command) {
            (Phase::Stopped, TimerCommand::Start { duration_secs }) => Some(Phase::Running {
                ends_at: now + secs(*duration_secs),
            }),
            (Phase::Running { .. }, TimerCommand::Pause) => Some(Phase::Paused {
                remaining_secs: self.remaining_secs(now),
            }),
            (Phase::Paused { remaining_secs }, TimerCommand::Resume) => Some(Phase::Running {
                ends_at: now + secs(*remaining_secs),
            }),
            (Phase::Running { .. } | Phase::Paused { .. }, TimerCommand::Stop) => {
                Some(Phase::Stopped)
            }
            (Phase::Running { ends_at }, TimerCommand::Adjust { delta_secs }) => {
                let adjusted = *ends_at + Duration::seconds(*delta_secs);
                Some(Phase::Running {
                    ends_at: adjusted.max(now),
                })
            }
            (Phase::Paused { remaining_secs }, TimerCommand::Adjust { delta_secs }) => {
                let adjusted = remaining_secs
                    .checked_add_signed(*delta_secs)
                    .unwrap_or_default();
                Some(Phase::Paused {
                    remaining_secs: adjusted,
                })
            }
            _ => None,
        };
        match next {
            Some(phase) if phase != self.phase => {
                self.phase = phase;
                true
            }
            _ => false,
        }
    }
}

fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}

//! Run modes of a machine.
//!
//! The run mode is the engine's own lifecycle phase, independent of the
//! user-declared state the machine currently sits in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a machine.
///
/// # Example
///
/// ```rust
/// use waypoint::core::RunMode;
///
/// assert_eq!(RunMode::settled("idle", "idle"), RunMode::Initial);
/// assert_eq!(RunMode::settled("aim", "idle"), RunMode::Idle);
/// assert!(RunMode::WaitingForCallback.is_parked());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    /// Sitting in the initial state with nothing executing
    Initial,
    /// A state action is executing
    RunningState,
    /// A transition action is executing
    InTransition,
    /// Parked after a suspending step until resumed
    WaitingForCallback,
    /// Sitting in a non-initial state with nothing executing
    Idle,
}

impl RunMode {
    /// Mode of a machine at rest in `current`.
    pub fn settled(current: &str, initial: &str) -> Self {
        if current == initial {
            Self::Initial
        } else {
            Self::Idle
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::RunningState => "RunningState",
            Self::InTransition => "InTransition",
            Self::WaitingForCallback => "WaitingForCallback",
            Self::Idle => "Idle",
        }
    }

    /// Whether the machine is waiting for an explicit resume.
    pub fn is_parked(&self) -> bool {
        matches!(self, Self::WaitingForCallback)
    }

    /// Whether an action is executing right now.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::RunningState | Self::InTransition)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

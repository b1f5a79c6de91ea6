//! Watch state value object - the orchestrator's state machine
//!
//! ```text
//! Idle -> BuildPending -> Building -> Deploying -> Idle
//!                            \-> Failed -> Idle
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    #[default]
    Idle,
    BuildPending,
    Building,
    Deploying,
    Failed,
}

impl WatchState {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: WatchState) -> bool {
        matches!(
            (self, next),
            (WatchState::Idle, WatchState::BuildPending)
                | (WatchState::BuildPending, WatchState::Building)
                | (WatchState::Building, WatchState::Deploying)
                | (WatchState::Building, WatchState::Failed)
                | (WatchState::Deploying, WatchState::Idle)
                | (WatchState::Failed, WatchState::Idle)
        )
    }

    /// A build or deploy is in flight; new requests must be queued
    pub fn is_busy(self) -> bool {
        !matches!(self, WatchState::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatchState::Idle => "idle",
            WatchState::BuildPending => "build_pending",
            WatchState::Building => "building",
            WatchState::Deploying => "deploying",
            WatchState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod cancel;
mod deploy_target;
mod ignore_policy;
mod process_matcher;
mod watch_state;

pub use cancel::CancelToken;
pub use deploy_target::DeployTarget;
pub use ignore_policy::{IgnoreError, IgnorePolicy, DEFAULT_IGNORE_PATTERNS};
pub use process_matcher::ProcessMatcher;
pub use watch_state::WatchState;

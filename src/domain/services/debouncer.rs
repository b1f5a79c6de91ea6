//! Debouncer
//!
//! Collapses bursts of change events into one build request per quiet
//! window. Pure state: the owning loop feeds it events and asks `poll(now)`
//! on its own schedule, so tests can drive time explicitly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::domain::entities::ChangeEvent;
use crate::domain::value_objects::IgnorePolicy;

/// Default quiet window before a burst of changes triggers a build
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

/// Coalesced set of changed paths that should trigger one build
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildRequest {
    paths: BTreeSet<PathBuf>,
    event_count: usize,
}

impl BuildRequest {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: BTreeSet<PathBuf> = paths.into_iter().map(Into::into).collect();
        let event_count = paths.len();
        Self { paths, event_count }
    }

    /// Request for the build that runs before any change was seen
    pub fn initial() -> Self {
        Self::default()
    }

    /// Fold another request into this one (union of paths)
    pub fn merge(&mut self, other: BuildRequest) {
        self.paths.extend(other.paths);
        self.event_count += other.event_count;
    }

    /// Sorted, de-duplicated paths
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths.into_iter().collect()
    }

    pub fn path_strings(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.display().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Raw events folded into this request, duplicates included
    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

#[derive(Debug)]
pub struct Debouncer {
    quiet_window: Duration,
    ignore: Option<IgnorePolicy>,
    pending: BTreeSet<PathBuf>,
    event_count: usize,
    last_event: Option<Instant>,
    ignored: usize,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW)
    }
}

impl Debouncer {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            ignore: None,
            pending: BTreeSet::new(),
            event_count: 0,
            last_event: None,
            ignored: 0,
        }
    }

    pub fn with_ignore(mut self, policy: IgnorePolicy) -> Self {
        self.ignore = Some(policy);
        self
    }

    /// Record an event. Returns `false` when the ignore policy drops it.
    ///
    /// Every accepted event restarts the quiet timer, measured from the
    /// event's own timestamp so events buffered during a build count from
    /// when they happened.
    pub fn submit(&mut self, event: ChangeEvent) -> bool {
        if let Some(policy) = &self.ignore {
            if policy.is_ignored(event.path()) {
                self.ignored += 1;
                return false;
            }
        }

        let at = event.timestamp();
        self.last_event = Some(match self.last_event {
            Some(last) if last > at => last,
            _ => at,
        });
        self.pending.insert(event.into_path());
        self.event_count += 1;
        true
    }

    /// Fire when the quiet window has elapsed since the newest event.
    ///
    /// The returned request carries every path touched since the previous
    /// fire; the debouncer is empty afterwards.
    pub fn poll(&mut self, now: Instant) -> Option<BuildRequest> {
        let last = self.last_event?;
        if self.pending.is_empty() || now.saturating_duration_since(last) < self.quiet_window {
            return None;
        }

        self.last_event = None;
        let paths = std::mem::take(&mut self.pending);
        let event_count = std::mem::take(&mut self.event_count);
        Some(BuildRequest { paths, event_count })
    }

    /// How long until `poll` could fire, if anything is pending
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_event?;
        if self.pending.is_empty() {
            return None;
        }
        Some(
            self.quiet_window
                .saturating_sub(now.saturating_duration_since(last)),
        )
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Distinct paths waiting for the quiet window
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }

    /// Events dropped by the ignore policy so far
    pub fn ignored_count(&self) -> usize {
        self.ignored
    }
}

#[cfg(test)]
mod tests;

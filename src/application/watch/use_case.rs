//! Watch Use Case implementation
//!
//! Single-owner loop: drains change events from the bounded channel into the
//! debouncer and hands each fired request to the orchestrator. While a build
//! runs the loop is blocked, so further events wait in the channel and are
//! debounced once it returns.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::entities::ChangeEvent;
use crate::domain::ports::{ProcessLauncher, WatchEvent, WatchEventSink};
use crate::domain::services::{BuildRequest, Debouncer};
use crate::domain::value_objects::{CancelToken, IgnorePolicy};
use crate::error::ToolboxResult;

use super::options::WatchConfig;
use super::orchestrator::{Submission, WatchOrchestrator};

/// Upper bound on one receive wait, so a stop request is noticed promptly
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Events taken from the channel per loop turn before the stop flag is
/// checked again
pub const MAX_DRAIN_PER_POLL: usize = 256;

/// Why the loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was set
    Cancelled,
    /// Every sender of the change channel was dropped
    Disconnected,
}

/// Counters for one watch session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub stop: StopReason,
    pub cycles: usize,
    pub failed_cycles: usize,
    pub queued: usize,
    pub ignored_events: usize,
    /// Paths still waiting for the quiet window when the loop stopped
    pub discarded_paths: usize,
}

/// Watch Use Case
///
/// Entry point for `mcp2-toolbox watch`. The filesystem adapter lives
/// outside; this type only consumes its channel.
pub struct WatchUseCase<L: ProcessLauncher> {
    config: WatchConfig,
    ignore: IgnorePolicy,
    orchestrator: Arc<WatchOrchestrator<L>>,
    sink: Arc<dyn WatchEventSink>,
    cancel: CancelToken,
}

impl<L: ProcessLauncher> WatchUseCase<L> {
    /// Validate `config` and wire the orchestrator.
    ///
    /// Configuration errors surface here, before anything is watched.
    pub fn new(
        config: WatchConfig,
        launcher: Arc<L>,
        sink: Arc<dyn WatchEventSink>,
        cancel: CancelToken,
    ) -> ToolboxResult<Self> {
        let config = config.validate()?;
        let ignore = config.ignore_policy()?;
        let orchestrator = Arc::new(
            WatchOrchestrator::new(&config, launcher, Arc::clone(&sink)).with_cancel(cancel.clone()),
        );

        Ok(Self {
            config,
            ignore,
            orchestrator,
            sink,
            cancel,
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<WatchOrchestrator<L>> {
        &self.orchestrator
    }

    /// Run a single build and deploy, without watching
    pub fn run_once(&self) -> Submission {
        self.orchestrator.submit(BuildRequest::initial())
    }

    /// Start watching (blocking)
    ///
    /// Returns when the stop flag is set or the channel closes. Build and
    /// deploy failures are reported as events and never end the loop.
    pub fn start(&self, events: Receiver<ChangeEvent>) -> WatchSummary {
        self.sink.on_event(WatchEvent::WatchStarted {
            project: self.config.project_root.display().to_string(),
            artifact: self.config.artifact_path().display().to_string(),
            target: self.config.target.as_str().to_string(),
        });

        let mut summary = WatchSummary {
            stop: StopReason::Cancelled,
            cycles: 0,
            failed_cycles: 0,
            queued: 0,
            ignored_events: 0,
            discarded_paths: 0,
        };

        if self.config.build_on_start && !self.cancel.is_cancelled() {
            self.dispatch(BuildRequest::initial(), &mut summary);
        }

        let mut debouncer =
            Debouncer::new(self.config.quiet_window).with_ignore(self.ignore.clone());

        summary.stop = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let wait = debouncer
                .time_until_ready(Instant::now())
                .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

            match events.recv_timeout(wait) {
                Ok(event) => {
                    debouncer.submit(event);
                    for event in events.try_iter().take(MAX_DRAIN_PER_POLL) {
                        debouncer.submit(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break StopReason::Disconnected,
            }

            if let Some(request) = debouncer.poll(Instant::now()) {
                self.sink.on_event(WatchEvent::ChangesDetected {
                    paths: request.path_strings(),
                });
                self.dispatch(request, &mut summary);
            }
        };

        summary.ignored_events = debouncer.ignored_count();
        summary.discarded_paths = debouncer.pending_len();
        if summary.discarded_paths > 0 {
            tracing::debug!(
                paths = summary.discarded_paths,
                stop = ?summary.stop,
                "discarding changes still inside the quiet window"
            );
        }
        tracing::debug!(?summary, "watch loop stopped");
        self.sink.on_event(WatchEvent::Shutdown);
        summary
    }

    fn dispatch(&self, request: BuildRequest, summary: &mut WatchSummary) {
        match self.orchestrator.submit(request) {
            Submission::Ran(reports) => {
                summary.cycles += reports.len();
                summary.failed_cycles += reports.iter().filter(|r| !r.is_success()).count();
            }
            Submission::Queued => summary.queued += 1,
        }
    }
}

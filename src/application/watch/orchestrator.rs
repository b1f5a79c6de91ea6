//! Watch Orchestrator
//!
//! Drives one build request through build and deploy, and guarantees that at
//! most one cycle runs at a time. Requests that arrive while a cycle is in
//! flight are merged into a single queued request that runs next.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::build::BuildExecutor;
use crate::application::deploy::{DeployError, DeployLauncher, DeployOutcome};
use crate::domain::entities::BuildCycle;
use crate::domain::ports::{ProcessLauncher, WatchEvent, WatchEventSink};
use crate::domain::services::BuildRequest;
use crate::domain::value_objects::{CancelToken, DeployTarget, WatchState};

use super::options::WatchConfig;

/// Output lines attached to a `BuildFailed` event
pub const EVENT_TAIL_LINES: usize = 20;

/// What happened to a submitted request
#[derive(Debug)]
pub enum Submission {
    /// The request ran, followed by any requests queued meanwhile
    Ran(Vec<CycleReport>),
    /// A cycle was already in flight; the request was merged into the queue
    Queued,
}

impl Submission {
    pub fn reports(&self) -> &[CycleReport] {
        match self {
            Submission::Ran(reports) => reports,
            Submission::Queued => &[],
        }
    }
}

/// Finished cycle plus the deploy result, if a deploy was attempted
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: BuildCycle,
    pub deploy: Option<Result<DeployOutcome, DeployError>>,
}

impl CycleReport {
    /// Build succeeded and the deploy (if any) did too
    pub fn is_success(&self) -> bool {
        self.cycle.is_succeeded() && !matches!(self.deploy, Some(Err(_)))
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: WatchState,
    queued: Option<BuildRequest>,
    next_cycle: u64,
    last_cycle: Option<BuildCycle>,
}

pub struct WatchOrchestrator<L: ProcessLauncher> {
    build_command: String,
    project_root: PathBuf,
    artifact: PathBuf,
    target: DeployTarget,
    executor: BuildExecutor<Arc<L>>,
    deployer: DeployLauncher<Arc<L>>,
    sink: Arc<dyn WatchEventSink>,
    cancel: CancelToken,
    inner: Mutex<Inner>,
}

impl<L: ProcessLauncher> WatchOrchestrator<L> {
    pub fn new(config: &WatchConfig, launcher: Arc<L>, sink: Arc<dyn WatchEventSink>) -> Self {
        let executor = BuildExecutor::new(Arc::clone(&launcher))
            .with_timeout(config.build_timeout)
            .with_output_lines(config.output_lines);
        let deployer = DeployLauncher::new(launcher, config.deploy_options());

        Self {
            build_command: config.build_command.clone(),
            project_root: config.project_root.clone(),
            artifact: config.artifact_path(),
            target: config.target,
            executor,
            deployer,
            sink,
            cancel: CancelToken::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Share the session's stop flag so an in-flight build or deploy command
    /// is killed on stop
    pub fn with_cancel(self, cancel: CancelToken) -> Self {
        Self {
            deployer: self.deployer.with_cancel(cancel.clone()),
            cancel,
            ..self
        }
    }

    pub fn state(&self) -> WatchState {
        self.lock().state
    }

    /// Most recently finished cycle
    pub fn last_cycle(&self) -> Option<BuildCycle> {
        self.lock().last_cycle.clone()
    }

    pub fn has_queued(&self) -> bool {
        self.lock().queued.is_some()
    }

    /// Run `request` now, or queue it if a cycle is already in flight.
    ///
    /// Blocks the caller for the whole cycle, including every request queued
    /// while it ran.
    pub fn submit(&self, request: BuildRequest) -> Submission {
        {
            let mut inner = self.lock();
            if inner.state.is_busy() {
                self.sink.on_event(WatchEvent::BuildQueued {
                    paths: request.path_strings(),
                });
                match inner.queued.as_mut() {
                    Some(queued) => queued.merge(request),
                    None => inner.queued = Some(request),
                }
                return Submission::Queued;
            }
            self.transition(&mut inner, WatchState::BuildPending);
        }

        let mut reports = Vec::new();
        let mut request = request;
        loop {
            reports.push(self.run_cycle(request));

            let mut inner = self.lock();
            self.transition(&mut inner, WatchState::Idle);

            let next = inner.queued.take();
            match next {
                Some(next) if !self.cancel.is_cancelled() => {
                    self.transition(&mut inner, WatchState::BuildPending);
                    request = next;
                }
                Some(dropped) => {
                    tracing::debug!(paths = dropped.len(), "dropping queued build on shutdown");
                    break;
                }
                None => break,
            }
        }

        Submission::Ran(reports)
    }

    /// BuildPending -> Building -> Deploying | Failed
    fn run_cycle(&self, request: BuildRequest) -> CycleReport {
        let mut cycle = {
            let mut inner = self.lock();
            inner.next_cycle += 1;
            let cycle = BuildCycle::new(inner.next_cycle, request.into_paths());
            self.transition(&mut inner, WatchState::Building);
            cycle
        };
        let id = cycle.id();

        if let Err(err) = cycle.start() {
            tracing::error!(error = %err, "build cycle lifecycle violation");
        }
        self.sink.on_event(WatchEvent::BuildStarted {
            cycle: id,
            command: self.build_command.clone(),
        });

        let outcome = self
            .executor
            .run(&self.build_command, &self.project_root, &self.cancel);
        if let Err(err) = cycle.finish(outcome) {
            tracing::error!(error = %err, "build cycle lifecycle violation");
        }

        let deploy = match cycle.failure() {
            None => {
                self.sink.on_event(WatchEvent::BuildSucceeded {
                    cycle: id,
                    duration_ms: cycle
                        .duration()
                        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                        .unwrap_or_default(),
                });
                self.transition(&mut self.lock(), WatchState::Deploying);
                Some(self.deploy(id))
            }
            Some(failure) => {
                self.sink.on_event(WatchEvent::BuildFailed {
                    cycle: id,
                    reason: failure.to_string(),
                    exit_code: failure.exit_code(),
                    output_tail: cycle.output().last(EVENT_TAIL_LINES),
                });
                self.transition(&mut self.lock(), WatchState::Failed);
                None
            }
        };

        self.lock().last_cycle = Some(cycle.clone());
        CycleReport { cycle, deploy }
    }

    fn deploy(&self, cycle: u64) -> Result<DeployOutcome, DeployError> {
        self.sink.on_event(WatchEvent::DeployStarted {
            cycle,
            artifact: self.artifact.display().to_string(),
            target: self.target.as_str().to_string(),
        });

        let result = self.deployer.deploy(&self.artifact, self.target);
        match &result {
            Ok(outcome) => self.sink.on_event(WatchEvent::DeployFinished {
                cycle,
                detail: outcome.to_string(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "deploy failed");
                self.sink.on_event(WatchEvent::DeployFailed {
                    cycle,
                    error: err.to_string(),
                });
            }
        }
        result
    }

    fn transition(&self, inner: &mut Inner, to: WatchState) {
        let from = inner.state;
        if !from.can_transition_to(to) {
            tracing::error!(%from, %to, "illegal watch state transition");
        }
        inner.state = to;
        self.sink.on_event(WatchEvent::StateChanged { from, to });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Test doubles shared by the application-layer tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::entities::OutputTail;
use crate::domain::ports::{
    LaunchError, ProcessExit, ProcessLauncher, ProcessOutput, ProcessSpec, WatchEvent,
    WatchEventSink,
};
use crate::domain::value_objects::{CancelToken, ProcessMatcher, WatchState};

/// Launcher that records every call and replays scripted exits
#[derive(Default)]
pub struct FakeLauncher {
    exits: Mutex<VecDeque<ProcessExit>>,
    run_delay: Duration,
    pub runs: Mutex<Vec<ProcessSpec>>,
    pub spawns: Mutex<Vec<ProcessSpec>>,
    pub terminations: Mutex<Vec<ProcessMatcher>>,
    pub terminate_result: Mutex<Option<LaunchError>>,
    pub running_instances: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exits returned by successive `run` calls; `Code(0)` once exhausted
    pub fn with_exits(exits: impl IntoIterator<Item = ProcessExit>) -> Self {
        Self {
            exits: Mutex::new(exits.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawns.lock().unwrap().len()
    }

    /// Highest number of `run` calls ever observed at the same time
    pub fn max_concurrent_runs(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ProcessLauncher for FakeLauncher {
    fn run(&self, spec: &ProcessSpec, cancel: &CancelToken) -> Result<ProcessOutput, LaunchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.runs.lock().unwrap().push(spec.clone());

        if !self.run_delay.is_zero() {
            std::thread::sleep(self.run_delay);
        }

        let exit = if cancel.is_cancelled() {
            ProcessExit::Cancelled
        } else {
            self.exits
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ProcessExit::Code(0))
        };

        let mut output = OutputTail::new(spec.output_lines);
        output.push(format!("ran: {}", spec.command_line()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ProcessOutput {
            exit,
            output,
            duration: self.run_delay,
        })
    }

    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32, LaunchError> {
        let mut spawns = self.spawns.lock().unwrap();
        spawns.push(spec.clone());
        self.running_instances.store(1, Ordering::SeqCst);
        Ok(1000 + spawns.len() as u32)
    }

    fn terminate_matching(
        &self,
        matcher: &ProcessMatcher,
        _timeout: Duration,
    ) -> Result<usize, LaunchError> {
        self.terminations.lock().unwrap().push(matcher.clone());
        if let Some(err) = self.terminate_result.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.running_instances.swap(0, Ordering::SeqCst))
    }
}

/// Sink that keeps every event for later assertions
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<WatchEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<(WatchState, WatchState)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WatchEvent::StateChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }
}

impl WatchEventSink for RecordingSink {
    fn on_event(&self, event: WatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

//! System Process Launcher
//!
//! `ProcessLauncher` backed by `std::process`. Builds run in their own
//! process group on Unix so a timeout or stop kills the whole tree, not just
//! the shell.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::domain::entities::OutputTail;
use crate::domain::ports::{LaunchError, ProcessExit, ProcessLauncher, ProcessOutput, ProcessSpec};
use crate::domain::value_objects::{CancelToken, ProcessMatcher};

#[cfg(unix)]
use regex::Regex;

/// How often a running child is checked for exit, timeout and stop
const WAIT_POLL: Duration = Duration::from_millis(20);

/// How long pipes may stay open after the shell exits, e.g. held by a
/// background job the build started
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Default)]
pub struct SystemProcessLauncher {
    /// Detached children, kept so they can be reaped
    detached: Mutex<Vec<Child>>,
}

impl SystemProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(spec: &ProcessSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }

    fn spawn_error(spec: &ProcessSpec, err: std::io::Error) -> LaunchError {
        if err.kind() == std::io::ErrorKind::NotFound {
            LaunchError::NotFound {
                program: spec.program.clone(),
            }
        } else {
            LaunchError::Spawn {
                program: spec.program.clone(),
                message: err.to_string(),
            }
        }
    }

    /// Drop detached children that have already exited
    fn reap(&self) {
        let mut detached = self.detached.lock().unwrap_or_else(PoisonError::into_inner);
        detached.retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl ProcessLauncher for SystemProcessLauncher {
    fn run(&self, spec: &ProcessSpec, cancel: &CancelToken) -> Result<ProcessOutput, LaunchError> {
        let mut child = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        let pid = child.id();
        let tail = Arc::new(Mutex::new(OutputTail::new(spec.output_lines)));
        let (done_tx, done_rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, Arc::clone(&tail), done_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, Arc::clone(&tail), done_tx.clone()));
        }
        drop(done_tx);

        let started = Instant::now();
        let exit = loop {
            match child.try_wait() {
                Ok(Some(status)) => break exit_from_status(status),
                Ok(None) => {}
                Err(err) => {
                    kill_tree(&mut child);
                    return Err(LaunchError::Wait {
                        program: spec.program.clone(),
                        message: err.to_string(),
                    });
                }
            }

            if cancel.is_cancelled() {
                tracing::debug!(pid = child.id(), "stopping build on cancel");
                kill_tree(&mut child);
                break ProcessExit::Cancelled;
            }
            if let Some(timeout) = spec.timeout {
                if started.elapsed() >= timeout {
                    tracing::debug!(pid = child.id(), ?timeout, "build timed out");
                    kill_tree(&mut child);
                    break ProcessExit::TimedOut { after: timeout };
                }
            }
            std::thread::sleep(WAIT_POLL);
        };

        // A normal exit still honors the timeout and stop while draining
        let grace_end = Instant::now() + OUTPUT_DRAIN_GRACE;
        let exited_normally = matches!(exit, ProcessExit::Code(_) | ProcessExit::Signaled);
        let drain_until = match spec.timeout {
            Some(timeout) if exited_normally => grace_end.min(started + timeout),
            _ => grace_end,
        };
        let stop = || exited_normally && cancel.is_cancelled();

        if drain_readers(&done_rx, readers.len(), drain_until, stop) {
            for reader in readers {
                let _ = reader.join();
            }
        } else {
            tracing::debug!(pid, "output still open after exit, detaching readers");
            #[cfg(unix)]
            signal::kill_group(pid);
        }
        let output = std::mem::take(&mut *tail.lock().unwrap_or_else(PoisonError::into_inner));

        Ok(ProcessOutput {
            exit,
            output,
            duration: started.elapsed(),
        })
    }

    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32, LaunchError> {
        self.reap();
        let child = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::spawn_error(spec, e))?;

        let pid = child.id();
        self.detached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(child);
        Ok(pid)
    }

    fn terminate_matching(
        &self,
        matcher: &ProcessMatcher,
        timeout: Duration,
    ) -> Result<usize, LaunchError> {
        self.reap();
        let pids = matching_pids(matcher)?;
        if pids.is_empty() {
            return Ok(0);
        }
        tracing::debug!(?pids, pattern = %matcher.to_pattern(), "terminating");

        for &pid in &pids {
            signal::terminate(pid);
        }

        let deadline = Instant::now() + timeout;
        loop {
            self.reap();
            let alive: Vec<u32> = pids.iter().copied().filter(|&p| signal::is_alive(p)).collect();
            if alive.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                for &pid in &alive {
                    signal::kill(pid);
                }
                self.reap();
                break;
            }
            std::thread::sleep(WAIT_POLL);
        }

        Ok(pids.len())
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: R,
    tail: Arc<Mutex<OutputTail>>,
    done: Sender<()>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    tail.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(line);
                }
            }
        }
        let _ = done.send(());
    })
}

/// Wait for `pending` readers to hit EOF. False if `until` passed or `stop`
/// fired first.
fn drain_readers(
    done: &Receiver<()>,
    mut pending: usize,
    until: Instant,
    stop: impl Fn() -> bool,
) -> bool {
    while pending > 0 {
        if stop() {
            return false;
        }
        let now = Instant::now();
        if now >= until {
            return false;
        }
        match done.recv_timeout(WAIT_POLL.min(until - now)) {
            Ok(()) => pending -= 1,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return true,
        }
    }
    true
}

fn exit_from_status(status: ExitStatus) -> ProcessExit {
    match status.code() {
        Some(code) => ProcessExit::Code(code),
        None => ProcessExit::Signaled,
    }
}

/// Kill the child and everything in its process group, then reap it
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    signal::kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

/// Pids of running processes whose command line matches, excluding ourselves
#[cfg(unix)]
fn matching_pids(matcher: &ProcessMatcher) -> Result<Vec<u32>, LaunchError> {
    let output = Command::new("ps")
        .args(["-eo", "pid=,args="])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| LaunchError::Terminate {
            pattern: matcher.to_pattern(),
            message: format!("could not list processes: {}", e),
        })?;

    let re = matcher.to_regex().map_err(|e| LaunchError::Terminate {
        pattern: matcher.to_pattern(),
        message: e.to_string(),
    })?;
    Ok(pids_in_listing(
        &String::from_utf8_lossy(&output.stdout),
        &re,
        std::process::id(),
    ))
}

/// Parse `ps -eo pid=,args=` output, keeping matching pids other than `own`
#[cfg(unix)]
fn pids_in_listing(listing: &str, re: &Regex, own: u32) -> Vec<u32> {
    listing
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (pid, args) = line.split_once(char::is_whitespace)?;
            let pid: u32 = pid.parse().ok()?;
            (pid != own && re.is_match(args.trim_start())).then_some(pid)
        })
        .collect()
}

#[cfg(not(unix))]
fn matching_pids(_matcher: &ProcessMatcher) -> Result<Vec<u32>, LaunchError> {
    Ok(Vec::new())
}

#[cfg(unix)]
mod signal {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    fn pid(raw: u32) -> Option<Pid> {
        i32::try_from(raw).ok().map(Pid::from_raw)
    }

    pub fn terminate(raw: u32) {
        if let Some(pid) = pid(raw) {
            let _ = signal::kill(pid, Signal::SIGTERM);
        }
    }

    pub fn kill(raw: u32) {
        if let Some(pid) = pid(raw) {
            let _ = signal::kill(pid, Signal::SIGKILL);
        }
    }

    pub fn kill_group(raw: u32) {
        if let Some(pid) = pid(raw) {
            let _ = signal::killpg(pid, Signal::SIGKILL);
        }
    }

    pub fn is_alive(raw: u32) -> bool {
        pid(raw).is_some_and(|pid| signal::kill(pid, None).is_ok())
    }
}

#[cfg(not(unix))]
mod signal {
    pub fn terminate(_raw: u32) {}
    pub fn kill(_raw: u32) {}
    pub fn is_alive(_raw: u32) -> bool {
        false
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(cmd: &str) -> ProcessSpec {
        ProcessSpec::shell(cmd)
    }

    #[test]
    fn exit_zero_captures_stdout_and_stderr() {
        let launcher = SystemProcessLauncher::new();
        let output = launcher
            .run(&shell("echo built; echo warn >&2"), &CancelToken::new())
            .unwrap();

        assert_eq!(output.exit, ProcessExit::Code(0));
        let lines = output.output.to_vec();
        assert!(lines.contains(&"built".to_string()));
        assert!(lines.contains(&"warn".to_string()));
    }

    #[test]
    fn nonzero_exit_code_is_reported() {
        let launcher = SystemProcessLauncher::new();
        let output = launcher.run(&shell("exit 3"), &CancelToken::new()).unwrap();
        assert_eq!(output.exit, ProcessExit::Code(3));
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let launcher = SystemProcessLauncher::new();

        let output = launcher
            .run(&shell("ls").current_dir(dir.path()), &CancelToken::new())
            .unwrap();
        assert!(output.output.to_vec().contains(&"marker.txt".to_string()));
    }

    #[test]
    fn output_is_bounded_to_tail() {
        let launcher = SystemProcessLauncher::new();
        let output = launcher
            .run(
                &shell("for i in 1 2 3 4 5 6; do echo line$i; done").output_lines(2),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(output.output.to_vec(), vec!["line5", "line6"]);
        assert_eq!(output.output.dropped(), 4);
    }

    #[test]
    fn timeout_kills_the_whole_tree() {
        let launcher = SystemProcessLauncher::new();
        let started = Instant::now();
        let output = launcher
            .run(
                &shell("sleep 30; echo never").timeout(Some(Duration::from_millis(200))),
                &CancelToken::new(),
            )
            .unwrap();

        assert!(matches!(output.exit, ProcessExit::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!output.output.to_vec().contains(&"never".to_string()));
    }

    #[test]
    fn cancel_stops_running_build() {
        let launcher = SystemProcessLauncher::new();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });

        let output = launcher.run(&shell("sleep 30"), &cancel).unwrap();
        assert_eq!(output.exit, ProcessExit::Cancelled);
    }

    #[test]
    fn background_job_holding_output_does_not_outlive_timeout() {
        let launcher = SystemProcessLauncher::new();
        let started = Instant::now();
        let output = launcher
            .run(
                &shell("sleep 6 & echo built").timeout(Some(Duration::from_millis(300))),
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(output.exit, ProcessExit::Code(0));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn background_job_holding_output_is_detached_after_grace() {
        let launcher = SystemProcessLauncher::new();
        let started = Instant::now();
        let output = launcher
            .run(&shell("sleep 6 & echo built"), &CancelToken::new())
            .unwrap();

        assert_eq!(output.exit, ProcessExit::Code(0));
        assert!(started.elapsed() < OUTPUT_DRAIN_GRACE + Duration::from_secs(2));
    }

    #[test]
    fn cancel_while_draining_returns_promptly() {
        let launcher = SystemProcessLauncher::new();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            trigger.cancel();
        });

        let started = Instant::now();
        let output = launcher.run(&shell("sleep 6 & exit 0"), &cancel).unwrap();

        assert_eq!(output.exit, ProcessExit::Code(0));
        assert!(started.elapsed() < OUTPUT_DRAIN_GRACE);
    }

    #[test]
    fn listing_keeps_matching_pids_except_own() {
        let matcher = ProcessMatcher::new("pcsx2", "/tmp/proj/app.elf");
        let re = matcher.to_regex().unwrap();
        let listing = "  101 pcsx2 --nogui /tmp/proj/app.elf\n\
                       \x20 102 mcp2-toolbox watch --elf /tmp/proj/app.elf\n\
                       \x20 103 pcsx2 /tmp/proj/app.elf\n\
                       garbage line\n";

        assert_eq!(pids_in_listing(listing, &re, 103), vec![101]);
    }

    #[test]
    fn missing_program_is_not_found() {
        let launcher = SystemProcessLauncher::new();
        let err = launcher
            .run(&ProcessSpec::new("definitely-not-a-real-binary-xyz"), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[test]
    fn terminate_matching_stops_detached_process() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("app.elf");
        std::fs::write(&artifact, b"").unwrap();

        // A shell loop stands in for the emulator; the artifact is its $0
        let launcher = SystemProcessLauncher::new();
        let spec = ProcessSpec::new("sh")
            .arg("-c")
            .arg("trap 'exit 0' TERM; while :; do sleep 0.1; done")
            .arg(artifact.to_string_lossy());
        let pid = launcher.spawn_detached(&spec).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert!(signal::is_alive(pid));

        let matcher = ProcessMatcher::new("sh", &artifact);
        let stopped = launcher
            .terminate_matching(&matcher, Duration::from_secs(2))
            .unwrap();

        assert_eq!(stopped, 1);
        assert!(!signal::is_alive(pid));
    }

    #[test]
    fn terminate_matching_without_matches_is_zero() {
        let launcher = SystemProcessLauncher::new();
        let matcher = ProcessMatcher::new("no-such-emulator", "/nowhere/app.elf");
        assert_eq!(
            launcher
                .terminate_matching(&matcher, Duration::from_millis(100))
                .unwrap(),
            0
        );
    }
}

//! Deploy Launcher Tests

use super::*;
use crate::application::testing::FakeLauncher;
use crate::domain::ports::{LaunchError, ProcessExit};
use crate::domain::value_objects::{CancelToken, DeployTarget};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn project_with_artifact() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let elf = dir.path().join("app.elf");
    std::fs::write(&elf, b"\x7fELF").unwrap();
    (dir, elf)
}

#[test]
fn build_only_is_skipped_without_touching_anything() {
    let launcher = DeployLauncher::new(FakeLauncher::new(), DeployOptions::new());
    let outcome = launcher
        .deploy(Path::new("/does/not/exist.elf"), DeployTarget::BuildOnly)
        .unwrap();

    assert_eq!(outcome, DeployOutcome::Skipped);
    assert_eq!(launcher.launcher().spawn_count(), 0);
}

#[test]
fn missing_artifact_is_reported() {
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new().with_emulator("pcsx2"),
    );
    let err = launcher
        .deploy(Path::new("/does/not/exist.elf"), DeployTarget::Emulator)
        .unwrap_err();

    assert!(matches!(err, DeployError::MissingArtifact { .. }));
    assert!(launcher.launcher().terminations.lock().unwrap().is_empty());
}

#[test]
fn emulator_target_requires_emulator() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(FakeLauncher::new(), DeployOptions::new());

    assert_eq!(
        launcher.deploy(&elf, DeployTarget::Emulator),
        Err(DeployError::MissingEmulator)
    );
}

#[test]
fn emulator_is_spawned_with_artifact() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new()
            .with_emulator("pcsx2")
            .with_emulator_args(["--nogui"]),
    );

    let outcome = launcher.deploy(&elf, DeployTarget::Emulator).unwrap();
    assert!(matches!(outcome, DeployOutcome::Launched { replaced: 0, .. }));

    let spawns = launcher.launcher().spawns.lock().unwrap();
    assert_eq!(spawns[0].program, "pcsx2");
    assert_eq!(
        spawns[0].args,
        vec!["--nogui".to_string(), elf.to_string_lossy().to_string()]
    );
}

#[test]
fn redeploy_terminates_previous_instance_first() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new().with_emulator("pcsx2"),
    );

    launcher.deploy(&elf, DeployTarget::Emulator).unwrap();
    let second = launcher.deploy(&elf, DeployTarget::Emulator).unwrap();

    assert!(matches!(second, DeployOutcome::Launched { replaced: 1, .. }));
    let fake = launcher.launcher();
    assert_eq!(fake.spawn_count(), 2);
    assert_eq!(fake.running_instances.load(Ordering::SeqCst), 1);

    let terminations = fake.terminations.lock().unwrap();
    assert_eq!(terminations.len(), 2);
    assert_eq!(terminations[0].program(), "pcsx2");
    assert_eq!(terminations[0].artifact(), elf.as_path());
}

#[test]
fn termination_failure_aborts_launch() {
    let (_dir, elf) = project_with_artifact();
    let fake = FakeLauncher::new();
    *fake.terminate_result.lock().unwrap() = Some(LaunchError::Terminate {
        pattern: "pcsx2".to_string(),
        message: "permission denied".to_string(),
    });
    let launcher = DeployLauncher::new(fake, DeployOptions::new().with_emulator("pcsx2"));

    let err = launcher.deploy(&elf, DeployTarget::Emulator).unwrap_err();
    assert!(matches!(err, DeployError::Terminate(_)));
    assert_eq!(launcher.launcher().spawn_count(), 0);
}

#[test]
fn hardware_target_runs_rendered_command() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new()
            .with_deploy_command("curl -T {elf} ftp://{host}/")
            .with_host("192.168.1.50"),
    );

    let outcome = launcher.deploy(&elf, DeployTarget::Hardware).unwrap();
    assert_eq!(
        outcome,
        DeployOutcome::Uploaded {
            host: "192.168.1.50".to_string()
        }
    );

    let runs = launcher.launcher().runs.lock().unwrap();
    let command = runs[0].args.last().unwrap();
    assert_eq!(
        command,
        &format!("curl -T {} ftp://192.168.1.50/", elf.display())
    );
}

#[test]
fn hardware_target_needs_host_when_template_uses_it() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new().with_deploy_command("upload {elf} {host}"),
    );
    assert_eq!(
        launcher.deploy(&elf, DeployTarget::Hardware),
        Err(DeployError::MissingHost)
    );
}

#[test]
fn hardware_command_failure_carries_tail() {
    let (_dir, elf) = project_with_artifact();
    let launcher = DeployLauncher::new(
        FakeLauncher::with_exits([ProcessExit::Code(7)]),
        DeployOptions::new().with_deploy_command("upload {elf}"),
    );

    let err = launcher.deploy(&elf, DeployTarget::Hardware).unwrap_err();
    assert_eq!(err.to_string(), "deploy command exited with code 7");
    assert!(!err.output_tail().is_empty());
}

#[test]
fn hardware_command_stops_on_session_cancel() {
    let (_dir, elf) = project_with_artifact();
    let cancel = CancelToken::new();
    cancel.cancel();
    let launcher = DeployLauncher::new(
        FakeLauncher::new(),
        DeployOptions::new().with_deploy_command("upload {elf}"),
    )
    .with_cancel(cancel);

    match launcher.deploy(&elf, DeployTarget::Hardware) {
        Err(DeployError::CommandFailed { reason, .. }) => assert_eq!(reason, "cancelled"),
        other => panic!("expected cancelled deploy, got {:?}", other),
    }
    assert_eq!(launcher.launcher().run_count(), 1);
}

#[test]
fn render_command_substitutes_placeholders() {
    assert_eq!(
        render_command("ps2client -h {host} execee host:{elf}", Path::new("app.elf"), "10.0.0.2"),
        "ps2client -h 10.0.0.2 execee host:app.elf"
    );
}

pub mod config;
pub mod list;
pub mod run;
pub mod ui;
pub mod watch;

use std::process::ExitCode;

use crate::cli::ProjectArgs;
use mcp2_toolbox::Config;

/// Exit code when the user interrupts (128 + SIGINT)
pub const EXIT_INTERRUPTED: u8 = 130;

pub fn interrupted() -> ExitCode {
    ExitCode::from(EXIT_INTERRUPTED)
}

/// CLI flags win over env and file values
pub fn apply_project_args(config: &mut Config, args: &ProjectArgs) {
    let watch = &mut config.watch;
    if let Some(project) = &args.project {
        watch.project = Some(project.clone());
    }
    if let Some(elf) = &args.elf {
        watch.elf = Some(elf.clone());
    }
    if let Some(build) = &args.build {
        watch.build_command = build.clone();
    }
    if let Some(target) = args.target {
        watch.target = target;
    }
    if let Some(emulator) = &args.emulator {
        watch.emulator = Some(emulator.clone());
    }
    if let Some(host) = &args.host {
        watch.host = Some(host.clone());
    }
    if let Some(secs) = args.timeout {
        watch.build_timeout_secs = Some(secs);
    }
}

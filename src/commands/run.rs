use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use crate::commands::watch::event_sink;
use crate::commands::{apply_project_args, interrupted};
use crate::ui::context::UiContext;
use mcp2_toolbox::application::watch::Submission;
use mcp2_toolbox::infrastructure::SystemProcessLauncher;
use mcp2_toolbox::{CancelToken, Config, WatchUseCase};

/// One build and deploy through the watch orchestrator
pub fn cmd_run(
    mut config: Config,
    args: &ProjectArgs,
    ui: UiContext,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    apply_project_args(&mut config, args);
    let cwd = std::env::current_dir().context("cannot determine current directory")?;

    let use_case = WatchUseCase::new(
        config.watch_config(&cwd)?,
        Arc::new(SystemProcessLauncher::default()),
        event_sink(ui),
        cancel.clone(),
    )?;

    if !ui.json {
        print!(
            "{}",
            crate::ui::views::watch::render_watch_header(
                "MCP2 Run",
                use_case.config(),
                ui.color,
                ui.unicode
            )
        );
    }

    let submission = use_case.run_once();
    if cancel.is_cancelled() {
        return Ok(interrupted());
    }

    let ok = match &submission {
        Submission::Ran(reports) => !reports.is_empty() && reports.iter().all(|r| r.is_success()),
        Submission::Queued => false,
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

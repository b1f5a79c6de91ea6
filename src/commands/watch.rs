use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use crate::commands::{apply_project_args, interrupted};
use crate::ui::context::UiContext;
use crate::ui::sink::ConsoleEventSink;
use mcp2_toolbox::application::watch::StopReason;
use mcp2_toolbox::infrastructure::fs::DEFAULT_CHANNEL_CAPACITY;
use mcp2_toolbox::infrastructure::{FsWatcher, JsonEventSink, SystemProcessLauncher};
use mcp2_toolbox::{CancelToken, Config, WatchEventSink, WatchUseCase};

pub fn cmd_watch(
    mut config: Config,
    args: &ProjectArgs,
    quiet_ms: Option<u64>,
    no_initial_build: bool,
    ui: UiContext,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    apply_project_args(&mut config, args);
    if let Some(ms) = quiet_ms {
        config.watch.quiet_window_ms = ms;
    }
    if no_initial_build {
        config.watch.build_on_start = false;
    }

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let watch_config = config.watch_config(&cwd)?;

    let use_case = WatchUseCase::new(
        watch_config,
        Arc::new(SystemProcessLauncher::default()),
        event_sink(ui),
        cancel.clone(),
    )?;

    if !ui.json {
        print!(
            "{}",
            crate::ui::views::watch::render_watch_header(
                "MCP2 Watch",
                use_case.config(),
                ui.color,
                ui.unicode
            )
        );
    }

    let (watcher, events) = FsWatcher::start(use_case.config().project_root(), DEFAULT_CHANNEL_CAPACITY)?;
    let summary = use_case.start(events);
    drop(watcher);

    tracing::info!(
        cycles = summary.cycles,
        failed = summary.failed_cycles,
        queued = summary.queued,
        ignored = summary.ignored_events,
        "watch finished"
    );

    Ok(match summary.stop {
        StopReason::Cancelled => interrupted(),
        StopReason::Disconnected => {
            tracing::warn!("file watcher stopped unexpectedly");
            ExitCode::FAILURE
        }
    })
}

pub fn event_sink(ui: UiContext) -> Arc<dyn WatchEventSink> {
    if ui.json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::new(ui))
    }
}

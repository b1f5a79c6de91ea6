//! mcp2-toolbox CLI
//!
//! Usage: mcp2-toolbox <COMMAND>
//!
//! Commands:
//!   watch   Watch the project, rebuild on change, deploy each good build
//!   run     Build and deploy once
//!   list    List MCP2 devices on the local network
//!   ui      Pick a device interactively
//!   config  Print the effective configuration

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};
use mcp2_toolbox::{CancelToken, Config};
use ui::context::UiContext;
use ui::primitives::icon::Icon;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version land here too, with exit code 0
            let _ = err.print();
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
        }
    };

    init_tracing(cli.verbose);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!(error = %err, "cannot install Ctrl+C handler");
    }

    match run(cli, &cancel) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// `MCP2_LOG` wins; otherwise `-v` raises the level from `warn`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("MCP2_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, cancel: &CancelToken) -> Result<ExitCode> {
    let (config, warnings) = Config::load_or_default()?;
    let ui = UiContext::new(cli.json, cli.verbose, cli.color, &config);

    for warning in &warnings {
        if ui.json {
            tracing::warn!(key = %warning.key, file = %warning.file.display(), "unknown config key");
        } else {
            eprintln!("{} {}", Icon::Warning.colored(ui.color, ui.unicode), warning);
        }
    }

    match cli.command {
        Commands::Watch {
            project,
            quiet_ms,
            no_initial_build,
        } => commands::watch::cmd_watch(config, &project, quiet_ms, no_initial_build, ui, cancel),
        Commands::Run { project } => commands::run::cmd_run(config, &project, ui, cancel),
        Commands::List { browse } => commands::list::cmd_list(&config, browse, ui, cancel),
        Commands::Ui { browse } => commands::ui::cmd_ui(&config, browse, ui, cancel),
        Commands::Config => commands::config::cmd_config(&config, ui),
    }
}

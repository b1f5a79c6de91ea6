//! CLI Argument Parsing
//!
//! Global flags (--json, --color, --verbose) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mcp2_toolbox::DeployTarget;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// mcp2-toolbox - watch, build and deploy console homebrew; find MCP2 devices
#[derive(Parser, Debug)]
#[command(name = "mcp2-toolbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by `watch` and `run`; each overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (default: current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Built artifact, relative to the project
    #[arg(short, long)]
    pub elf: Option<PathBuf>,

    /// Build command (run through the shell)
    #[arg(short, long)]
    pub build: Option<String>,

    /// Where a successful build goes
    #[arg(short, long, value_enum)]
    pub target: Option<DeployTarget>,

    /// Emulator executable
    #[arg(long)]
    pub emulator: Option<String>,

    /// Device address for the hardware target
    #[arg(long)]
    pub host: Option<String>,

    /// Build timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the project, rebuild on change and deploy each good build
    Watch {
        #[command(flatten)]
        project: ProjectArgs,

        /// Quiet window before a burst of changes triggers a build
        #[arg(long, value_name = "MS")]
        quiet_ms: Option<u64>,

        /// Wait for the first change instead of building immediately
        #[arg(long)]
        no_initial_build: bool,
    },

    /// Build and deploy once
    Run {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// List MCP2 devices on the local network
    List {
        /// Browse duration in seconds
        #[arg(long, value_name = "SECS")]
        browse: Option<u64>,
    },

    /// Pick a device interactively
    Ui {
        /// Browse duration in seconds
        #[arg(long, value_name = "SECS")]
        browse: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

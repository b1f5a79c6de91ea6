use std::process::ExitCode;

use anyhow::Result;

use crate::ui::context::UiContext;
use mcp2_toolbox::config::default_config_path;
use mcp2_toolbox::Config;

/// Print the merged configuration (file + env)
pub fn cmd_config(config: &Config, ui: UiContext) -> Result<ExitCode> {
    if ui.json {
        let value = serde_json::json!({ "command": "config", "config": config });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    match default_config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# no config directory, using defaults"),
    }
    print!("{}", serde_yaml_ng::to_string(config)?);
    Ok(ExitCode::SUCCESS)
}

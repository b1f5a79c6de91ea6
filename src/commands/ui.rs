use std::net::IpAddr;
use std::process::ExitCode;

use anyhow::{bail, Result};
use dialoguer::{Input, Select};

use crate::commands::interrupted;
use crate::commands::list::discover;
use crate::ui::context::UiContext;
use crate::ui::theme::ToolboxTheme;
use crate::ui::views::devices::picker_items;
use mcp2_toolbox::{CancelToken, Config, Device};

const MANUAL_ENTRY: &str = "Manual IP";

/// Discover, then let the user pick a device or type an address
pub fn cmd_ui(
    config: &Config,
    browse_secs: Option<u64>,
    ui: UiContext,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    let devices = discover(config, browse_secs, cancel)?;
    if cancel.is_cancelled() {
        return Ok(interrupted());
    }

    let target = if ui.interactive() {
        match pick(&devices, ui.unicode)? {
            Some(target) => target,
            None => return Ok(interrupted()),
        }
    } else {
        match devices.first() {
            Some(device) => device.address.to_string(),
            None => bail!("no devices found and no terminal for manual entry"),
        }
    };

    if ui.json {
        let value = serde_json::json!({ "command": "ui", "target": target });
        println!("{}", value);
    } else {
        println!("Using target {}", target);
    }
    Ok(ExitCode::SUCCESS)
}

fn pick(devices: &[Device], unicode: bool) -> Result<Option<String>> {
    let theme = ToolboxTheme::new(unicode);
    let mut items = picker_items(devices);
    items.push(MANUAL_ENTRY.to_string());

    let Some(index) = Select::with_theme(&theme)
        .with_prompt("Select MCP2 device")
        .items(&items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    if let Some(device) = devices.get(index) {
        return Ok(Some(device.address.to_string()));
    }

    let address: String = Input::with_theme(&theme)
        .with_prompt("Device IP")
        .validate_with(|input: &String| -> Result<(), String> {
            input
                .trim()
                .parse::<IpAddr>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not an IP address", input.trim()))
        })
        .interact_text()?;
    Ok(Some(address.trim().to_string()))
}

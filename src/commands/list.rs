use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::commands::interrupted;
use crate::ui::context::UiContext;
use crate::ui::views::devices::{render_device_list, render_devices_json};
use mcp2_toolbox::infrastructure::{MdnsTransport, SystemResolver};
use mcp2_toolbox::{CancelToken, Config, Device, DiscoveryService};

pub fn cmd_list(
    config: &Config,
    browse_secs: Option<u64>,
    ui: UiContext,
    cancel: &CancelToken,
) -> Result<ExitCode> {
    let devices = discover(config, browse_secs, cancel)?;
    if cancel.is_cancelled() {
        return Ok(interrupted());
    }
    if ui.json {
        println!("{}", render_devices_json(&devices));
    } else {
        print!("{}", render_device_list(&devices));
    }
    Ok(ExitCode::SUCCESS)
}

/// Browse the configured service types once and return the snapshot.
/// A set `cancel` cuts the browse short.
pub fn discover(
    config: &Config,
    browse_secs: Option<u64>,
    cancel: &CancelToken,
) -> Result<Vec<Device>> {
    let mut discovery = config.discovery_config().validate()?;
    if let Some(secs) = browse_secs {
        discovery = discovery.with_browse(Duration::from_secs(secs));
    }
    let browse = discovery.browse;

    let service = DiscoveryService::new(discovery).with_resolver(Arc::new(SystemResolver));
    let mut transport = MdnsTransport::new();
    let devices = service.discover_for(&mut transport, browse, cancel)?;
    tracing::debug!(found = devices.len(), "browse finished");
    Ok(devices)
}

use mcp2_toolbox::Device;

/// Printed by `list` when discovery finds nothing
pub const NO_DEVICES_MESSAGE: &str = "No MCP2 devices found (mdns). Try manual IP.";

/// `name<TAB>ip` per device, in first-seen order
pub fn render_device_list(devices: &[Device]) -> String {
    if devices.is_empty() {
        return format!("{}\n", NO_DEVICES_MESSAGE);
    }
    devices
        .iter()
        .map(|d| format!("{}\t{}\n", d.display_name(), d.address))
        .collect()
}

pub fn render_devices_json(devices: &[Device]) -> String {
    let value = serde_json::json!({
        "command": "list",
        "devices": devices,
    });
    serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Picker rows: `name (ip)` per device
pub fn picker_items(devices: &[Device]) -> Vec<String> {
    devices
        .iter()
        .map(|d| format!("{} ({})", d.display_name(), d.address))
        .collect()
}

//! Tests for config loading and conversion

use super::loader::{apply_overrides, distance, load_or_default, parse_with_warnings};
use super::*;
use crate::domain::value_objects::DeployTarget;
use crate::error::ToolboxError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn parse(content: &str) -> (Config, Vec<ConfigWarning>) {
    parse_with_warnings(content, Path::new("mcp2-toolbox.yml")).unwrap()
}

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.watch.build_command, "make");
    assert_eq!(config.watch.quiet_window_ms, 300);
    assert_eq!(config.watch.kill_timeout_ms, 2000);
    assert_eq!(config.watch.output_lines, 200);
    assert!(config.watch.build_on_start);
    assert_eq!(config.discovery.staleness_secs, 30);
    assert_eq!(config.discovery.sweep_interval_ms, 1000);
    assert_eq!(config.discovery.browse_secs, 2);
    assert_eq!(config.output.color, ColorMode::Auto);
}

#[test]
fn test_parse_partial_sections() {
    let (config, warnings) = parse(
        r#"
watch:
  elf: build/game.elf
  target: hardware
  host: 192.168.1.40
  quiet_window_ms: 150
discovery:
  browse_secs: 5
"#,
    );

    assert!(warnings.is_empty());
    assert_eq!(config.watch.elf, Some(PathBuf::from("build/game.elf")));
    assert_eq!(config.watch.target, DeployTarget::Hardware);
    assert_eq!(config.watch.quiet_window_ms, 150);
    assert_eq!(config.watch.build_command, "make");
    assert_eq!(config.discovery.browse_secs, 5);
    assert_eq!(config.discovery.staleness_secs, 30);
}

#[test]
fn test_empty_file_is_default() {
    let (config, warnings) = parse("   \n");
    assert_eq!(config, Config::default());
    assert!(warnings.is_empty());
}

#[test]
fn test_unknown_key_warning_with_suggestion() {
    let (_, warnings) = parse("watch:\n  elff: game.elf\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "elff");
    assert_eq!(warnings[0].line, Some(2));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("elf"));
    assert!(warnings[0].to_string().contains("did you mean 'elf'"));
}

#[test]
fn test_unknown_key_without_close_match() {
    let (_, warnings) = parse("frobnicate: true\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion, None);
}

#[test]
fn test_invalid_yaml_is_invalid_config() {
    let err = parse_with_warnings("watch: [unclosed", Path::new("bad.yml")).unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidConfig { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_wrong_type_is_invalid_config() {
    let err = parse_with_warnings("watch:\n  quiet_window_ms: soon\n", Path::new("bad.yml"))
        .unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidConfig { .. }));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let (config, warnings) = load_or_default(Some(&dir.path().join("absent.yml"))).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(config.discovery, DiscoverySection::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mcp2-toolbox.yml");
    std::fs::write(&path, "watch:\n  emulator: pcsx2\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.watch.emulator.as_deref(), Some("pcsx2"));
}

#[test]
fn test_env_overrides() {
    let config = apply_overrides(
        Config::default(),
        env(&[
            ("MCP2_ELF", "out/app.elf"),
            ("MCP2_TARGET", "build-only"),
            ("MCP2_QUIET_MS", "75"),
            ("MCP2_COLOR", "never"),
        ]),
    );
    assert_eq!(config.watch.elf, Some(PathBuf::from("out/app.elf")));
    assert_eq!(config.watch.target, DeployTarget::BuildOnly);
    assert_eq!(config.watch.quiet_window_ms, 75);
    assert_eq!(config.output.color, ColorMode::Never);
}

#[test]
fn test_invalid_env_values_are_ignored() {
    let config = apply_overrides(
        Config::default(),
        env(&[("MCP2_TARGET", "moon"), ("MCP2_QUIET_MS", "fast")]),
    );
    assert_eq!(config.watch.target, DeployTarget::Emulator);
    assert_eq!(config.watch.quiet_window_ms, 300);
}

#[test]
fn test_watch_config_requires_artifact() {
    let err = Config::default().watch_config(Path::new("/tmp")).unwrap_err();
    assert!(err.to_string().contains("watch.elf"));
}

#[test]
fn test_watch_config_conversion() {
    let (config, _) = parse(
        "watch:\n  project: game\n  elf: game.elf\n  build_timeout_secs: 90\n  build_on_start: false\n",
    );
    let watch = config.watch_config(Path::new("/work")).unwrap();
    assert_eq!(watch.project_root, PathBuf::from("/work/game"));
    assert_eq!(watch.artifact, PathBuf::from("game.elf"));
    assert_eq!(watch.build_timeout, Some(Duration::from_secs(90)));
    assert_eq!(watch.quiet_window, Duration::from_millis(300));
    assert!(!watch.build_on_start);
}

#[test]
fn test_discovery_config_conversion() {
    let (config, _) = parse("discovery:\n  service_types: [_mcp2._tcp.local.]\n  sweep_interval_ms: 250\n");
    let discovery = config.discovery_config();
    assert_eq!(discovery.service_types, vec!["_mcp2._tcp.local."]);
    assert_eq!(discovery.sweep_interval, Duration::from_millis(250));
    assert!(discovery.validate().is_ok());
}

#[test]
fn test_levenshtein() {
    assert_eq!(distance("elf", "elf"), 0);
    assert_eq!(distance("elff", "elf"), 1);
    assert_eq!(distance("hots", "host"), 2);
    assert_eq!(distance("", "abc"), 3);
}

#[test]
fn test_config_serializes_to_yaml() {
    let yaml = serde_yaml_ng::to_string(&Config::default()).unwrap();
    assert!(yaml.contains("quiet_window_ms: 300"));
    assert!(yaml.contains("target: emulator"));
}

//! Integration tests for configuration loading
//!
//! Covers both the operational config (`VISION_CONFIG`) and the site
//! configuration read through a provider.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use libvision::config::Config;
use libvision::provider::provider_for_source;
use libvision::{Shell, ShellOptions, ViewKind, VisionError};
use serial_test::serial;
use tempfile::TempDir;

const SITE_TOML: &str = r#"
navigation = [
    { label = "Home", href = "/" },
    { label = "Donate", href = "https://give.example.org" },
]

[organization]
name = "Father's Vision"
tagline = "A father figure for every child"
contact_email = "hello@fathersvision.org"

[home]
headline = "Every child deserves a father figure"

[[home.sections]]
title = "Mentoring"
body = "Weekly sessions with trained volunteers."

[footer]
text = "Registered charity"
"#;

/// Helper to escape path for TOML on Windows
fn escape_path_for_toml(path: &str) -> String {
    path.replace('\\', "\\\\")
}

fn write_site(dir: &TempDir) -> String {
    let path = dir.path().join("site.toml");
    fs::write(&path, SITE_TOML).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
#[serial]
fn test_vision_config_env_is_used() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[site]
source = "https://cms.example.org/site.json"
maintenance = true

[server.preview]
host = "127.0.0.1"
port = 9000

[notifications]
duration = "2s"
"#,
    )
    .unwrap();

    std::env::set_var("VISION_CONFIG", &config_path);
    let config = Config::load();
    std::env::remove_var("VISION_CONFIG");

    let config = config.unwrap();
    assert_eq!(config.site.source, "https://cms.example.org/site.json");
    assert!(config.site.maintenance);
    assert_eq!(config.server.preview.address(), "127.0.0.1:9000");
    assert_eq!(config.server.dev.address(), "0.0.0.0:5173");
    assert_eq!(config.notifications.duration, Duration::from_secs(2));
}

#[test]
#[serial]
fn test_missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("VISION_CONFIG", dir.path().join("absent.toml"));
    let result = Config::load();
    std::env::remove_var("VISION_CONFIG");

    let error = result.unwrap_err();
    assert!(matches!(error, VisionError::Config(_)));
    assert_eq!(error.exit_code(), 2);
}

#[test]
#[serial]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[site]\nsource = \"\"\n").unwrap();

    std::env::set_var("VISION_CONFIG", &config_path);
    let result = Config::load();
    std::env::remove_var("VISION_CONFIG");

    assert!(matches!(result, Err(VisionError::Config(_))));
}

#[tokio::test]
async fn test_file_source_renders_site() {
    let dir = TempDir::new().unwrap();
    let source = write_site(&dir);
    let config = Config::from_toml(&format!(
        "[site]\nsource = \"{}\"\n",
        escape_path_for_toml(&source)
    ))
    .unwrap();

    let provider = provider_for_source(&config.site.source);
    let shell = Shell::mount(provider, ShellOptions::from_config(&config));

    let response = shell.respond_settled("/").await;
    assert_eq!(response.view(), Some(ViewKind::App));

    let html = response.html().unwrap();
    assert!(html.contains("Every child deserves a father figure"));
    assert!(html.contains("Weekly sessions with trained volunteers."));
    assert!(html.contains("https://give.example.org"));
    assert!(html.contains("mailto:hello@fathersvision.org"));
    assert!(html.contains("Registered charity"));
}

#[tokio::test]
async fn test_json_source_is_supported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.json");
    fs::write(&path, r#"{"organization": {"name": "Father's Vision"}}"#).unwrap();

    let provider = provider_for_source(&path.to_string_lossy());
    let config = provider.load_config().await.unwrap();
    assert_eq!(config.organization.name, "Father's Vision");
    assert_eq!(config.navigation.len(), 1);
}

#[tokio::test]
async fn test_broken_source_shows_error_view() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.toml");
    fs::write(&path, "[organization\nname = ").unwrap();

    let shell = Shell::mount(
        provider_for_source(&path.to_string_lossy()),
        ShellOptions::default(),
    );
    let state = shell.settled().await;
    assert!(state.error.is_some());
    assert_eq!(shell.view_kind(), ViewKind::Error);
}

#[tokio::test]
async fn test_unreachable_http_source_shows_error_view() {
    let shell = Shell::mount(
        Arc::new(
            libvision::provider::HttpProvider::new("http://127.0.0.1:9/site.json")
                .with_timeout(Duration::from_secs(2)),
        ),
        ShellOptions::default(),
    );
    shell.settled().await;
    assert_eq!(shell.view_kind(), ViewKind::Error);
}

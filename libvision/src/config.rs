//! Operational configuration for the Vision site binaries
//!
//! This is the server's own configuration (where to load the site
//! configuration from, which host/port each server binds, toast defaults).
//! It is loaded once at startup and passed down explicitly; the site
//! configuration itself is produced by a [`crate::provider::ConfigProvider`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default location of the site configuration, relative to the working directory
pub const DEFAULT_SITE_SOURCE: &str = "site.toml";

/// Title shown before the site configuration is available
pub const DEFAULT_SITE_TITLE: &str = "Father's Vision";

/// Language used when nothing else is configured
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    /// File path or `http(s)://` URL of the site configuration
    #[serde(default = "default_site_source")]
    pub source: String,
    /// Title used by the loading screen
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// External maintenance switch observed by the shell
    #[serde(default)]
    pub maintenance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ListenConfig::dev")]
    pub dev: ListenConfig,
    #[serde(default = "ListenConfig::preview")]
    pub preview: ListenConfig,
    /// Directory served under `/static`
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_toast_position")]
    pub position: String,
    #[serde(
        default = "default_toast_duration",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    #[serde(default = "default_toast_background")]
    pub background: String,
    #[serde(default = "default_toast_color")]
    pub color: String,
}

impl ListenConfig {
    /// Development server address
    pub fn dev() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5173,
        }
    }

    /// Preview server address
    pub fn preview() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4173,
        }
    }

    /// `host:port` form accepted by `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            source: default_site_source(),
            title: default_site_title(),
            language: default_language(),
            maintenance: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dev: ListenConfig::dev(),
            preview: ListenConfig::preview(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            position: default_toast_position(),
            duration: default_toast_duration(),
            background: default_toast_background(),
            color: default_toast_color(),
        }
    }
}

fn default_site_source() -> String {
    DEFAULT_SITE_SOURCE.to_string()
}

fn default_site_title() -> String {
    DEFAULT_SITE_TITLE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_toast_position() -> String {
    "top-right".to_string()
}

fn default_toast_duration() -> Duration {
    Duration::from_millis(4000)
}

fn default_toast_background() -> String {
    "#363636".to_string()
}

fn default_toast_color() -> String {
    "#fff".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}

impl Config {
    /// Load configuration from the default location
    ///
    /// An explicit `VISION_CONFIG` path must exist. The default XDG path is
    /// optional: when it is absent the built-in defaults are used.
    pub fn load() -> Result<Self> {
        if let Some(path) = explicit_config_path() {
            return Self::load_from_path(&path);
        }

        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.site.source.trim().is_empty() {
            return Err(ConfigError::MissingField("site.source".to_string()).into());
        }
        if self.site.language.trim().is_empty() {
            return Err(ConfigError::MissingField("site.language".to_string()).into());
        }
        for (field, listen) in [("server.dev", &self.server.dev), ("server.preview", &self.server.preview)] {
            if listen.host.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("{}.host", field)).into());
            }
        }
        Ok(())
    }
}

fn explicit_config_path() -> Option<PathBuf> {
    std::env::var("VISION_CONFIG")
        .ok()
        .map(|path| PathBuf::from(shellexpand::tilde(&path).to_string()))
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Some(path) = explicit_config_path() {
        return Ok(path);
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("vision").join("config.toml"))
}

//! Deployment manifest (`deployment.yml`)

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

pub const DEFAULT_MANIFEST: &str = "deployment.yml";

pub const DEFAULT_HEALTH_ENDPOINT: &str = "/api/keep_alive";

pub const DEFAULT_PROJECT_FILE: &str = "Cargo.toml";

pub const DEFAULT_BUILD_COMMAND: &str = "cargo build --release";

pub const DEFAULT_DEV_COMMAND: &str = "vision-serve";

pub const DEFAULT_LOCAL_PORT: u16 = 5173;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerEntry>,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub deployment_scripts: DeploymentScripts,

    #[serde(default)]
    pub monitoring: Monitoring,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Display name; `Production` selects a production Vercel deploy
    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type", default = "default_server_type")]
    pub server_type: String,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub environment_variables: HashMap<String, String>,

    #[serde(default)]
    pub build_settings: BuildSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default)]
    pub build_command: Option<String>,

    #[serde(default)]
    pub dev_command: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Files that must exist before anything runs
    #[serde(default)]
    pub static_files: Vec<String>,

    #[serde(default = "default_project_file")]
    pub project_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentScripts {
    #[serde(default)]
    pub pre_deploy: Vec<String>,

    #[serde(default)]
    pub post_deploy: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Monitoring {
    #[serde(default)]
    pub health_check: HealthCheckSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckSettings {
    #[serde(default = "default_health_endpoint")]
    pub endpoint: String,
}

/// Kinds of server the deployer knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    Vercel,
    Local,
}

impl std::str::FromStr for ServerKind {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vercel" => Ok(ServerKind::Vercel),
            "local" => Ok(ServerKind::Local),
            other => Err(DeployError::UnknownServerType(other.to_string())),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            static_files: Vec::new(),
            project_file: default_project_file(),
        }
    }
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            endpoint: default_health_endpoint(),
        }
    }
}

fn default_server_type() -> String {
    "unknown".to_string()
}

fn default_project_file() -> String {
    DEFAULT_PROJECT_FILE.to_string()
}

fn default_health_endpoint() -> String {
    DEFAULT_HEALTH_ENDPOINT.to_string()
}

impl ServerEntry {
    pub fn kind(&self) -> Result<ServerKind, DeployError> {
        self.server_type.parse()
    }

    pub fn is_production(&self) -> bool {
        self.name.as_deref() == Some("Production")
    }

    pub fn build_command(&self) -> &str {
        self.build_settings
            .build_command
            .as_deref()
            .unwrap_or(DEFAULT_BUILD_COMMAND)
    }

    pub fn dev_command(&self) -> &str {
        self.build_settings
            .dev_command
            .as_deref()
            .unwrap_or(DEFAULT_DEV_COMMAND)
    }

    pub fn port(&self) -> u16 {
        self.build_settings.port.unwrap_or(DEFAULT_LOCAL_PORT)
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeployError::ManifestRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, DeployError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn server(&self, key: &str) -> Result<&ServerEntry, DeployError> {
        self.servers.get(key).ok_or_else(|| DeployError::UnknownServer {
            name: key.to_string(),
            available: self.servers.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }
}

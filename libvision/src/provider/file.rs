//! File-backed configuration provider

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::ConfigProvider;
use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

/// Reads the site configuration from disk
///
/// The format follows the extension: `.json` is parsed as JSON, everything
/// else as TOML.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

#[async_trait]
impl ConfigProvider for FileProvider {
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigLoadError::Read {
                path: self.path.display().to_string(),
                source,
            })?;

        let config: SiteConfig = if self.is_json() {
            serde_json::from_str(&content).map_err(|e| ConfigLoadError::Parse(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| ConfigLoadError::Parse(e.to_string()))?
        };

        config.validate()?;
        tracing::debug!("Read site configuration from {}", self.path.display());
        Ok(config)
    }

    fn describe(&self) -> String {
        format!("file ({})", self.path.display())
    }
}

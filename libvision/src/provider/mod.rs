//! Configuration providers
//!
//! A provider resolves the [`SiteConfig`] the shell renders. The shell calls
//! [`ConfigProvider::load_config`] exactly once per mount and treats the
//! result as opaque beyond success or failure.
//!
//! # Examples
//!
//! ```no_run
//! use libvision::provider::{provider_for_source, ConfigProvider};
//!
//! # async fn example() -> Result<(), libvision::error::ConfigLoadError> {
//! let provider = provider_for_source("~/sites/vision/site.toml");
//! let config = provider.load_config().await?;
//! println!("Loaded {}", config.organization.name);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

pub mod file;
pub mod http;

// Available outside tests so integration tests in other crates can use it
pub mod mock;

pub use file::FileProvider;
pub use http::HttpProvider;
pub use mock::MockProvider;

/// Asynchronous source of the site configuration
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Resolve the site configuration
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

/// Provider backed by a configuration already in memory
#[derive(Debug, Clone)]
pub struct StaticProvider {
    config: SiteConfig,
}

impl StaticProvider {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigProvider for StaticProvider {
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }

    fn describe(&self) -> String {
        format!("static ({})", self.config.organization.name)
    }
}

/// Pick a provider for a configured source
///
/// `http://` and `https://` sources are fetched with [`HttpProvider`];
/// anything else is a (tilde-expanded) file path.
pub fn provider_for_source(source: &str) -> Arc<dyn ConfigProvider> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Arc::new(HttpProvider::new(source))
    } else {
        Arc::new(FileProvider::new(shellexpand::tilde(source).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_config() {
        let provider = StaticProvider::new(SiteConfig::named("Father's Vision"));
        let config = provider.load_config().await.unwrap();
        assert_eq!(config.organization.name, "Father's Vision");
    }

    #[tokio::test]
    async fn test_static_provider_validates() {
        let provider = StaticProvider::new(SiteConfig::named(""));
        assert!(provider.load_config().await.is_err());
    }

    #[test]
    fn test_provider_for_source_selects_http() {
        let provider = provider_for_source("https://cms.example.org/site.json");
        assert_eq!(provider.describe(), "http (https://cms.example.org/site.json)");
    }

    #[test]
    fn test_provider_for_source_selects_file() {
        let provider = provider_for_source("site.toml");
        assert_eq!(provider.describe(), "file (site.toml)");
    }
}

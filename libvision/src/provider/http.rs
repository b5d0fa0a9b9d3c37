//! HTTP configuration provider

use std::time::Duration;

use async_trait::async_trait;

use super::ConfigProvider;
use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

/// Fetches the site configuration as JSON from a URL
///
/// There is no retry; a failed fetch is terminal for the shell that asked.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: String,
    timeout: Option<Duration>,
}

impl HttpProvider {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            timeout: None,
        }
    }

    /// Bound the request; by default it waits as long as the network does
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl ConfigProvider for HttpProvider {
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let response = client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigLoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let config: SiteConfig =
            serde_json::from_str(&body).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn describe(&self) -> String {
        format!("http ({})", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 on localhost is the discard service; nothing listens there in CI
        let provider = HttpProvider::new("http://127.0.0.1:9/site.json")
            .with_timeout(Duration::from_secs(2));

        let err = provider.load_config().await.unwrap_err();
        assert!(matches!(err, ConfigLoadError::Http(_)));
    }
}

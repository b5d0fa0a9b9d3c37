//! Mock configuration provider for testing
//!
//! Simulates slow, failing, and successful configuration sources and counts
//! how often it was asked, so tests can check the exactly-once load.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::ConfigProvider;
use crate::error::ConfigLoadError;
use crate::types::SiteConfig;

#[derive(Debug, Clone)]
enum Outcome {
    Resolve(SiteConfig),
    Reject(String),
}

/// Configurable provider for tests
#[derive(Debug, Clone)]
pub struct MockProvider {
    outcome: Outcome,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Resolves immediately with `config`
    pub fn resolving(config: SiteConfig) -> Self {
        Self {
            outcome: Outcome::Resolve(config),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Rejects immediately with an HTTP-style failure carrying `message`
    pub fn rejecting(message: &str) -> Self {
        Self {
            outcome: Outcome::Reject(message.to_string()),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits `delay` before settling
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times `load_config` was called (shared across clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigProvider for MockProvider {
    async fn load_config(&self) -> Result<SiteConfig, ConfigLoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match &self.outcome {
            Outcome::Resolve(config) => Ok(config.clone()),
            Outcome::Reject(message) => Err(ConfigLoadError::Http(message.clone())),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_resolves_and_counts() {
        let provider = MockProvider::resolving(SiteConfig::named("Father's Vision"));
        let observer = provider.clone();

        provider.load_config().await.unwrap();
        assert_eq!(observer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_rejects_with_message() {
        let provider = MockProvider::rejecting("network timeout");
        let err = provider.load_config().await.unwrap_err();
        assert!(err.to_string().contains("network timeout"));
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let provider = MockProvider::resolving(SiteConfig::named("Father's Vision"))
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.load_config().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

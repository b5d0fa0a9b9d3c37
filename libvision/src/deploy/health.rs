//! Post-deploy health checks

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DeployError;

pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Succeeds when `url` answers 200 within `timeout`
    async fn check(&self, url: &str, timeout: Duration) -> Result<(), DeployError>;
}

/// Probes over HTTP with reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn check(&self, url: &str, timeout: Duration) -> Result<(), DeployError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DeployError::HealthCheck(e.to_string()))?;

        if response.status() == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(DeployError::HealthCheck(format!(
                "{} returned {}",
                url,
                response.status().as_u16()
            )))
        }
    }
}

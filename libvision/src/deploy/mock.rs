//! Recording runner and probe for deploy tests
//!
//! Neither touches the system: the runner records every command and fails
//! the ones it was told to fail, the probe answers with a fixed verdict.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::health::HealthProbe;
use super::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::DeployError;

#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    failing: Vec<String>,
    commands: Arc<Mutex<Vec<CommandSpec>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit non-zero
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.push(command.to_string());
        self
    }

    /// Every command run so far, in order
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands().into_iter().map(|spec| spec.command).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(spec.clone());
        }
        if self.failing.contains(&spec.command) {
            return Err(DeployError::CommandFailed {
                command: spec.command.clone(),
                reason: "exit code 1".to_string(),
            });
        }
        Ok(CommandOutput::default())
    }
}

#[derive(Debug, Clone)]
pub struct StaticProbe {
    healthy: bool,
    checked: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl StaticProbe {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            checked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::healthy()
        }
    }

    /// URLs and timeouts probed so far
    pub fn checked(&self) -> Vec<(String, Duration)> {
        self.checked
            .lock()
            .map(|checked| checked.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HealthProbe for StaticProbe {
    async fn check(&self, url: &str, timeout: Duration) -> Result<(), DeployError> {
        if let Ok(mut checked) = self.checked.lock() {
            checked.push((url.to_string(), timeout));
        }
        if self.healthy {
            Ok(())
        } else {
            Err(DeployError::HealthCheck(format!("{} returned 503", url)))
        }
    }
}

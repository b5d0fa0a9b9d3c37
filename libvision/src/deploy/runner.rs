//! Command execution for deploy steps

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::DeployError;

/// A shell command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    pub env: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
    /// Capture output instead of attaching to the terminal
    pub capture: bool,
}

impl CommandSpec {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            env: HashMap::new(),
            cwd: None,
            capture: true,
        }
    }

    pub fn env(mut self, env: &HashMap<String, String>) -> Self {
        self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn attached(mut self) -> Self {
        self.capture = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs deploy commands; returns an error for a non-zero exit
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployError> {
        tracing::info!("Running: {}", spec.command);

        let mut command = Command::new("sh");
        command.arg("-c").arg(&spec.command).envs(&spec.env);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let failed = |reason: String| DeployError::CommandFailed {
            command: spec.command.clone(),
            reason,
        };

        if !spec.capture {
            let mut child = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(|e| failed(e.to_string()))?;

            // Ctrl+C reaches the child through the terminal; the deployer
            // outlives it so later steps still run
            let status = loop {
                tokio::select! {
                    status = child.wait() => break status.map_err(|e| failed(e.to_string()))?,
                    interrupt = tokio::signal::ctrl_c() => {
                        if let Err(e) = interrupt {
                            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                            break child.wait().await.map_err(|e| failed(e.to_string()))?;
                        }
                        tracing::info!("Interrupt received, waiting for {} to stop", spec.command);
                    }
                }
            };
            return if status.success() {
                Ok(CommandOutput::default())
            } else {
                Err(failed(format!("exit status {}", status)))
            };
        }

        let output = command.output().await.map_err(|e| failed(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            if !stdout.trim().is_empty() {
                tracing::debug!("Output: {}", stdout.trim());
            }
            Ok(CommandOutput { stdout, stderr })
        } else {
            let reason = match output.status.code() {
                Some(code) if stderr.trim().is_empty() => format!("exit code {}", code),
                Some(code) => format!("exit code {}: {}", code, stderr.trim()),
                None => "terminated by signal".to_string(),
            };
            Err(failed(reason))
        }
    }
}

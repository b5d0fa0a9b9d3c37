//! Manifest-driven deployment
//!
//! Reads `deployment.yml`, checks that the project is complete, runs the
//! configured scripts and dispatches on the server type. Shell commands go
//! through a [`CommandRunner`] and health checks through a [`HealthProbe`],
//! so tests can drive a whole deploy without touching the system.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use libvision::deploy::Deployer;
//!
//! # async fn example() -> libvision::Result<()> {
//! let deployer = Deployer::from_path(Path::new("deployment.yml"))?;
//! for server in deployer.list_servers() {
//!     println!("{}", server);
//! }
//! let report = deployer.deploy("production").await?;
//! println!("{} warnings", report.warnings.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod health;
pub mod manifest;
pub mod mock;
pub mod runner;

pub use health::{HealthProbe, HttpProbe, HEALTH_CHECK_TIMEOUT};
pub use manifest::{Manifest, ServerEntry, ServerKind, DEFAULT_MANIFEST};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, ShellRunner};

use crate::error::DeployError;

/// One line of `list` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSummary {
    pub key: String,
    pub server_type: String,
    pub domain: Option<String>,
}

impl fmt::Display for ServerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.key,
            self.server_type,
            self.domain.as_deref().unwrap_or("No domain")
        )
    }
}

/// What a completed deploy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub server: String,
    pub kind: ServerKind,
    /// Commands run, in order, including scripts
    pub commands: Vec<String>,
    /// Where a local server listens
    pub url: Option<String>,
    /// `None` when no health check applies
    pub healthy: Option<bool>,
    pub warnings: Vec<String>,
}

pub struct Deployer {
    manifest: Manifest,
    root: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
    probe: Arc<dyn HealthProbe>,
}

impl Deployer {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            root: None,
            runner: Arc::new(ShellRunner),
            probe: Arc::new(HttpProbe::new()),
        }
    }

    /// Load the manifest at `path`; relative paths resolve against its directory
    pub fn from_path(path: &Path) -> Result<Self, DeployError> {
        let manifest = Manifest::load(path)?;
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(Self::new(manifest).with_root(root))
    }

    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn list_servers(&self) -> Vec<ServerSummary> {
        self.manifest
            .servers
            .iter()
            .map(|(key, entry)| ServerSummary {
                key: key.clone(),
                server_type: entry.server_type.clone(),
                domain: entry.domain.clone(),
            })
            .collect()
    }

    /// Deploy to the server registered under `key`
    pub async fn deploy(&self, key: &str) -> Result<DeployReport, DeployError> {
        tracing::info!("Starting deployment to {}", key);
        let entry = self.manifest.server(key)?;

        self.pre_deploy_checks()?;

        let mut commands = Vec::new();
        for script in &self.manifest.deployment_scripts.pre_deploy {
            self.run(CommandSpec::new(script), &mut commands).await?;
        }

        let kind = entry.kind()?;
        let mut report = DeployReport {
            server: key.to_string(),
            kind,
            commands: Vec::new(),
            url: None,
            healthy: None,
            warnings: Vec::new(),
        };

        match kind {
            ServerKind::Vercel => self.deploy_vercel(entry, &mut commands).await?,
            ServerKind::Local => report.url = Some(self.deploy_local(entry, &mut commands).await?),
        }

        if kind != ServerKind::Local {
            let healthy = match self.health_check(entry).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("{}; deployment may still be successful", e);
                    report.warnings.push(e.to_string());
                    false
                }
            };
            report.healthy = Some(healthy);
        }

        // Server variables stay set for the rest of the deploy
        let env = &entry.environment_variables;
        for script in &self.manifest.deployment_scripts.post_deploy {
            if let Err(e) = self.run(CommandSpec::new(script).env(env), &mut commands).await {
                tracing::warn!("Post-deployment script failed: {}", e);
                report.warnings.push(e.to_string());
            }
        }

        report.commands = commands;
        tracing::info!("Deployment to {} completed", key);
        Ok(report)
    }

    fn resolve(&self, file: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(file),
            None => PathBuf::from(file),
        }
    }

    fn pre_deploy_checks(&self) -> Result<(), DeployError> {
        let storage = &self.manifest.storage;
        for file in storage.static_files.iter().chain(std::iter::once(&storage.project_file)) {
            if !self.resolve(file).exists() {
                return Err(DeployError::CheckFailed(format!("Required file not found: {}", file)));
            }
        }
        tracing::debug!("Pre-deployment checks passed");
        Ok(())
    }

    async fn run(&self, spec: CommandSpec, commands: &mut Vec<String>) -> Result<(), DeployError> {
        let spec = spec.cwd(self.root.clone());
        commands.push(spec.command.clone());
        self.runner.run(&spec).await.map(|_| ())
    }

    async fn deploy_vercel(&self, entry: &ServerEntry, commands: &mut Vec<String>) -> Result<(), DeployError> {
        tracing::info!(
            "Deploying to Vercel: {}",
            entry.domain.as_deref().unwrap_or("Unknown")
        );
        let env = &entry.environment_variables;
        self.run(CommandSpec::new(entry.build_command()).env(env), commands)
            .await?;

        let deploy = if entry.is_production() { "vercel --prod" } else { "vercel" };
        self.run(CommandSpec::new(deploy).env(env), commands).await
    }

    async fn deploy_local(&self, entry: &ServerEntry, commands: &mut Vec<String>) -> Result<String, DeployError> {
        let url = format!("http://localhost:{}", entry.port());
        tracing::info!("Server will be available at: {}", url);
        let spec = CommandSpec::new(entry.dev_command())
            .env(&entry.environment_variables)
            .attached();
        // The dev server runs until it is stopped; how it exits is not a failure
        match self.run(spec, commands).await {
            Ok(()) => tracing::info!("Development server stopped"),
            Err(e) => tracing::info!("Development server stopped: {}", e),
        }
        Ok(url)
    }

    async fn health_check(&self, entry: &ServerEntry) -> Result<(), DeployError> {
        let domain = entry
            .domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
            .ok_or_else(|| DeployError::HealthCheck("no domain specified".to_string()))?;
        let url = format!("https://{}{}", domain, self.manifest.monitoring.health_check.endpoint);
        self.probe.check(&url, HEALTH_CHECK_TIMEOUT).await?;
        tracing::info!("Health check passed: {}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{RecordingRunner, StaticProbe};
    use super::*;

    fn deployer(yaml: &str, root: &Path) -> (Deployer, RecordingRunner, StaticProbe) {
        let runner = RecordingRunner::new();
        let probe = StaticProbe::healthy();
        let deployer = Deployer::new(Manifest::from_yaml(yaml).unwrap())
            .with_root(Some(root.to_path_buf()))
            .with_runner(Arc::new(runner.clone()))
            .with_probe(Arc::new(probe.clone()));
        (deployer, runner, probe)
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").unwrap();
        dir
    }

    #[test]
    fn test_list_servers() {
        let dir = project();
        let yaml = "servers:\n  production:\n    type: vercel\n    domain: fv.org\n  dev:\n    type: local\n";
        let (deployer, _, _) = deployer(yaml, dir.path());
        let lines: Vec<String> = deployer.list_servers().iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["dev (local): No domain", "production (vercel): fv.org"]);
    }

    #[tokio::test]
    async fn test_vercel_production_deploy() {
        let dir = project();
        let yaml = r#"
servers:
  production:
    name: Production
    type: vercel
    domain: fv.org
    environment_variables: { SITE_ENV: prod }
deployment_scripts:
  pre_deploy: ["cargo test"]
  post_deploy: ["echo deployed"]
"#;
        let (deployer, runner, probe) = deployer(yaml, dir.path());
        let report = deployer.deploy("production").await.unwrap();

        assert_eq!(
            report.commands,
            vec!["cargo test", "cargo build --release", "vercel --prod", "echo deployed"]
        );
        assert_eq!(report.healthy, Some(true));
        assert!(report.warnings.is_empty());

        let specs = runner.commands();
        assert_eq!(specs[1].env["SITE_ENV"], "prod");
        assert_eq!(specs[2].env["SITE_ENV"], "prod");
        assert_eq!(specs[3].env["SITE_ENV"], "prod");
        assert!(specs[0].env.is_empty());
        assert_eq!(specs[0].cwd.as_deref(), Some(dir.path()));

        let checked = probe.checked();
        assert_eq!(checked, vec![("https://fv.org/api/keep_alive".to_string(), HEALTH_CHECK_TIMEOUT)]);
    }

    #[tokio::test]
    async fn test_non_production_vercel_deploy() {
        let dir = project();
        let yaml = "servers:\n  staging:\n    name: Staging\n    type: vercel\n    domain: staging.fv.org\n";
        let (deployer, runner, _) = deployer(yaml, dir.path());
        deployer.deploy("staging").await.unwrap();
        assert_eq!(runner.command_lines(), vec!["cargo build --release", "vercel"]);
    }

    #[tokio::test]
    async fn test_local_deploy_reports_url_and_skips_health_check() {
        let dir = project();
        let yaml = "servers:\n  dev:\n    type: local\n    build_settings: { dev_command: vision-serve --verbose }\n";
        let (deployer, runner, probe) = deployer(yaml, dir.path());
        let report = deployer.deploy("dev").await.unwrap();

        assert_eq!(report.url.as_deref(), Some("http://localhost:5173"));
        assert_eq!(report.healthy, None);
        assert!(probe.checked().is_empty());
        assert!(!runner.commands()[0].capture);
    }

    #[tokio::test]
    async fn test_stopped_dev_server_still_runs_post_deploy() {
        let dir = project();
        let yaml = "servers:\n  dev:\n    type: local\n    build_settings: { dev_command: serve }\ndeployment_scripts:\n  post_deploy: [cleanup]\n";
        let runner = RecordingRunner::new().failing("serve");
        let deployer = Deployer::new(Manifest::from_yaml(yaml).unwrap())
            .with_root(Some(dir.path().to_path_buf()))
            .with_runner(Arc::new(runner.clone()));

        let report = deployer.deploy("dev").await.unwrap();
        assert_eq!(report.url.as_deref(), Some("http://localhost:5173"));
        assert!(report.warnings.is_empty());
        assert_eq!(runner.command_lines(), vec!["serve", "cleanup"]);
    }

    #[tokio::test]
    async fn test_missing_static_file_fails_before_commands() {
        let dir = project();
        let yaml = "servers:\n  dev:\n    type: local\nstorage:\n  static_files: [public/site.css]\n";
        let (deployer, runner, _) = deployer(yaml, dir.path());
        let result = deployer.deploy("dev").await;
        assert!(matches!(result, Err(DeployError::CheckFailed(msg)) if msg.contains("public/site.css")));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_missing_project_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (deployer, _, _) = deployer("servers:\n  dev:\n    type: local\n", dir.path());
        assert!(matches!(deployer.deploy("dev").await, Err(DeployError::CheckFailed(_))));
    }

    #[tokio::test]
    async fn test_pre_deploy_failure_aborts() {
        let dir = project();
        let yaml = "servers:\n  dev:\n    type: local\ndeployment_scripts:\n  pre_deploy: [lint, fmt]\n";
        let runner = RecordingRunner::new().failing("lint");
        let deployer = Deployer::new(Manifest::from_yaml(yaml).unwrap())
            .with_root(Some(dir.path().to_path_buf()))
            .with_runner(Arc::new(runner.clone()));

        assert!(matches!(deployer.deploy("dev").await, Err(DeployError::CommandFailed { .. })));
        assert_eq!(runner.command_lines(), vec!["lint"]);
    }

    #[tokio::test]
    async fn test_unknown_type_fails() {
        let dir = project();
        let (deployer, runner, _) = deployer("servers:\n  ftp:\n    type: ftp\n", dir.path());
        assert!(matches!(deployer.deploy("ftp").await, Err(DeployError::UnknownServerType(t)) if t == "ftp"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_and_post_deploy_failures_are_warnings() {
        let dir = project();
        let yaml = "servers:\n  prod:\n    type: vercel\n    domain: fv.org\ndeployment_scripts:\n  post_deploy: [notify]\nmonitoring:\n  health_check: { endpoint: /healthz }\n";
        let runner = RecordingRunner::new().failing("notify");
        let probe = StaticProbe::unhealthy();
        let deployer = Deployer::new(Manifest::from_yaml(yaml).unwrap())
            .with_root(Some(dir.path().to_path_buf()))
            .with_runner(Arc::new(runner))
            .with_probe(Arc::new(probe.clone()));

        let report = deployer.deploy("prod").await.unwrap();
        assert_eq!(report.healthy, Some(false));
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(probe.checked()[0].0, "https://fv.org/healthz");
    }

    #[tokio::test]
    async fn test_missing_domain_is_a_health_warning() {
        let dir = project();
        let (deployer, _, probe) = deployer("servers:\n  prod:\n    type: vercel\n", dir.path());
        let report = deployer.deploy("prod").await.unwrap();
        assert_eq!(report.healthy, Some(false));
        assert!(probe.checked().is_empty());
    }
}

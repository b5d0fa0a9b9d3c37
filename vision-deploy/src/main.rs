//! vision-deploy - Deploy the vision site
//!
//! Unix-style front end for the manifest-driven deployer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use libvision::deploy::{DeployReport, Deployer, DEFAULT_MANIFEST};
use libvision::logging::{LogFormat, LoggingConfig};
use libvision::{DeployError, Result, VisionError};

#[derive(Parser, Debug)]
#[command(name = "vision-deploy")]
#[command(version)]
#[command(about = "Deploy the vision site")]
#[command(long_about = "\
vision-deploy - Deploy the vision site

DESCRIPTION:
    vision-deploy reads deployment.yml, checks that the project is complete,
    runs the configured pre-deploy scripts and deploys to the named server.
    Remote deploys are followed by a health check; a failing check or
    post-deploy script is reported as a warning.

COMMANDS:
    list             List the servers in the manifest
    deploy <SERVER>  Deploy to a server

USAGE EXAMPLES:
    # List servers
    vision-deploy list

    # Deploy to production
    vision-deploy deploy production

    # Use another manifest and print the report as JSON
    vision-deploy --manifest ops/deployment.yml deploy staging --format json

SERVER TYPES:
    vercel  Build, then `vercel --prod` for the server named Production,
            `vercel` otherwise
    local   Run the dev command (default: vision-serve)

EXIT CODES:
    0 - Success
    1 - Deployment failed
    3 - Invalid input (unknown server, bad format)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the deployment manifest
    #[arg(short, long, global = true, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Log output format: text, json or pretty
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List servers in the manifest
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Deploy to a server
    Deploy {
        /// Server key from the manifest
        server: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::resolve(cli.log_format, cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List { format } => {
            validate_format(&format)?;
            let deployer = Deployer::from_path(&cli.manifest)?;
            cmd_list(&deployer, &format);
        }
        Commands::Deploy { server, format } => {
            validate_format(&format)?;
            let deployer = Deployer::from_path(&cli.manifest)?;
            let report = deployer.deploy(&server).await.map_err(|e| match e {
                DeployError::UnknownServer { .. } => VisionError::InvalidInput(e.to_string()),
                other => other.into(),
            })?;
            output_report(&report, &format);
        }
    }

    Ok(())
}

fn validate_format(format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(VisionError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }
    Ok(())
}

fn cmd_list(deployer: &Deployer, format: &str) {
    let servers = deployer.list_servers();
    if format == "json" {
        let json: Vec<serde_json::Value> = servers
            .iter()
            .map(|s| {
                serde_json::json!({
                    "key": s.key,
                    "type": s.server_type,
                    "domain": s.domain,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(json));
        return;
    }

    for server in servers {
        println!("{}", server);
    }
}

fn output_report(report: &DeployReport, format: &str) {
    if format == "json" {
        let json = serde_json::json!({
            "server": report.server,
            "commands": report.commands,
            "url": report.url,
            "healthy": report.healthy,
            "warnings": report.warnings,
        });
        println!("{}", json);
        return;
    }

    if let Some(url) = &report.url {
        println!("Server available at: {}", url);
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    println!("Deployment to {} completed", report.server);
}

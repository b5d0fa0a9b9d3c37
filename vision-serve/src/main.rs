//! vision-serve - Dev and preview server for the vision site
//!
//! Mounts the site shell against the configured site source and serves it
//! over HTTP until SIGINT or SIGTERM.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libvision::config::Config;
use libvision::logging::{LogFormat, LoggingConfig};
use libvision::{provider_for_source, ShellOptions, VisionError};
use tracing::{error, info};
use vision_serve::{create_router, AppState, ServerMode};

#[derive(Parser, Debug)]
#[command(name = "vision-serve")]
#[command(version)]
#[command(about = "Serve the vision site shell")]
#[command(long_about = "\
vision-serve - Serve the vision site shell

DESCRIPTION:
    vision-serve loads the site configuration once, then answers every page
    request with the loading, error, maintenance or app view. Unknown paths
    redirect to the home page.

USAGE:
    # Development server on 0.0.0.0:5173
    vision-serve

    # Preview server on 0.0.0.0:4173
    vision-serve --preview

    # Load the site configuration from a URL
    vision-serve --site https://cms.example.org/site.json

    # Put the site into maintenance mode
    vision-serve --maintenance

ENDPOINTS:
    GET  /*                 Site shell
    POST /__shell/reload    Remount the shell and reload the configuration
    GET  /api/keep_alive    Health check
    GET  /static/*          Files from the public directory

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown

CONFIGURATION:
    Configuration file: ~/.config/vision/config.toml

    Override with environment variables:
        VISION_CONFIG      - Path to config file
        VISION_LOG_FORMAT  - text, json or pretty
        VISION_LOG_LEVEL   - Minimum log level

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration error
    3 - Invalid input
")]
struct Cli {
    /// Serve with the preview listener instead of the dev one
    #[arg(long)]
    preview: bool,

    /// Address to bind (overrides config)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Site configuration file or URL (overrides config)
    #[arg(long, value_name = "SOURCE")]
    site: Option<String>,

    /// Directory served under /static (overrides config)
    #[arg(long, value_name = "DIR")]
    public_dir: Option<PathBuf>,

    /// Start in maintenance mode
    #[arg(long)]
    maintenance: bool,

    /// Log output format: text, json or pretty
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::resolve(cli.log_format, cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<VisionError>()
            .map(VisionError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(site) = cli.site {
        config.site.source = site;
    }
    if cli.maintenance {
        config.site.maintenance = true;
    }

    let mode = if cli.preview { ServerMode::Preview } else { ServerMode::Dev };
    let listen = mode.listen(&config);
    let host = cli.host.unwrap_or_else(|| listen.host.clone());
    let port = cli.port.unwrap_or(listen.port);
    let addr = format!("{}:{}", host, port);

    let public_dir = cli
        .public_dir
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde(&config.server.public_dir).to_string()));

    let provider = provider_for_source(&config.site.source);
    info!("Site configuration source: {}", provider.describe());

    let state = AppState::new(provider, ShellOptions::from_config(&config));
    let app = create_router(state.clone(), &public_dir);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("vision-serve ({}) listening on http://{}", mode.as_str(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.shutdown();
    info!("vision-serve stopped");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives
#[cfg(unix)]
async fn shutdown_signal() {
    use futures::StreamExt;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook_tokio::Signals;

    match Signals::new([SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            if let Some(signal) = signals.next().await {
                info!("Received signal {}, shutting down gracefully...", signal);
            }
        }
        Err(e) => {
            error!("Signal setup failed, falling back to Ctrl+C: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}

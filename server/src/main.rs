mod config;
mod http;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use products_directory::{DirectoryService, EmployeeDirectory, UpstreamClient};
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "directory-server", version, about = "Employee directory REST facade")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Fetch the upstream listing once and report what came back.
    Probe,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, value_name = "URL", help = "Override UPSTREAM_BASE_URL")]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let app_config = AppConfig::load()?;
    let result = match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Probe => probe(app_config).await,
    };
    shutdown_tracing();
    result
}

fn build_directory(config: &AppConfig) -> Result<DirectoryService> {
    let upstream =
        UpstreamClient::new(&config.upstream).context("failed to build upstream client")?;
    Ok(DirectoryService::new(upstream))
}

async fn run_server(cmd: ServeCommand, mut config: AppConfig) -> Result<()> {
    let ServeCommand {
        host,
        port,
        upstream,
    } = cmd;
    if let Some(url) = upstream.as_deref() {
        config.set_upstream_base(url)?;
    }
    let directory = build_directory(&config)?;
    info!(
        upstream = %directory.upstream().base_url(),
        max_in_flight = config.upstream.max_in_flight,
        timeout_secs = config.upstream.timeout.as_secs(),
        "directory service ready"
    );
    let state = AppState {
        directory: Arc::new(directory),
        config: Arc::new(config),
    };
    http::serve(ServeConfig::new(host, port), state).await
}

async fn probe(config: AppConfig) -> Result<()> {
    let directory = build_directory(&config)?;
    let outcome = directory.list_all().await;
    if !outcome.is_success() {
        bail!("upstream probe failed with status {}", outcome.status);
    }
    let count = outcome.body.as_ref().map_or(0, Vec::len);
    println!(
        "{} {}: {} employees",
        outcome.status,
        directory.upstream().base_url(),
        count
    );
    Ok(())
}

//! Marginalia Web Server
//!
//! Serves principal resolution for Basic-authenticated requests.

use anyhow::Context;
use clap::Parser;
use marginalia_core::{init_logging, MarginaliaConfig};
use marginalia_web::server::MarginaliaServerBuilder;
use std::path::PathBuf;

/// Marginalia Web Server - Basic authentication and principal resolution
#[derive(Parser, Debug)]
#[command(name = "marginalia-web")]
#[command(about = "HTTP surface for Marginalia principal resolution")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides config and MARGINALIA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides config and MARGINALIA_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = match &args.config {
        Some(path) => MarginaliaConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MarginaliaConfig::default(),
    };

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    let mut builder = MarginaliaServerBuilder::new(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let server = builder.build().context("Failed to build server")?;
    server.start().await.context("Server failed")?;

    Ok(())
}

//! Image race proxy.
//!
//! ```text
//!   GET /{id}
//!       │
//!       ▼
//!   ┌──────────┐  invalid   ┌─────┐
//!   │ validate │──────────▶│ 400 │
//!   └────┬─────┘            └─────┘
//!        │
//!        ▼
//!   ┌─────────────────────────────────────┐
//!   │ race: {id}.webp  {id}.png  {id}.jpg │──▶ upstream store
//!   │       (shared deadline)             │
//!   └────┬────────────────────────────────┘
//!        │ select by priority
//!        ▼
//!   200 image  |  404 not found
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use image_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use image_proxy::http::HttpServer;
use image_proxy::lifecycle::{signals, Shutdown};
use image_proxy::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "image-proxy")]
#[command(about = "Serves images by racing candidate extensions against an upstream store")]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.base_url.
    #[arg(long)]
    upstream: Option<String>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    validate_config: bool,
}

fn resolve_config(args: &Args) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(upstream) = &args.upstream {
        config.upstream.base_url = upstream.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init(&config.observability);
    tracing::info!("image-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if args.validate_config {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        race_timeout_ms = config.upstream.race_timeout_ms,
        max_id_length = config.identifier.max_length,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_socket()? {
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config)?;

    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Switchboard API server binary.
//!
//! Usage:
//!   switchboard-api --config switchboard.toml
//!   switchboard-api --port 8080
//!   switchboard-api --port 8080 --bind 0.0.0.0
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY` - Provider API key (required)
//! - `SWITCHBOARD_CONFIG` - Config file path (overridden by `--config`)
//! - `SWITCHBOARD_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `RUST_LOG` - Log filter (overrides `system.log_level`)

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use switchboard_api::{serve, AppState};
use switchboard_coordinator::{SwitchboardConfig, API_KEY_ENV};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file; missing files fall back to defaults
    #[arg(short, long, env = "SWITCHBOARD_CONFIG", default_value = "switchboard.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Bind address
    #[arg(short, long, env = "SWITCHBOARD_BIND_ADDR", default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Loaded before logging so system.log_level can shape the filter
    let config = SwitchboardConfig::load_or_default(&args.config)?;

    let base_level = config.system.log_level.to_lowercase();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{base_level},switchboard_api=debug,tower_http=debug").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        path = %args.config.display(),
        mode = ?config.routing.mode,
        fallback_enabled = config.fallback.enabled,
        "Configuration ready"
    );

    if args.bind == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0 exposes the API to all network interfaces. \
             Make sure a firewall or reverse proxy is in place."
        );
    }

    let api_key = config.api.resolve_api_key().with_context(|| {
        format!("OpenRouter API key not configured. Set {API_KEY_ENV} or [api].api_key.")
    })?;

    tracing::info!("Initializing agent system...");
    let state = AppState::from_config(&config, Some(api_key))?;

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", args.bind))?;
    serve(Arc::new(state), addr).await?;

    Ok(())
}

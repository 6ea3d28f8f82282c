//! cc-ai - AI proxy service for ClosetClear
//!
//! Serves the item-analysis, outfit-suggestion and wardrobe-insights routes
//! on port 5730 by default, holding the model API key so front ends never
//! see it.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cc_ai::gemini::{GeminiClient, DEFAULT_BASE_URL};
use cc_ai::AppState;
use cc_common::config::{default_config_path, read_toml_config, ConfigResolver};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cc-ai
#[derive(Parser, Debug)]
#[command(name = "cc-ai")]
#[command(about = "AI proxy service for ClosetClear")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "CC_AI_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "CC_AI_BIND")]
    bind: std::net::IpAddr,

    /// Config file (default: <config dir>/closetclear/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model API key (overrides GOOGLE_API_KEY and the config file)
    #[arg(long)]
    google_api_key: Option<String>,

    /// Model API host
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "CC_AI_GEMINI_URL")]
    gemini_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let (toml_config, config_load) = read_toml_config(config_path.as_deref());
    let resolver = ConfigResolver::new(toml_config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cc_ai={0},cc_common={0},tower_http=info", resolver.log_level()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    config_load.report();

    info!("Starting cc-ai (AI proxy) v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build: {} ({}, {})",
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let gemini = match resolver.google_api_key(args.google_api_key.as_deref()) {
        Some(key) => {
            let client = GeminiClient::new(key, resolver.gemini_model())
                .context("Failed to create model client")?
                .with_base_url(args.gemini_url.as_str());
            info!("Model: {}", client.model());
            Some(client)
        }
        None => {
            warn!("GOOGLE_API_KEY not set; AI routes will answer with a configuration error");
            None
        }
    };

    let state = AppState::new(gemini);
    let app = cc_ai::build_router(state);

    let port = args.port.unwrap_or(resolver.defaults().ai_port);
    let addr = SocketAddr::new(args.bind, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! Chat gateway (v1)
//!
//! A messaging API served with Tokio and Axum, guarded by a request pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────────┐
//!                       │                     CHAT GATEWAY                       │
//!                       │                                                        │
//!   Client Request      │  ┌──────────┐   ┌──────────┐   ┌─────────────────────┐ │
//!   ────────────────────┼─▶│  tower   │──▶│ identity │──▶│      pipeline       │ │
//!                       │  │  layers  │   │ (bearer) │   │ log → hours → rate  │ │
//!                       │  └──────────┘   └──────────┘   │      → role         │ │
//!                       │                                 └─────────┬───────────┘ │
//!                       │                           short-circuit   │  dispatch   │
//!   Client Response     │  ┌──────────┐                    ◀────────┤             │
//!   ◀───────────────────┼──│ response │◀───────────────────┐        ▼             │
//!                       │  └──────────┘              ┌─────┴──────────────┐      │
//!                       │                            │ chats handlers     │      │
//!                       │                            │ (in-memory store)  │      │
//!                       │                            └────────────────────┘      │
//!                       │  config (toml + hot reload) · tracing · metrics        │
//!                       └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use chat_gateway::config::{load_config, watcher::ConfigWatcher, GatewayConfig};
use chat_gateway::http::GatewayServer;
use chat_gateway::lifecycle::{signals, Shutdown};
use chat_gateway::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "chat-gateway")]
#[command(about = "Messaging API with request logging, access hours, rate limiting and role checks")]
struct Args {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("chat-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        window = %format!("[{}, {})", config.time_window.start_hour, config.time_window.end_hour),
        rate_limit = config.rate_limit.max_requests,
        rate_window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server = GatewayServer::new(config);
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_on_signal(&signal_shutdown).await;
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

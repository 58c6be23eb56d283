//! Keyword categorization service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   CATEGORIZER                     │
//!                     │                                                   │
//!   GET/POST          │  ┌──────────┐    ┌────────────┐   fan-out        │
//!   /categorize ──────┼─▶│   http   │───▶│ dispatcher │──┬──▶ filter A   │
//!                     │  │  server  │    │  (broker)  │  ├──▶ filter B   │
//!                     │  └──────────┘    └────────────┘  └──▶ filter N   │
//!                     │        ▲               ▲               │          │
//!   {item, tags} ◀────┼────────┘               └───── fan-in ◀─┘          │
//!                     │                                                   │
//!                     │  ┌─────────┐  ┌──────────────┐  ┌─────────────┐  │
//!                     │  │ config  │  │observability │  │  lifecycle  │  │
//!                     │  │ +reload │  │ logs/metrics │  │  shutdown   │  │
//!                     │  └─────────┘  └──────────────┘  └─────────────┘  │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use categorizer::config::loader::load_config;
use categorizer::config::watcher::ConfigWatcher;
use categorizer::config::CategorizerConfig;
use categorizer::http::HttpServer;
use categorizer::lifecycle::{signals, Shutdown};
use categorizer::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "categorizer")]
#[command(about = "Tag items with the categories whose keywords they contain", long_about = None)]
struct Args {
    /// Path to a TOML config file. Watched for changes to categories.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => CategorizerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("categorizer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        classify_timeout_ms = config.dispatcher.classify_timeout_ms,
        on_timeout = ?config.dispatcher.on_timeout,
        categories = config.categories.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the life of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

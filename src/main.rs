//! Redirect proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                REDIRECT PROXY                │
//!     Client Request      │  ┌─────────┐    ┌────────────┐               │
//!     ────────────────────┼─▶│  http   │───▶│  redirect  │──┐            │
//!                         │  │ server  │    │ middleware │  │            │
//!                         │  └─────────┘    └────────────┘  ▼            │
//!                         │                        ┌──────────────┐      │
//!                         │                        │    engine    │      │
//!                         │                        │ rules→routing│      │
//!                         │                        │   →rewrite   │      │
//!                         │                        └──────┬───────┘      │
//!     301/302/307/308     │                               │ spawn        │
//!     ◀───────────────────┼── or 404 fallback             ▼              │
//!                         │                        ┌──────────────┐      │
//!                         │                        │  access_log  │      │
//!                         │                        └──────────────┘      │
//!                         │  config (+watcher) · admin · observability   │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use redirect_proxy::access_log::build_sink;
use redirect_proxy::admin::{setup_admin_router, AdminState};
use redirect_proxy::config::{load_config, watcher::ConfigWatcher, RedirectConfig};
use redirect_proxy::http::HttpServer;
use redirect_proxy::lifecycle::{shutdown, signals::spawn_signal_handler, Shutdown};
use redirect_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "redirect-proxy")]
#[command(about = "Rule-driven HTTP redirect server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RedirectConfig::default(),
    };

    if args.check {
        println!("Configuration OK: {} rule(s)", config.rules.len());
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "redirect-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        rules = config.rules.len(),
        request_timeout_secs = config.timeouts.request_secs,
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

    let access_log = build_sink(&config.access_log).await?;
    let server = HttpServer::new(config.clone(), access_log)?;

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    // The watcher must stay alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (mpsc::unbounded_channel().1, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let router = setup_admin_router(AdminState {
            store: server.store(),
        });
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server
                .run_tls(addr, tls, config_updates, shutdown.subscribe())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server
                .run(listener, config_updates, shutdown.subscribe())
                .await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

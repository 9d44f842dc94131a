//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the redirect middleware, liveness route and
//!   404 fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to a plain or TLS listener
//! - Apply reloaded rule sets to the live store

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::access_log::AccessLogSink;
use crate::config::{compile_rules, ConfigError, RedirectConfig, TlsConfig};
use crate::engine::RedirectEngine;
use crate::http::middleware::{redirect_middleware, RedirectState, HEALTH_PATH};
use crate::http::request::{MakeRequestUuid, RequestContext, X_REQUEST_ID};
use crate::http::response::{health, not_found};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::rules::InMemoryRuleStore;

const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS setup failed: {0}")]
    Tls(std::io::Error),
}

/// HTTP server for the redirect engine.
pub struct HttpServer {
    router: Router,
    config: RedirectConfig,
    store: Arc<InMemoryRuleStore>,
    engine: RedirectEngine,
}

impl HttpServer {
    /// Create a server whose rule store is seeded from `config`.
    pub fn new(config: RedirectConfig, access_log: Arc<dyn AccessLogSink>) -> Result<Self, ConfigError> {
        let rules = compile_rules(&config)?;
        metrics::record_rules_loaded(rules.len());
        tracing::info!(rules = rules.len(), "Redirect rules loaded");

        let store = Arc::new(InMemoryRuleStore::new(rules));
        let engine = RedirectEngine::new(store.clone(), access_log);
        let router = Self::build_router(&config, engine.clone());

        Ok(Self {
            router,
            config,
            store,
            engine,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectConfig, engine: RedirectEngine) -> Router {
        let state = RedirectState {
            engine,
            context: RequestContext {
                tls: config.listener.tls.is_some(),
                trust_forwarded_headers: config.listener.trust_forwarded_headers,
            },
        };

        Router::new()
            .route(HEALTH_PATH, get(health))
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(state, redirect_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<RedirectConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_rule_reloader(self.store.clone(), config_updates);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        config_updates: mpsc::UnboundedReceiver<RedirectConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(ServerError::Tls)?;
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_rule_reloader(self.store.clone(), config_updates);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown).await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RedirectConfig {
        &self.config
    }

    /// The live rule store.
    pub fn store(&self) -> Arc<InMemoryRuleStore> {
        self.store.clone()
    }

    pub fn engine(&self) -> RedirectEngine {
        self.engine.clone()
    }

    /// The router without connection info, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Compile each reloaded config and swap it into `store`.
///
/// A config that fails to compile leaves the current rules in place.
fn spawn_rule_reloader(
    store: Arc<InMemoryRuleStore>,
    mut config_updates: mpsc::UnboundedReceiver<RedirectConfig>,
) {
    tokio::spawn(async move {
        while let Some(config) = config_updates.recv().await {
            match compile_rules(&config) {
                Ok(rules) => {
                    metrics::record_rules_loaded(rules.len());
                    store.replace(rules);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reloaded rules rejected, keeping current set");
                }
            }
        }
    });
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Hand each `/categorize` item to the current dispatcher
//! - Swap in a rebuilt dispatcher when the config changes
//! - Drain in-flight requests on shutdown

use arc_swap::ArcSwap;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::CategorizerConfig;
use crate::dispatcher::{ClassificationResult, Dispatcher, RegistrationError};
use crate::http::request::{request_id, ItemParams, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{panic_response, ApiError};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current dispatcher; replaced wholesale on config reload.
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
}

/// HTTP server for the categorizer.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<ArcSwap<Dispatcher>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the configured categories cannot be registered.
    pub fn new(config: CategorizerConfig) -> Result<Self, RegistrationError> {
        let dispatcher = Dispatcher::from_config(&config)?;
        Ok(Self::with_dispatcher(&config, dispatcher))
    }

    /// Serve an already built dispatcher; `config` supplies the HTTP settings.
    pub fn with_dispatcher(config: &CategorizerConfig, dispatcher: Dispatcher) -> Self {
        let dispatcher = Arc::new(ArcSwap::from_pointee(dispatcher));

        let state = AppState {
            dispatcher: dispatcher.clone(),
        };

        let router = Self::build_router(config, state);
        Self { router, dispatcher }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &CategorizerConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route("/categorize", get(categorize_handler).post(categorize_handler))
            .route("/categories", get(categories_handler))
            .route("/health", get(health_handler))
            .with_state(state);
        Self::apply_layers(routes, config)
    }

    /// Wrap routes in the middleware stack, innermost first.
    #[allow(deprecated)]
    fn apply_layers(routes: Router, config: &CategorizerConfig) -> Router {
        routes
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(middleware::from_fn(track_metrics))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the dispatcher. The
    /// server drains and returns once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<CategorizerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            filters = self.dispatcher.load().len(),
            "HTTP server starting"
        );

        let dispatcher = self.dispatcher.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => {
                            apply_config(&dispatcher, &config);
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
            tracing::debug!("Config reload task stopped");
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Snapshot of the dispatcher currently serving requests.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Rebuild the dispatcher from `config` and publish it.
///
/// On failure the current dispatcher stays in place. Requests already in
/// flight finish against the dispatcher they started with.
pub fn apply_config(dispatcher: &ArcSwap<Dispatcher>, config: &CategorizerConfig) -> bool {
    match Dispatcher::from_config(config) {
        Ok(next) => {
            let filters = next.len();
            dispatcher.store(Arc::new(next));
            tracing::info!(filters, "Dispatcher replaced");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected new categories, keeping current dispatcher");
            false
        }
    }
}

/// Classify one item.
async fn categorize_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: ItemParams,
) -> Result<Json<ClassificationResult>, ApiError> {
    let request_id = request_id(&headers);
    let item = params.into_item().inspect_err(|_| {
        tracing::warn!(request_id = %request_id, "Rejected request without item");
    })?;

    let dispatcher = state.dispatcher.load_full();
    let result = dispatcher.classify(&item).await.inspect_err(|e| {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            pending = ?e.pending(),
            "Classification failed"
        );
    })?;

    tracing::info!(
        request_id = %request_id,
        item = %result.item,
        tags = ?result.tags,
        "Item categorized"
    );
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
struct CategoryView {
    name: String,
    patterns: Vec<String>,
}

/// List the active categories.
async fn categories_handler(State(state): State<AppState>) -> Json<Vec<CategoryView>> {
    let dispatcher = state.dispatcher.load();
    Json(
        dispatcher
            .filters()
            .map(|f| CategoryView {
                name: f.name().to_string(),
                patterns: f.patterns().to_vec(),
            })
            .collect(),
    )
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    filters: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        filters: state.dispatcher.load().len(),
    })
}

/// Record request count and latency per method and status.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

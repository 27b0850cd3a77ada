//! `EventServer`, the axum router and its shared state.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::header::InvalidHeaderName;
use axum::response::Json;
use axum::routing::get;
use lsriders_events::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::health::{self, HealthResponse};
use crate::metrics;
use crate::shutdown::ShutdownCoordinator;

/// Header carrying the caller's login when none is configured.
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-auth-login";

/// Router options that do not come from the store.
#[derive(Clone)]
pub struct ServerOptions {
    /// Request header holding the authenticated login.
    pub principal_header: HeaderName,
    /// Installed Prometheus recorder, if any.
    pub metrics: Option<PrometheusHandle>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            principal_header: HeaderName::from_static(DEFAULT_PRINCIPAL_HEADER),
            metrics: None,
        }
    }
}

impl ServerOptions {
    /// Use `name` as the principal header.
    pub fn with_principal_header(mut self, name: &str) -> Result<Self, InvalidHeaderName> {
        self.principal_header = HeaderName::from_bytes(name.trim().as_bytes())?;
        Ok(self)
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event access layer.
    pub store: EventStore,
    /// Header holding the caller's login.
    pub principal_header: HeaderName,
    /// Prometheus handle for `/metrics`.
    pub metrics: Option<PrometheusHandle>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
}

/// The lsriders HTTP server.
pub struct EventServer {
    state: AppState,
}

impl EventServer {
    /// Create a new server over `store`.
    pub fn new(store: EventStore, options: ServerOptions) -> Self {
        Self {
            state: AppState {
                store,
                principal_header: options.principal_header,
                metrics: options.metrics,
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
            },
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .merge(handlers::routes())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Serve on `listener` until the shutdown coordinator is cancelled, then
    /// drain in-flight requests.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "listening");
        }
        let token = self.state.shutdown.token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;
        info!("server stopped");
        Ok(())
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.clone();
    let events = tokio::task::spawn_blocking(move || store.count().ok())
        .await
        .ok()
        .flatten();
    Json(health::health_check(state.start_time, events))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::render(state.metrics.as_ref())
}

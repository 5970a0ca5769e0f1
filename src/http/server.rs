//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the three OAuth routes
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Own the token registry and upstream client for the process lifetime
//! - Serve until the shutdown signal fires

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
use crate::oauth::{authorize_handler, me_handler, token_handler};
use crate::observability::metrics;
use crate::registry::TokenRegistry;
use crate::upstream::{ClientBuildError, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub registry: TokenRegistry,
}

/// Failure to start or run the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] ClientBuildError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the OAuth proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: TokenRegistry,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let registry = TokenRegistry::new();

        tracing::info!(upstream = %upstream.base_url(), "Upstream client ready");

        let state = AppState {
            upstream,
            registry: registry.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/oauth2.0/authorize", get(authorize_handler))
            .route("/oauth2.0/token", post(token_handler))
            .route("/oauth2.0/me", get(me_handler))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            // Path only: authorize query strings carry client secrets and codes.
                            tracing::info_span!(
                                "request",
                                request_id = %request.headers().request_id(),
                                method = %request.method(),
                                path = %request.uri().path()
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    // Timeout sits innermost: its service needs a `Default` response body.
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(tokens = self.registry.len(), "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Handle to the process-wide token registry.
    pub fn registry(&self) -> TokenRegistry {
        self.registry.clone()
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

//! rate-proxy — same-origin proxy for the payment page rate.
//!
//! The binary in `main.rs` wires configuration and logging; everything
//! needed to serve (and to test) the HTTP surface lives here.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod api;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod proxy;

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: config::Config,
    pub upstream_client: proxy::upstream::UpstreamClient,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Self, errors::AppError> {
        let upstream_client =
            proxy::upstream::UpstreamClient::new(config.connect_timeout, config.upstream_timeout)?;
        Ok(Self {
            config,
            upstream_client,
        })
    }
}

/// Full application router: health probes, the API, and the layer stack.
pub fn app(state: Arc<AppState>) -> Router {
    let allowed_origin = state.config.allowed_origin.clone();

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }))
        .nest("/api", api::api_router())
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == allowed_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(axum::middleware::from_fn(middleware::headers::request_id))
        .layer(axum::middleware::from_fn(middleware::headers::security_headers))
}

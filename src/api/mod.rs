use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};

use crate::proxy::handler;
use crate::AppState;

/// Browser-facing API router.
/// All routes are relative — the caller mounts this under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payment-rate", get(handler::payment_rate))
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

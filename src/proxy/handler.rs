use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::rate::{PaymentRate, RateAccumulator};
use crate::proxy::upstream::UpstreamClient;
use crate::proxy::url::build_url;
use crate::AppState;

const TOKEN_PRICES_PATH: &str = "/api/token-prices";
const RATE_PATH: &str = "/api/rate";

/// `GET /api/payment-rate`: backend rate data, normalized for the browser.
///
/// Always answers 200; problems are reported inside the payload.
#[tracing::instrument(skip(state))]
pub async fn payment_rate(State(state): State<Arc<AppState>>) -> Json<PaymentRate> {
    let base = state.config.api_base.resolve();
    Json(resolve_payment_rate(&state.upstream_client, &base).await)
}

/// Fetch token prices and rate policy from `base` and fold them into one
/// payload, falling back to defaults wherever the backend has nothing usable.
pub async fn resolve_payment_rate(client: &UpstreamClient, base: &str) -> PaymentRate {
    let base = base.trim().trim_end_matches('/');
    if base.is_empty() {
        tracing::warn!("no upstream base configured, serving default rate");
        return PaymentRate::unavailable(AppError::MissingApiBase);
    }

    let mut acc = RateAccumulator::default();

    let token_url = build_url(base, TOKEN_PRICES_PATH);
    let rate_url = build_url(base, RATE_PATH);

    // Both calls run to completion; either failing fails the whole lookup.
    let (prices, rate) = tokio::join!(
        client.fetch_fresh(&token_url),
        client.fetch_fresh(&rate_url)
    );
    let (prices, rate) = match (prices, rate) {
        (Ok(prices), Ok(rate)) => (prices, rate),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("payment rate lookup failed: {}", e);
            return acc.fail(e);
        }
    };

    acc.apply_token_prices(&prices);
    acc.apply_rate(&rate);

    let payload = acc.finish();
    if payload.rate_from_api {
        tracing::debug!(
            rate = payload.rate,
            minimum_purchase = payload.minimum_purchase,
            transactions_enabled = payload.transactions_enabled,
            "resolved payment rate"
        );
    } else {
        tracing::warn!("backend supplied no usable rate, using default {}", payload.rate);
    }
    payload
}

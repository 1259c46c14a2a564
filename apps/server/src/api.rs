use std::sync::Arc;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Query, State},
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use coinfolio_core::{CredentialStatus, HealthReport, WalletsSnapshot};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct WalletsQuery {
    currency: Option<String>,
}

/// Upper-cased ISO-4217 style code; three ASCII letters.
fn parse_currency(raw: &str) -> ApiResult<String> {
    let code = raw.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid currency '{}': expected a 3-letter code",
            raw
        )))
    }
}

async fn current_wallets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WalletsQuery>,
) -> ApiResult<Json<WalletsSnapshot>> {
    let currency = match query.currency.as_deref() {
        Some(raw) => parse_currency(raw)?,
        None => state.wallet_aggregator.default_currency().to_string(),
    };
    let snapshot = state.wallet_aggregator.current_wallets(&currency).await;
    Ok(Json(snapshot))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.health_service.check().await)
}

async fn credentials(State(state): State<Arc<AppState>>) -> Json<Vec<CredentialStatus>> {
    Json(state.credential_status.check_all().await)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/wallets/current", get(current_wallets))
        .route("/health", get(health))
        .route("/credentials", get(credentials))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

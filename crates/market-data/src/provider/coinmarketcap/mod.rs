//! CoinMarketCap quote provider implementation.
//!
//! Endpoints used:
//! - `/v1/cryptocurrency/map` to resolve symbols to CoinMarketCap ids
//! - `/v1/cryptocurrency/quotes/latest` for batched latest quotes
//! - `/v1/key/info` for key validity and remaining quota
//!
//! API documentation: https://coinmarketcap.com/api/documentation/v1/

mod models;

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{MarketDataError, RetryPolicy};
use crate::models::{AssetIdentity, ProviderAssetId, ProviderHealth, QuoteRecord};
use crate::provider::QuoteProvider;

use models::{CmcErrorResponse, CmcKeyInfo, CmcKeyInfoResponse, CmcMapResponse, CmcQuotesResponse};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com";

const PROVIDER_ID: &str = "COINMARKETCAP";
const PROVIDER_NAME: &str = "CoinMarketCap";

const MAP_PATH: &str = "/v1/cryptocurrency/map";
const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";
const KEY_INFO_PATH: &str = "/v1/key/info";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CoinMarketCap quote provider.
///
/// The API key is optional at construction so that health reporting can say
/// why quoting is impossible; every data call fails with
/// [`MarketDataError::MissingApiKey`] when it is absent.
pub struct CoinMarketCapProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl CoinMarketCapProvider {
    /// Create a provider against the production host.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: build_client(REQUEST_TIMEOUT),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Point the provider at another host (sandbox or a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
            })
    }

    /// Make a single GET request and return the body of a successful response.
    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, MarketDataError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        debug!("CoinMarketCap request: {} with {} params", path, params.len());

        let response = self
            .client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", api_key)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                status: None,
                status_reason: format!("Request failed: {}", e),
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                status: Some(status.as_u16()),
                status_reason: error_reason(status, &body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                detail: format!("Failed to read response: {}", e),
            })
    }

    /// [`get`](Self::get) under the retry policy.
    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, MarketDataError> {
        self.retry
            .run(PROVIDER_ID, move || self.get(path, params))
            .await
    }
}

#[async_trait]
impl QuoteProvider for CoinMarketCapProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn resolve_asset_ids(
        &self,
        symbols: &BTreeSet<String>,
    ) -> Result<Vec<AssetIdentity>, MarketDataError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let joined = symbols.iter().cloned().collect::<Vec<_>>().join(",");
        let body = self.fetch(MAP_PATH, &[("symbol", joined)]).await?;
        parse_symbol_map(&body)
    }

    async fn latest_quotes(
        &self,
        ids: &BTreeSet<ProviderAssetId>,
        currency: &str,
    ) -> Result<HashMap<ProviderAssetId, QuoteRecord>, MarketDataError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let params = [("id", joined), ("convert", currency.to_string())];
        let body = self.fetch(QUOTES_PATH, &params).await?;
        parse_quotes(&body, currency)
    }

    async fn health_check(&self) -> ProviderHealth {
        if let Err(e) = self.api_key() {
            return ProviderHealth::unhealthy(e.to_string());
        }

        let body = match self.get(KEY_INFO_PATH, &[]).await {
            Ok(body) => body,
            Err(MarketDataError::ProviderUnavailable { status_reason, .. }) => {
                return ProviderHealth::unhealthy(status_reason)
            }
            Err(e) => return ProviderHealth::unhealthy(e.to_string()),
        };

        match decode::<CmcKeyInfoResponse>(&body) {
            Ok(response) => evaluate_usage(&response.data),
            Err(e) => ProviderHealth::unhealthy(e.to_string()),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::MalformedResponse {
        provider: PROVIDER_ID.to_string(),
        detail: e.to_string(),
    })
}

/// Prefer the provider's own error message over the bare reason phrase.
fn error_reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<CmcErrorResponse>(body)
        .ok()
        .and_then(|e| e.status.error_message)
        .unwrap_or_else(|| {
            format!(
                "Response from {} not ok ({})",
                PROVIDER_NAME,
                status.canonical_reason().unwrap_or("unknown status")
            )
        })
}

/// Symbol to id map. The same ticker can belong to several assets; the
/// first active entry wins, falling back to the first entry.
fn parse_symbol_map(body: &str) -> Result<Vec<AssetIdentity>, MarketDataError> {
    let response: CmcMapResponse = decode(body)?;

    let mut identities: Vec<AssetIdentity> = Vec::new();
    let mut chosen: HashMap<String, (usize, bool)> = HashMap::new();

    for entry in response.data {
        match chosen.get(&entry.symbol).copied() {
            None => {
                chosen.insert(entry.symbol.clone(), (identities.len(), entry.is_active));
                identities.push(AssetIdentity::new(entry.symbol, entry.id));
            }
            Some((index, false)) if entry.is_active => {
                chosen.insert(entry.symbol.clone(), (index, true));
                identities[index] = AssetIdentity::new(entry.symbol, entry.id);
            }
            Some(_) => {}
        }
    }

    Ok(identities)
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn parse_quotes(
    body: &str,
    currency: &str,
) -> Result<HashMap<ProviderAssetId, QuoteRecord>, MarketDataError> {
    let response: CmcQuotesResponse = decode(body)?;

    Ok(response
        .data
        .into_values()
        .map(|asset| {
            let quote = asset.quote.get(currency);
            let record = QuoteRecord {
                asset_id: asset.id,
                symbol: asset.symbol,
                price: quote.and_then(|q| q.price),
                complete: quote.map(|q| q.is_complete()).unwrap_or(false),
                last_updated: quote
                    .and_then(|q| q.last_updated.as_deref())
                    .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    .map(|ts| ts.with_timezone(&Utc)),
            };
            (record.asset_id, record)
        })
        .collect())
}

fn limit_text(limit: Option<i64>) -> String {
    limit
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn reset_text(reset: Option<&str>) -> String {
    reset
        .map(|r| format!(" Reset {}.", r.to_lowercase()))
        .unwrap_or_default()
}

/// Turns the key usage report into a health status.
fn evaluate_usage(info: &CmcKeyInfo) -> ProviderHealth {
    let usage = &info.usage;
    let plan = &info.plan;

    if usage.current_minute.requests_left == Some(0) {
        return ProviderHealth::unhealthy(format!(
            "Minute rate limit exceeded (limit = {}).",
            limit_text(plan.rate_limit_minute)
        ));
    }

    if usage.current_day.credits_left == Some(0) {
        return ProviderHealth::unhealthy(format!(
            "Day credits exceeded (limit = {}).{}",
            limit_text(plan.credit_limit_daily),
            reset_text(plan.credit_limit_daily_reset.as_deref())
        ));
    }

    if let (Some(used), Some(left)) = (
        usage.current_month.credits_used,
        usage.current_month.credits_left,
    ) {
        if used > left {
            return ProviderHealth::unhealthy(format!(
                "Month credits exceeded (limit = {}).{}",
                limit_text(plan.credit_limit_monthly),
                reset_text(plan.credit_limit_monthly_reset.as_deref())
            ));
        }
    }

    ProviderHealth::Ok
}

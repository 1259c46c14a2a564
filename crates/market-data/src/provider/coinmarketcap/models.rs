//! CoinMarketCap API response models.
//!
//! Only the fields the quoting pipeline relies on are typed. Everything else
//! in the quote object is kept as raw JSON so that the null-field filter can
//! still see it.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Status block present on every response, including errors.
#[derive(Debug, Deserialize)]
pub struct CmcStatus {
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct CmcErrorResponse {
    pub status: CmcStatus,
}

/// Response of `/v1/cryptocurrency/map`.
#[derive(Debug, Deserialize)]
pub struct CmcMapResponse {
    pub data: Vec<CmcMapEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CmcMapEntry {
    pub id: u64,
    pub symbol: String,
    // Sent as 1/0 by the API
    #[serde(default = "default_active", deserialize_with = "flag")]
    pub is_active: bool,
}

/// Response of `/v1/cryptocurrency/quotes/latest`. Keys of `data` are asset ids.
#[derive(Debug, Deserialize)]
pub struct CmcQuotesResponse {
    pub data: HashMap<String, CmcQuotedAsset>,
}

#[derive(Debug, Deserialize)]
pub struct CmcQuotedAsset {
    pub id: u64,
    pub symbol: String,
    /// Quotes keyed by convert currency (e.g. "USD").
    #[serde(default)]
    pub quote: HashMap<String, CmcCurrencyQuote>,
}

/// Quote of one asset in one convert currency.
///
/// Only `price` is decoded as a decimal; the market statistics stay `f64`
/// since they are only checked for presence and can exceed decimal range.
/// A price outside decimal range reads as absent.
#[derive(Debug, Deserialize)]
pub struct CmcCurrencyQuote {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    pub volume_24h: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub market_cap: Option<f64>,
    pub last_updated: Option<String>,
    /// Remaining fields (e.g. `fully_diluted_market_cap`), untyped.
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl CmcCurrencyQuote {
    /// True when no field of the quote, typed or not, is null.
    pub fn is_complete(&self) -> bool {
        self.price.is_some()
            && self.volume_24h.is_some()
            && self.percent_change_1h.is_some()
            && self.percent_change_24h.is_some()
            && self.percent_change_7d.is_some()
            && self.market_cap.is_some()
            && self.last_updated.is_some()
            && self.other.values().all(|value| !value.is_null())
    }
}

/// Response of `/v1/key/info`.
#[derive(Debug, Deserialize)]
pub struct CmcKeyInfoResponse {
    pub data: CmcKeyInfo,
}

#[derive(Debug, Deserialize)]
pub struct CmcKeyInfo {
    pub plan: CmcPlan,
    pub usage: CmcUsage,
}

#[derive(Debug, Default, Deserialize)]
pub struct CmcPlan {
    #[serde(default)]
    pub credit_limit_daily: Option<i64>,
    #[serde(default)]
    pub credit_limit_daily_reset: Option<String>,
    #[serde(default)]
    pub credit_limit_monthly: Option<i64>,
    #[serde(default)]
    pub credit_limit_monthly_reset: Option<String>,
    #[serde(default)]
    pub rate_limit_minute: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CmcUsage {
    pub current_minute: CmcMinuteUsage,
    pub current_day: CmcCreditUsage,
    pub current_month: CmcCreditUsage,
}

#[derive(Debug, Deserialize)]
pub struct CmcMinuteUsage {
    #[serde(default)]
    pub requests_made: Option<i64>,
    #[serde(default)]
    pub requests_left: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CmcCreditUsage {
    #[serde(default)]
    pub credits_used: Option<i64>,
    #[serde(default)]
    pub credits_left: Option<i64>,
}

fn default_active() -> bool {
    true
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Decimal(Decimal),
        Other(serde_json::Value),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Decimal(value)) => Some(value),
        Some(Price::Other(_)) | None => None,
    })
}

//! Explicit configuration for the core services.
//!
//! Nothing in this crate reads the environment; the embedding application
//! builds a [`CoreConfig`] once and passes it down.

use std::time::Duration;

use coinfolio_market_data::RetryPolicy;

use crate::credentials::CredentialSettings;

pub const BINANCE_HOST: &str = "https://api.binance.com";
pub const KUCOIN_HOST: &str = "https://api.kucoin.com";
pub const AMBERDATA_HOST: &str = "https://web3api.io";
pub const CELSIUS_HOST: &str = "https://wallet-api.celsius.network";
pub const COINMARKETCAP_HOST: &str =
    coinfolio_market_data::provider::coinmarketcap::DEFAULT_BASE_URL;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_AGGREGATION_DEADLINE: Duration = Duration::from_secs(20);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URLs of every upstream service.
#[derive(Clone, Debug)]
pub struct ProviderEndpoints {
    pub binance: String,
    pub kucoin: String,
    pub amberdata: String,
    pub celsius: String,
    pub coinmarketcap: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            binance: BINANCE_HOST.to_string(),
            kucoin: KUCOIN_HOST.to_string(),
            amberdata: AMBERDATA_HOST.to_string(),
            celsius: CELSIUS_HOST.to_string(),
            coinmarketcap: COINMARKETCAP_HOST.to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Every service at one host. Used to point all clients at a mock server.
    pub fn all_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            binance: base.clone(),
            kucoin: base.clone(),
            amberdata: base.clone(),
            celsius: base.clone(),
            coinmarketcap: base,
        }
    }
}

/// Settings for one aggregation request.
#[derive(Clone, Debug)]
pub struct AggregationConfig {
    /// Bounds every provider fetch and the price stage of one request.
    pub deadline: Duration,
    /// Target currency when the caller does not name one.
    pub default_currency: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_AGGREGATION_DEADLINE,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CoreConfig {
    pub credentials: CredentialSettings,
    /// CoinMarketCap key; quoting is impossible without it.
    pub coinmarketcap_api_key: Option<String>,
    pub endpoints: ProviderEndpoints,
    pub aggregation: AggregationConfig,
    pub retry: RetryPolicy,
    /// Per HTTP request timeout.
    pub request_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialSettings::default(),
            coinmarketcap_api_key: None,
            endpoints: ProviderEndpoints::default(),
            aggregation: AggregationConfig::default(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

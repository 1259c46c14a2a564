use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use coinfolio_core::config::{AggregationConfig, CoreConfig, ProviderEndpoints};
use coinfolio_core::credentials::{CredentialSettings, ProviderKind, RawCredentials};
use coinfolio_market_data::RetryPolicy;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    /// Upper bound for a whole HTTP request to this server.
    pub request_timeout: Duration,
    pub core: CoreConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("CF_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid CF_LISTEN_ADDR")?;
        let cors_allow = std::env::var("CF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_u64("CF_REQUEST_TIMEOUT_MS", 30_000);
        let provider_timeout_ms = env_u64("CF_PROVIDER_TIMEOUT_MS", 10_000);
        let deadline_ms = env_u64("CF_AGGREGATION_DEADLINE_MS", 20_000);
        let max_attempts = env_u64("CF_RETRY_MAX_ATTEMPTS", 3).clamp(1, 10) as u32;
        let default_currency = std::env::var("CF_DEFAULT_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .ok()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "USD".into());

        let core = CoreConfig {
            credentials: credentials_from_env(),
            coinmarketcap_api_key: env_opt("COINMARKETCAP_API_KEY"),
            endpoints: endpoints_from_env(),
            aggregation: AggregationConfig {
                deadline: Duration::from_millis(deadline_ms),
                default_currency,
            },
            retry: RetryPolicy {
                max_attempts,
                ..RetryPolicy::default()
            },
            request_timeout: Duration::from_millis(provider_timeout_ms),
        };

        let config = Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            core,
        };
        config.validate()?;
        Ok(config)
    }

    /// The aggregation deadline must expire before the request timeout, or
    /// the partial snapshot is never sent.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.core.aggregation.deadline < self.request_timeout,
            "CF_AGGREGATION_DEADLINE_MS ({} ms) must be below CF_REQUEST_TIMEOUT_MS ({} ms)",
            self.core.aggregation.deadline.as_millis(),
            self.request_timeout.as_millis()
        );
        Ok(())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn credentials_from_env() -> CredentialSettings {
    CredentialSettings::new()
        .with(
            ProviderKind::Binance,
            RawCredentials::new()
                .with("api_key", env_opt("BINANCE_API_KEY"))
                .with("secret", env_opt("BINANCE_SECRET")),
        )
        .with(
            ProviderKind::Kucoin,
            RawCredentials::new()
                .with("api_key", env_opt("KUCOIN_API_KEY"))
                .with("secret", env_opt("KUCOIN_SECRET"))
                .with("passphrase", env_opt("KUCOIN_PASSPHRASE")),
        )
        .with(
            ProviderKind::Ethereum,
            RawCredentials::new()
                .with("api_key", env_opt("AMBERDATA_API_KEY"))
                .with("wallet_address", env_opt("ETHEREUM_WALLET_ADDRESS")),
        )
        .with(
            ProviderKind::Celsius,
            RawCredentials::new()
                .with("api_key", env_opt("CELSIUS_API_KEY"))
                .with("partner_token", env_opt("CELSIUS_PARTNER_TOKEN")),
        )
}

fn endpoints_from_env() -> ProviderEndpoints {
    let defaults = ProviderEndpoints::default();
    ProviderEndpoints {
        binance: env_opt("BINANCE_HOST").unwrap_or(defaults.binance),
        kucoin: env_opt("KUCOIN_HOST").unwrap_or(defaults.kucoin),
        amberdata: env_opt("AMBERDATA_HOST").unwrap_or(defaults.amberdata),
        celsius: env_opt("CELSIUS_HOST").unwrap_or(defaults.celsius),
        coinmarketcap: env_opt("COINMARKETCAP_HOST").unwrap_or(defaults.coinmarketcap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(deadline_ms: u64, request_timeout_ms: u64) -> Config {
        let mut core = CoreConfig::default();
        core.aggregation.deadline = Duration::from_millis(deadline_ms);
        Config {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(request_timeout_ms),
            core,
        }
    }

    #[test]
    fn test_deadline_must_fit_in_request_timeout() {
        assert!(config(20_000, 30_000).validate().is_ok());

        let err = config(30_000, 30_000).validate().unwrap_err();
        assert!(err.to_string().contains("CF_AGGREGATION_DEADLINE_MS"));
        assert!(config(45_000, 30_000).validate().is_err());
    }
}

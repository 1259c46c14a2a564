//! Health service implementation.

use std::sync::Arc;

use coinfolio_market_data::{PriceQuoteServiceTrait, ProviderHealth};
use log::{info, warn};

use super::model::HealthReport;
use super::traits::ChainHealthCheck;
use crate::credentials::{CredentialResolver, ProviderKind, RawCredentials};

pub struct HealthService {
    quotes: Arc<dyn PriceQuoteServiceTrait>,
    chain: Arc<dyn ChainHealthCheck>,
    /// Ethereum credentials; the Amberdata key doubles as the health probe key.
    chain_credentials: RawCredentials,
}

impl HealthService {
    pub fn new(
        quotes: Arc<dyn PriceQuoteServiceTrait>,
        chain: Arc<dyn ChainHealthCheck>,
        chain_credentials: RawCredentials,
    ) -> Self {
        Self {
            quotes,
            chain,
            chain_credentials,
        }
    }

    /// Probes CoinMarketCap and Amberdata concurrently.
    pub async fn check(&self) -> HealthReport {
        let (coinmarketcap_status, amberdata_status) =
            tokio::join!(self.quotes.health(), self.chain_status());

        let report = HealthReport {
            coinmarketcap_status,
            amberdata_status,
        };
        if report.is_healthy() {
            info!("Upstreams healthy");
        } else {
            warn!(
                "Upstream health: coinmarketcap={}, amberdata={}",
                report.coinmarketcap_status, report.amberdata_status
            );
        }
        report
    }

    async fn chain_status(&self) -> ProviderHealth {
        match CredentialResolver::resolve(ProviderKind::Ethereum, &self.chain_credentials) {
            Ok(bundle) => self.chain.chain_health(&bundle).await,
            Err(e) => ProviderHealth::unhealthy(e.to_string()),
        }
    }
}

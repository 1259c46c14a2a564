use std::sync::Arc;

use crate::config::Config;
use coinfolio_core::{
    credentials::{CredentialStatusChecker, ProviderKind},
    health::HealthService,
    providers::ProviderSet,
    wallets::{WalletAggregator, WalletAggregatorTrait},
};
use coinfolio_market_data::{CoinMarketCapProvider, PriceQuoteService, PriceQuoteServiceTrait};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub wallet_aggregator: Arc<dyn WalletAggregatorTrait>,
    pub credential_status: Arc<CredentialStatusChecker>,
    pub health_service: Arc<HealthService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("CF_LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let core = &config.core;

    let quote_provider = CoinMarketCapProvider::new(core.coinmarketcap_api_key.clone())
        .with_base_url(core.endpoints.coinmarketcap.clone())
        .with_timeout(core.request_timeout)
        .with_retry_policy(core.retry.clone());
    let quote_service: Arc<dyn PriceQuoteServiceTrait> =
        Arc::new(PriceQuoteService::new(Arc::new(quote_provider)));

    let providers = ProviderSet::from_config(core);

    let wallet_aggregator = Arc::new(WalletAggregator::new(
        providers.wallet_providers(),
        core.credentials.clone(),
        quote_service.clone(),
        core.aggregation.clone(),
    ));
    let credential_status = Arc::new(CredentialStatusChecker::new(
        providers.wallet_providers(),
        core.credentials.clone(),
    ));
    let health_service = Arc::new(HealthService::new(
        quote_service,
        providers.ethereum.clone(),
        core.credentials.for_provider(ProviderKind::Ethereum),
    ));

    let configured: Vec<String> = ProviderKind::ALL
        .iter()
        .filter(|kind| core.credentials.for_provider(**kind).is_submitted())
        .map(|kind| kind.to_string())
        .collect();
    tracing::info!(
        "Wallet providers with credentials: [{}]; deadline {:?}",
        configured.join(", "),
        core.aggregation.deadline
    );

    Ok(Arc::new(AppState {
        wallet_aggregator,
        credential_status,
        health_service,
    }))
}

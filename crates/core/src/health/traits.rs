use async_trait::async_trait;
use coinfolio_market_data::ProviderHealth;

use crate::credentials::CredentialBundle;
use crate::providers::EthereumProvider;

/// Status probe of the on-chain data API.
#[async_trait]
pub trait ChainHealthCheck: Send + Sync {
    async fn chain_health(&self, credentials: &CredentialBundle) -> ProviderHealth;
}

#[async_trait]
impl ChainHealthCheck for EthereumProvider {
    async fn chain_health(&self, credentials: &CredentialBundle) -> ProviderHealth {
        self.health_check(credentials).await
    }
}

use async_trait::async_trait;

use crate::credentials::{CredentialBundle, ProviderKind};
use crate::errors::Result;
use crate::wallets::{normalize, Balance, RawBalance};

/// Outcome of a lightweight authenticated probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessCheck {
    Granted,
    Denied(String),
}

/// One wallet source: knows its auth protocol and response shape.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Symbols this provider reports that are never priced.
    fn denylist(&self) -> &'static [&'static str] {
        &[]
    }

    /// Balance records exactly as reported, already converted to base units.
    async fn fetch_raw_balances(&self, credentials: &CredentialBundle) -> Result<Vec<RawBalance>>;

    /// Normalized balances.
    async fn fetch_balances(&self, credentials: &CredentialBundle) -> Result<Vec<Balance>> {
        let records = self.fetch_raw_balances(credentials).await?;
        Ok(normalize(records, self.denylist()))
    }

    /// Checks that the credentials are accepted and allow reading balances.
    async fn verify_access(&self, credentials: &CredentialBundle) -> Result<AccessCheck>;
}

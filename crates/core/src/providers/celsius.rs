//! Celsius wallet balances. Static header authentication, no signing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::ProviderHttp;
use super::traits::{AccessCheck, WalletProvider};
use crate::credentials::{CredentialBundle, ProviderKind};
use crate::errors::Result;
use crate::wallets::RawBalance;

const BALANCE_PATH: &str = "/wallet/balance";

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: BTreeMap<String, Decimal>,
}

impl BalanceResponse {
    fn into_records(self) -> Vec<RawBalance> {
        self.balance
            .into_iter()
            .map(|(symbol, amount)| RawBalance::new(symbol.to_uppercase(), amount))
            .collect()
    }
}

pub struct CelsiusProvider {
    http: ProviderHttp,
}

impl CelsiusProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WalletProvider for CelsiusProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Celsius
    }

    async fn fetch_raw_balances(&self, credentials: &CredentialBundle) -> Result<Vec<RawBalance>> {
        let response: BalanceResponse = self.http.get_json(credentials, BALANCE_PATH, &[]).await?;
        Ok(response.into_records())
    }

    async fn verify_access(&self, credentials: &CredentialBundle) -> Result<AccessCheck> {
        let _: BalanceResponse = self.http.get_json(credentials, BALANCE_PATH, &[]).await?;
        Ok(AccessCheck::Granted)
    }
}

//! KuCoin accounts (main, trade and margin).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::ProviderHttp;
use super::traits::{AccessCheck, WalletProvider};
use crate::credentials::{CredentialBundle, ProviderKind};
use crate::errors::{Error, Result};
use crate::wallets::RawBalance;

const ACCOUNTS_PATH: &str = "/api/v1/accounts";
const SUCCESS_CODE: &str = "200000";

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    currency: String,
    balance: Decimal,
}

pub struct KucoinProvider {
    http: ProviderHttp,
}

impl KucoinProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    async fn accounts(&self, credentials: &CredentialBundle) -> Result<Vec<Account>> {
        let response: AccountsResponse = self.http.get_json(credentials, ACCOUNTS_PATH, &[]).await?;
        check_code(response)
    }
}

/// KuCoin reports API errors with HTTP 200 and a non-success body code.
fn check_code(response: AccountsResponse) -> Result<Vec<Account>> {
    if response.code != SUCCESS_CODE {
        return Err(Error::ProviderUnavailable {
            provider: ProviderKind::Kucoin,
            status: None,
            status_reason: response
                .msg
                .unwrap_or_else(|| format!("Error code {}", response.code)),
        });
    }
    Ok(response.data)
}

#[async_trait]
impl WalletProvider for KucoinProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kucoin
    }

    /// One record per sub-account; the normalizer sums them per currency.
    async fn fetch_raw_balances(&self, credentials: &CredentialBundle) -> Result<Vec<RawBalance>> {
        Ok(self
            .accounts(credentials)
            .await?
            .into_iter()
            .map(|account| RawBalance::new(account.currency, account.balance))
            .collect())
    }

    async fn verify_access(&self, credentials: &CredentialBundle) -> Result<AccessCheck> {
        self.accounts(credentials).await?;
        Ok(AccessCheck::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::decode;
    use crate::wallets::normalize;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sub_accounts_are_summed() {
        let body = r#"{"code": "200000", "data": [
            {"id": "1", "currency": "BTC", "type": "main", "balance": "0.5", "available": "0.5", "holds": "0"},
            {"id": "2", "currency": "USDT", "type": "trade", "balance": "100", "available": "100", "holds": "0"},
            {"id": "3", "currency": "BTC", "type": "trade", "balance": "0.25", "available": "0.25", "holds": "0"},
            {"id": "4", "currency": "ETH", "type": "margin", "balance": "0", "available": "0", "holds": "0"}
        ]}"#;

        let response: AccountsResponse = decode(ProviderKind::Kucoin, body).unwrap();
        let records: Vec<RawBalance> = check_code(response)
            .unwrap()
            .into_iter()
            .map(|a| RawBalance::new(a.currency, a.balance))
            .collect();
        let balances = normalize(records, &[]);

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].symbol(), "BTC");
        assert_eq!(balances[0].amount(), dec!(0.75));
        assert_eq!(balances[1].symbol(), "USDT");
    }

    #[test]
    fn test_error_code_is_unavailable() {
        let body = r#"{"code": "400003", "msg": "KC-API-KEY not exists"}"#;
        let response: AccountsResponse = decode(ProviderKind::Kucoin, body).unwrap();

        let err = check_code(response).unwrap_err();
        assert_eq!(err.to_string(), "KuCoin unavailable: KC-API-KEY not exists");
    }
}

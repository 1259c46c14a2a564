//! Ethereum address balances read through the Amberdata web3 API.
//!
//! Native ETH and ERC20 token balances are reported as integer strings in
//! the smallest unit and scaled by 10^-decimals.

use async_trait::async_trait;
use coinfolio_market_data::ProviderHealth;
use log::{debug, warn};
use serde::Deserialize;

use super::http::ProviderHttp;
use super::traits::{AccessCheck, WalletProvider};
use crate::credentials::{CredentialBundle, ProviderKind};
use crate::errors::{Error, Result};
use crate::wallets::{from_smallest_unit, RawBalance, DEFAULT_TOKEN_DECIMALS};

const API_PREFIX: &str = "/api/v2";
const HEALTH_PATH: &str = "/health";
const FIRST_BLOCK_PATH: &str = "/api/v2/blocks/0";
const TOKEN_PAGE_SIZE: u64 = 100;
const MAX_TOKEN_PAGES: u64 = 20;

const NATIVE_SYMBOL: &str = "ETH";
const NATIVE_DECIMALS: u32 = 18;

/// Amberdata sends counts and decimals either as JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(u64),
    Text(String),
}

impl Numeric {
    fn as_text(&self) -> String {
        match self {
            Numeric::Number(n) => n.to_string(),
            Numeric::Text(s) => s.trim().to_string(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: T,
}

#[derive(Debug, Deserialize)]
struct AccountBalance {
    value: Numeric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPage {
    #[serde(default)]
    records: Vec<TokenBalance>,
    #[serde(default)]
    total_records: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    #[serde(default)]
    symbol: Option<String>,
    amount: Numeric,
    #[serde(default)]
    decimals: Option<Numeric>,
    #[serde(rename = "isERC20", default)]
    is_erc20: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressLookup {
    total_records: Numeric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    base_url: String,
    status: String,
}

pub struct EthereumProvider {
    http: ProviderHttp,
}

impl EthereumProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    fn address(credentials: &CredentialBundle) -> Result<&str> {
        match credentials {
            CredentialBundle::Ethereum { address, .. } => Ok(address.as_str()),
            other => Err(Error::InvalidConfigValue(format!(
                "{} credentials passed to the Ethereum provider",
                other.kind()
            ))),
        }
    }

    async fn native_balance(
        &self,
        credentials: &CredentialBundle,
        address: &str,
    ) -> Result<RawBalance> {
        let path = format!("{}/addresses/{}/account-balances/latest", API_PREFIX, address);
        let response: Envelope<AccountBalance> =
            self.http.get_json(credentials, &path, &[]).await?;
        scale(NATIVE_SYMBOL, &response.payload.value, NATIVE_DECIMALS)
    }

    async fn token_balances(
        &self,
        credentials: &CredentialBundle,
        address: &str,
    ) -> Result<Vec<RawBalance>> {
        let path = format!("{}/addresses/{}/token-balances/latest", API_PREFIX, address);
        let mut records = Vec::new();
        let mut seen: u64 = 0;

        for page in 0..MAX_TOKEN_PAGES {
            let params = [
                ("page", page.to_string()),
                ("size", TOKEN_PAGE_SIZE.to_string()),
            ];
            let response: Envelope<TokenPage> =
                self.http.get_json(credentials, &path, &params).await?;
            let batch = response.payload;

            let fetched = batch.records.len() as u64;
            seen += fetched;
            records.extend(erc20_records(batch.records)?);

            let total = batch.total_records.as_ref().and_then(Numeric::as_u64);
            if fetched < TOKEN_PAGE_SIZE || total.map_or(true, |total| seen >= total) {
                return Ok(records);
            }
        }

        warn!(
            "Token balances of {} truncated after {} pages",
            address, MAX_TOKEN_PAGES
        );
        Ok(records)
    }

    /// Amberdata status: the v2 API is up and the key is accepted.
    pub async fn health_check(&self, credentials: &CredentialBundle) -> ProviderHealth {
        let services: Vec<ServiceStatus> = match self.http.get_public_json(HEALTH_PATH).await {
            Ok(services) => services,
            Err(Error::ProviderUnavailable { status_reason, .. }) => {
                return ProviderHealth::unhealthy(status_reason)
            }
            Err(e) => return ProviderHealth::unhealthy(e.to_string()),
        };

        let required_api = format!("{}{}", self.http.base_url(), API_PREFIX);
        match services.iter().find(|s| s.base_url == required_api) {
            Some(service) if service.status != "up" => {
                return ProviderHealth::unhealthy(service.status.clone())
            }
            Some(_) => {}
            None => return ProviderHealth::unhealthy("API version not found"),
        }

        // /health does not check the key; probe a cheap authenticated endpoint.
        match self
            .http
            .get_json::<serde_json::Value>(credentials, FIRST_BLOCK_PATH, &[])
            .await
        {
            Ok(_) => ProviderHealth::Ok,
            Err(Error::ProviderUnavailable {
                status: Some(403), ..
            }) => ProviderHealth::unhealthy("Access Forbidden: check API key"),
            Err(e) => {
                debug!("Amberdata probe failed: {}", e);
                ProviderHealth::unhealthy("Response from Amberdata not ok")
            }
        }
    }
}

fn scale(symbol: &str, amount: &Numeric, decimals: u32) -> Result<RawBalance> {
    let text = amount.as_text();
    let value = from_smallest_unit(&text, decimals).ok_or_else(|| Error::MalformedResponse {
        provider: ProviderKind::Ethereum,
        detail: format!("Invalid amount '{}' for {}", text, symbol),
    })?;
    Ok(RawBalance::new(symbol, value))
}

/// ERC20 entries only, each scaled by its own decimals.
fn erc20_records(tokens: Vec<TokenBalance>) -> Result<Vec<RawBalance>> {
    tokens
        .into_iter()
        .filter(|token| token.is_erc20)
        .filter_map(|token| {
            let symbol = token.symbol.filter(|s| !s.trim().is_empty())?;
            let decimals = token
                .decimals
                .as_ref()
                .and_then(Numeric::as_u64)
                .and_then(|d| u32::try_from(d).ok())
                .unwrap_or(DEFAULT_TOKEN_DECIMALS);
            Some(scale(&symbol, &token.amount, decimals))
        })
        .collect()
}

#[async_trait]
impl WalletProvider for EthereumProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ethereum
    }

    async fn fetch_raw_balances(&self, credentials: &CredentialBundle) -> Result<Vec<RawBalance>> {
        let address = Self::address(credentials)?;

        let mut records = vec![self.native_balance(credentials, address).await?];
        records.extend(self.token_balances(credentials, address).await?);
        Ok(records)
    }

    async fn verify_access(&self, credentials: &CredentialBundle) -> Result<AccessCheck> {
        let address = Self::address(credentials)?;
        let path = format!("{}/addresses", API_PREFIX);
        let response: Envelope<AddressLookup> = self
            .http
            .get_json(credentials, &path, &[("hash", address.to_string())])
            .await?;

        Ok(match response.payload.total_records.as_u64() {
            Some(n) if n > 0 => AccessCheck::Granted,
            _ => AccessCheck::Denied(format!("Wallet address '{}' unknown", address)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::decode;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_native_balance_is_scaled_from_wei() {
        let body = r#"{"status": 200, "title": "OK", "payload": {"value": "1500000000000000000"}}"#;
        let response: Envelope<AccountBalance> = decode(ProviderKind::Ethereum, body).unwrap();
        let record = scale(NATIVE_SYMBOL, &response.payload.value, NATIVE_DECIMALS).unwrap();
        assert_eq!(record, RawBalance::new("ETH", dec!(1.5)));
    }

    #[test]
    fn test_only_erc20_tokens_are_kept() {
        let body = r#"{"payload": {"totalRecords": "3", "records": [
            {"symbol": "USDC", "amount": "2500000", "decimals": "6", "isERC20": true},
            {"symbol": "DAI", "amount": "1000000000000000000", "isERC20": true},
            {"symbol": "PUNK", "amount": "1", "decimals": 0, "isERC20": false, "isERC721": true}
        ]}}"#;
        let response: Envelope<TokenPage> = decode(ProviderKind::Ethereum, body).unwrap();

        let records = erc20_records(response.payload.records).unwrap();
        assert_eq!(
            records,
            vec![
                RawBalance::new("USDC", dec!(2.5)),
                RawBalance::new("DAI", dec!(1)),
            ]
        );
    }

    #[test]
    fn test_uint256_spam_token_does_not_fail_the_page() {
        let body = r#"{"payload": {"records": [
            {"symbol": "SPAM", "amount": "115792089237316195423570985008687907853269984665640564039457584007913129639935", "decimals": "18", "isERC20": true},
            {"symbol": "DUST", "amount": "10000000000000000000000000000000000000000", "isERC20": true},
            {"symbol": "USDC", "amount": "2500000", "decimals": "6", "isERC20": true}
        ]}}"#;
        let response: Envelope<TokenPage> = decode(ProviderKind::Ethereum, body).unwrap();

        let records = erc20_records(response.payload.records).unwrap();
        assert_eq!(
            records,
            vec![
                RawBalance::new("SPAM", Decimal::MAX),
                RawBalance::new("DUST", dec!(10000000000000000000000)),
                RawBalance::new("USDC", dec!(2.5)),
            ]
        );
    }

    #[test]
    fn test_non_integer_amount_is_malformed() {
        let token = TokenBalance {
            symbol: Some("BAD".to_string()),
            amount: Numeric::Text("1.5e3".to_string()),
            decimals: None,
            is_erc20: true,
        };
        let err = erc20_records(vec![token]).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_wrong_bundle_is_rejected() {
        let bundle = CredentialBundle::Celsius {
            api_key: crate::credentials::Secret::new("k"),
            partner_token: crate::credentials::Secret::new("t"),
        };
        assert!(EthereumProvider::address(&bundle).is_err());
    }
}

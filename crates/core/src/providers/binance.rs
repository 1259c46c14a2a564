//! Binance spot wallet via the daily account snapshot.
//!
//! Requests are signed over the query string (HMAC-SHA256, hex) and carry
//! the key in `X-MBX-APIKEY`.

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::ProviderHttp;
use super::traits::{AccessCheck, WalletProvider};
use crate::credentials::{CredentialBundle, ProviderKind};
use crate::errors::{Error, Result};
use crate::wallets::RawBalance;

const ACCOUNT_SNAPSHOT_PATH: &str = "/sapi/v1/accountSnapshot";
const API_RESTRICTIONS_PATH: &str = "/sapi/v1/account/apiRestrictions";

/// Locked BNB; reported by the snapshot but not a tradable asset.
const DENYLIST: &[&str] = &["LDBNB"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotResponse {
    snapshot_vos: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    data: SnapshotData,
}

#[derive(Debug, Deserialize)]
struct SnapshotData {
    balances: Vec<SnapshotBalance>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBalance {
    asset: String,
    free: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRestrictions {
    enable_reading: bool,
}

pub struct BinanceProvider {
    http: ProviderHttp,
}

impl BinanceProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }
}

/// Uses the most recent snapshot; the `free` amount of each asset.
fn parse_snapshot(response: SnapshotResponse) -> Result<Vec<RawBalance>> {
    let latest = response
        .snapshot_vos
        .into_iter()
        .last()
        .ok_or_else(|| Error::MalformedResponse {
            provider: ProviderKind::Binance,
            detail: "snapshotVos is empty".to_string(),
        })?;

    Ok(latest
        .data
        .balances
        .into_iter()
        .map(|b| RawBalance::new(b.asset, b.free))
        .collect())
}

#[async_trait]
impl WalletProvider for BinanceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Binance
    }

    fn denylist(&self) -> &'static [&'static str] {
        DENYLIST
    }

    async fn fetch_raw_balances(&self, credentials: &CredentialBundle) -> Result<Vec<RawBalance>> {
        let response: SnapshotResponse = self
            .http
            .get_json(credentials, ACCOUNT_SNAPSHOT_PATH, &[("type", "SPOT".to_string())])
            .await?;
        debug!("Binance returned {} snapshots", response.snapshot_vos.len());
        parse_snapshot(response)
    }

    async fn verify_access(&self, credentials: &CredentialBundle) -> Result<AccessCheck> {
        let restrictions: ApiRestrictions = self
            .http
            .get_json(credentials, API_RESTRICTIONS_PATH, &[])
            .await?;

        Ok(if restrictions.enable_reading {
            AccessCheck::Granted
        } else {
            AccessCheck::Denied("API key does not permit reading".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::decode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_latest_snapshot_wins() {
        let body = r#"{
            "code": 200, "msg": "",
            "snapshotVos": [
                {"type": "spot", "updateTime": 1633046400000, "data": {"totalAssetOfBtc": "0.1",
                    "balances": [{"asset": "BTC", "free": "0.1", "locked": "0"}]}},
                {"type": "spot", "updateTime": 1633132800000, "data": {"totalAssetOfBtc": "0.2",
                    "balances": [
                        {"asset": "BTC", "free": "0.2", "locked": "0.5"},
                        {"asset": "LDBNB", "free": "1", "locked": "0"}
                    ]}}
            ]
        }"#;

        let response: SnapshotResponse = decode(ProviderKind::Binance, body).unwrap();
        let records = parse_snapshot(response).unwrap();
        assert_eq!(
            records,
            vec![
                RawBalance::new("BTC", dec!(0.2)),
                RawBalance::new("LDBNB", dec!(1)),
            ]
        );
    }

    #[test]
    fn test_empty_snapshot_list_is_malformed() {
        let response: SnapshotResponse =
            decode(ProviderKind::Binance, r#"{"code": 200, "snapshotVos": []}"#).unwrap();
        let err = parse_snapshot(response).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_snapshot_key_is_malformed() {
        let err =
            decode::<SnapshotResponse>(ProviderKind::Binance, r#"{"code": -2015}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}

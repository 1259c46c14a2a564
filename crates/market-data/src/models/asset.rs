use serde::{Deserialize, Serialize};

/// Provider-internal numeric asset identifier (e.g. CoinMarketCap id `1` for BTC).
pub type ProviderAssetId = u64;

/// Link between a ticker symbol and the provider's own asset id.
///
/// Built per request by the price quote service; never cached.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIdentity {
    pub symbol: String,
    pub provider_asset_id: ProviderAssetId,
}

impl AssetIdentity {
    pub fn new(symbol: impl Into<String>, provider_asset_id: ProviderAssetId) -> Self {
        Self {
            symbol: symbol.into(),
            provider_asset_id,
        }
    }
}

use coinfolio_market_data::ProviderHealth;
use serde::Serialize;

/// Status of the upstreams the service cannot work without.
/// Each status serializes as `"ok"` or the reason it is not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub coinmarketcap_status: ProviderHealth,
    pub amberdata_status: ProviderHealth,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.coinmarketcap_status.is_ok() && self.amberdata_status.is_ok()
    }
}

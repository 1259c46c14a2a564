use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::asset::ProviderAssetId;

/// One entry of the id-indexed quote table returned by a batched quote call.
///
/// `complete` is false when any required numeric field of the target-currency
/// quote was null or absent. Such records never reach the price index.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteRecord {
    pub asset_id: ProviderAssetId,
    pub symbol: String,
    pub price: Option<Decimal>,
    pub complete: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl QuoteRecord {
    /// The price, if this record passed the null-field filter.
    pub fn usable_price(&self) -> Option<Decimal> {
        if self.complete {
            self.price
        } else {
            None
        }
    }
}

/// Validated price of a symbol in the request's target currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub currency: String,
}

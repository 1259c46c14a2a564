//! Wallet domain models.

use chrono::{DateTime, Utc};
use coinfolio_market_data::PriceIndex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::credentials::ProviderKind;
use crate::errors::{Error, Result};

/// Amount of one asset held. The amount is never negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Balance {
    symbol: String,
    amount: Decimal,
}

impl Balance {
    /// Returns `None` for negative amounts.
    pub fn new(symbol: impl Into<String>, amount: Decimal) -> Option<Self> {
        if amount < Decimal::ZERO {
            return None;
        }
        Some(Self {
            symbol: symbol.into(),
            amount,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Balance record as parsed from a provider response, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBalance {
    pub symbol: String,
    pub amount: Decimal,
}

impl RawBalance {
    pub fn new(symbol: impl Into<String>, amount: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            amount,
        }
    }
}

/// Normalized balances of one provider at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(rename = "providerName")]
    pub provider: ProviderKind,
    pub as_of: DateTime<Utc>,
    pub balances: Vec<Balance>,
}

impl Wallet {
    pub fn new(provider: ProviderKind, as_of: DateTime<Utc>, balances: Vec<Balance>) -> Self {
        Self {
            provider,
            as_of,
            balances,
        }
    }

    /// Prices every balance. Fails on the first symbol without a quote or
    /// whose value overflows.
    pub fn quote(self, index: &PriceIndex) -> Result<QuotedWallet> {
        let balances = self
            .balances
            .into_iter()
            .map(|balance| {
                let price = index.price_of(balance.symbol()).map_err(Error::from)?;
                QuotedBalance::new(balance, price)
            })
            .collect::<Result<Vec<_>>>()?;

        QuotedWallet::new(self.provider, self.as_of, index.currency(), balances)
    }
}

/// A balance with its unit price. `value` is derived at construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuotedBalance {
    symbol: String,
    amount: Decimal,
    price: Decimal,
    value: Decimal,
}

impl QuotedBalance {
    pub fn new(balance: Balance, price: Decimal) -> Result<Self> {
        let value = balance
            .amount
            .checked_mul(price)
            .ok_or_else(|| Error::ValueOverflow {
                symbol: balance.symbol.clone(),
            })?;
        Ok(Self {
            value,
            symbol: balance.symbol,
            amount: balance.amount,
            price,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}

/// Priced wallet snapshot. Immutable; `total_value` is the sum of its own
/// balance values.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedWallet {
    #[serde(rename = "providerName")]
    provider: ProviderKind,
    as_of: DateTime<Utc>,
    currency: String,
    balances: Vec<QuotedBalance>,
    total_value: Decimal,
}

impl QuotedWallet {
    pub fn new(
        provider: ProviderKind,
        as_of: DateTime<Utc>,
        currency: impl Into<String>,
        balances: Vec<QuotedBalance>,
    ) -> Result<Self> {
        let total_value = balances
            .iter()
            .try_fold(Decimal::ZERO, |total, balance| {
                total
                    .checked_add(balance.value)
                    .ok_or_else(|| Error::ValueOverflow {
                        symbol: balance.symbol.clone(),
                    })
            })?;
        Ok(Self {
            provider,
            as_of,
            currency: currency.into(),
            balances,
            total_value,
        })
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn balances(&self) -> &[QuotedBalance] {
        &self.balances
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }
}

/// Why a provider produced no wallet without having failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    #[serde(rename_all = "camelCase")]
    MissingCredentials { missing_fields: Vec<&'static str> },
    DeadlineExceeded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedProvider {
    pub provider: ProviderKind,
    pub reason: SkipReason,
}

/// A provider whose balances or quotes could not be produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub kind: &'static str,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(provider: ProviderKind, error: &Error) -> Self {
        Self {
            provider,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of one aggregation request. Every list is in provider order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletsSnapshot {
    pub currency: String,
    pub data: Vec<QuotedWallet>,
    pub skipped: Vec<SkippedProvider>,
    pub errors: Vec<ProviderFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_negative_balance_cannot_be_built() {
        assert!(Balance::new("BTC", dec!(-0.1)).is_none());
        assert!(Balance::new("BTC", dec!(0)).is_some());
    }

    #[test]
    fn test_quoted_balance_value_is_exact() {
        let balance = Balance::new("ETH", dec!(0.333333333333333333)).unwrap();
        let quoted = QuotedBalance::new(balance, dec!(3000.01)).unwrap();
        assert_eq!(quoted.value(), dec!(0.333333333333333333) * dec!(3000.01));
    }

    #[test]
    fn test_total_value_is_sum_of_values() {
        let wallet = Wallet::new(
            ProviderKind::Binance,
            Utc::now(),
            vec![
                Balance::new("BTC", dec!(0.5)).unwrap(),
                Balance::new("ETH", dec!(2)).unwrap(),
            ],
        );
        let index = PriceIndex::new(
            "USD",
            HashMap::from([
                ("BTC".to_string(), dec!(50000)),
                ("ETH".to_string(), dec!(3000)),
            ]),
        );

        let quoted = wallet.quote(&index).unwrap();
        assert_eq!(quoted.total_value(), dec!(31000));
        assert_eq!(quoted.currency(), "USD");
        assert_eq!(quoted.balances()[0].value(), dec!(25000));
    }

    #[test]
    fn test_unpriced_symbol_fails_the_wallet() {
        let wallet = Wallet::new(
            ProviderKind::Kucoin,
            Utc::now(),
            vec![Balance::new("XYZ", dec!(1)).unwrap()],
        );
        let index = PriceIndex::new("USD", HashMap::new());

        let err = wallet.quote(&index).unwrap_err();
        assert!(matches!(err, Error::NoQuoteAvailable { ref symbol } if symbol == "XYZ"));
    }

    #[test]
    fn test_value_overflow_fails_the_wallet_without_panicking() {
        let balance = Balance::new("SPAM", Decimal::MAX).unwrap();
        let err = QuotedBalance::new(balance, dec!(2)).unwrap_err();
        assert!(matches!(err, Error::ValueOverflow { ref symbol } if symbol == "SPAM"));

        let wallet = Wallet::new(
            ProviderKind::Ethereum,
            Utc::now(),
            vec![
                Balance::new("SPAM", dec!(10000000000000000000000000)).unwrap(),
                Balance::new("ETH", dec!(1)).unwrap(),
            ],
        );
        let index = PriceIndex::new(
            "USD",
            HashMap::from([
                ("SPAM".to_string(), dec!(100000)),
                ("ETH".to_string(), dec!(3000)),
            ]),
        );
        let err = wallet.quote(&index).unwrap_err();
        assert_eq!(err.kind(), "valueOverflow");
    }

    #[test]
    fn test_total_overflow_is_reported() {
        // 4e28 twice exceeds Decimal::MAX (~7.9e28)
        let half = dec!(40000000000000000000000000000);
        let balances = vec![
            QuotedBalance::new(Balance::new("A", half).unwrap(), dec!(1)).unwrap(),
            QuotedBalance::new(Balance::new("B", half).unwrap(), dec!(1)).unwrap(),
        ];
        let err =
            QuotedWallet::new(ProviderKind::Binance, Utc::now(), "USD", balances).unwrap_err();
        assert!(matches!(err, Error::ValueOverflow { ref symbol } if symbol == "B"));
    }

    #[test]
    fn test_snapshot_serialization_shape() {
        let snapshot = WalletsSnapshot {
            currency: "USD".to_string(),
            data: vec![],
            skipped: vec![SkippedProvider {
                provider: ProviderKind::Celsius,
                reason: SkipReason::MissingCredentials {
                    missing_fields: vec!["partner_token"],
                },
            }],
            errors: vec![],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["skipped"][0]["provider"], "Celsius");
        assert_eq!(json["skipped"][0]["reason"]["kind"], "missingCredentials");
        assert_eq!(json["skipped"][0]["reason"]["missingFields"][0], "partner_token");
    }
}

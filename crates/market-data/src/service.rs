//! Price quote service.
//!
//! Turns a set of ticker symbols into a [`PriceIndex`] for one target
//! currency using exactly two batched provider calls: symbol to id
//! resolution, then latest quotes for the resolved ids.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::errors::MarketDataError;
use crate::models::{ProviderHealth, Quote};
use crate::provider::QuoteProvider;

/// Fiat symbols that custodial wallets report but quote services do not list.
pub const FIAT_SYMBOLS: &[&str] = &["USD", "EUR"];

/// Symbols known to be unresolvable by the quote service.
pub const UNRESOLVABLE_SYMBOLS: &[&str] = &["LDBNB"];

fn is_fiat(symbol: &str) -> bool {
    FIAT_SYMBOLS.contains(&symbol)
}

/// Symbol to price lookup for a single target currency.
///
/// Only quotes that passed the null-field filter are present. The index is
/// built per request and never cached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceIndex {
    currency: String,
    prices: HashMap<String, Decimal>,
}

impl PriceIndex {
    pub fn new(currency: impl Into<String>, prices: HashMap<String, Decimal>) -> Self {
        Self {
            currency: currency.into(),
            prices,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Price of one unit of `symbol` in the index currency.
    ///
    /// A fiat symbol equal to the index currency is worth exactly one.
    pub fn price_of(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        if symbol == self.currency && is_fiat(symbol) {
            return Ok(Decimal::ONE);
        }

        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::NoQuoteAvailable {
                symbol: symbol.to_string(),
            })
    }

    pub fn quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        Ok(Quote {
            symbol: symbol.to_string(),
            price: self.price_of(symbol)?,
            currency: self.currency.clone(),
        })
    }
}

/// Trait for price quote operations.
#[async_trait]
pub trait PriceQuoteServiceTrait: Send + Sync {
    /// Build a price index covering as many of `symbols` as the provider can
    /// price in `currency`.
    async fn price_index(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<PriceIndex, MarketDataError>;

    /// Health of the underlying quote provider.
    async fn health(&self) -> ProviderHealth;
}

/// Default [`PriceQuoteServiceTrait`] implementation over a [`QuoteProvider`].
pub struct PriceQuoteService {
    provider: Arc<dyn QuoteProvider>,
}

impl PriceQuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self { provider }
    }

    /// Symbols worth sending to the provider.
    fn quotable_symbols(symbols: &BTreeSet<String>) -> BTreeSet<String> {
        symbols
            .iter()
            .filter(|s| !is_fiat(s) && !UNRESOLVABLE_SYMBOLS.contains(&s.as_str()))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PriceQuoteServiceTrait for PriceQuoteService {
    async fn price_index(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<PriceIndex, MarketDataError> {
        let quotable = Self::quotable_symbols(symbols);
        if quotable.is_empty() {
            return Ok(PriceIndex::new(currency, HashMap::new()));
        }

        let identities = self.provider.resolve_asset_ids(&quotable).await?;
        let ids: BTreeSet<_> = identities.iter().map(|i| i.provider_asset_id).collect();
        let table = self.provider.latest_quotes(&ids, currency).await?;

        let mut prices = HashMap::with_capacity(identities.len());
        for identity in &identities {
            match table.get(&identity.provider_asset_id).and_then(|r| r.usable_price()) {
                Some(price) => {
                    prices.insert(identity.symbol.clone(), price);
                }
                None => debug!(
                    "Dropping {} ({}): no complete {} quote",
                    identity.symbol, identity.provider_asset_id, currency
                ),
            }
        }

        info!(
            "{} priced {}/{} symbols in {}",
            self.provider.id(),
            prices.len(),
            quotable.len(),
            currency
        );

        Ok(PriceIndex::new(currency, prices))
    }

    async fn health(&self) -> ProviderHealth {
        self.provider.health_check().await
    }
}

//! Quote provider trait definitions.
//!
//! This module defines the `QuoteProvider` trait that the price quote
//! service drives. A provider answers two batched questions: which asset ids
//! belong to these symbols, and what are the latest quotes for these ids.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AssetIdentity, ProviderAssetId, ProviderHealth, QuoteRecord};

/// Trait for quote providers.
///
/// Implementations must issue exactly one upstream request per call, however
/// many symbols or ids are passed in.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use coinfolio_market_data::provider::QuoteProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     // ... implement resolution, quotes and health
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in errors and logs.
    fn id(&self) -> &'static str;

    /// Resolve ticker symbols to provider asset ids in one batched call.
    ///
    /// Symbols the provider does not know are simply absent from the result.
    async fn resolve_asset_ids(
        &self,
        symbols: &BTreeSet<String>,
    ) -> Result<Vec<AssetIdentity>, MarketDataError>;

    /// Fetch the latest quotes for the given ids in one batched call.
    ///
    /// Returns an id-indexed table. Records whose target-currency quote has
    /// a null required field are returned with `complete == false`; the
    /// caller is responsible for discarding them.
    async fn latest_quotes(
        &self,
        ids: &BTreeSet<ProviderAssetId>,
        currency: &str,
    ) -> Result<HashMap<ProviderAssetId, QuoteRecord>, MarketDataError>;

    /// Report reachability, key validity and remaining quota.
    async fn health_check(&self) -> ProviderHealth;
}

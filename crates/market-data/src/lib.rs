//! Coinfolio Market Data Crate
//!
//! This crate prices crypto balances against an external quote service.
//!
//! # Overview
//!
//! ```text
//! symbols --> PriceQuoteService --> QuoteProvider::resolve_asset_ids  (1 call)
//!                    |          \-> QuoteProvider::latest_quotes      (1 call)
//!                    v
//!               PriceIndex  (symbol -> price, complete quotes only)
//! ```
//!
//! # Core Types
//!
//! - [`AssetIdentity`] - Symbol to provider asset id mapping
//! - [`QuoteRecord`] - One entry of the id-indexed quote table
//! - [`PriceIndex`] - Symbol to price lookup for one currency
//! - [`ProviderHealth`] - Reachability and quota status
//! - [`MarketDataError`] - Error type with retry classification

pub mod errors;
pub mod models;
pub mod provider;
pub mod service;

pub use errors::{MarketDataError, RetryClass, RetryPolicy, Retryable};
pub use models::{AssetIdentity, ProviderAssetId, ProviderHealth, Quote, QuoteRecord};
pub use provider::coinmarketcap::CoinMarketCapProvider;
pub use provider::QuoteProvider;
pub use service::{PriceIndex, PriceQuoteService, PriceQuoteServiceTrait};

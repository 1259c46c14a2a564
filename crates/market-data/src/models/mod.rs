//! Market data models
//!
//! This module contains the core data types for quoting:
//! - `asset` - Symbol to provider asset id mapping (AssetIdentity)
//! - `quote` - Raw quote records and validated quotes (QuoteRecord, Quote)
//! - `health` - Provider health status (ProviderHealth)

mod asset;
mod health;
mod quote;

pub use asset::{AssetIdentity, ProviderAssetId};
pub use health::ProviderHealth;
pub use quote::{Quote, QuoteRecord};

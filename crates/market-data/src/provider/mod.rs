//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that the price quote service drives
//! - The CoinMarketCap implementation

mod traits;

pub mod coinmarketcap;

pub use traits::QuoteProvider;

//! Wallet providers.
//!
//! Each provider knows one upstream's authentication protocol and response
//! shape and turns it into raw balance records:
//! - `binance` - Spot account snapshot, query-signed
//! - `kucoin` - Sub-account list, header-signed with passphrase
//! - `ethereum` - Native and ERC20 balances of one address via Amberdata
//! - `celsius` - Wallet balance map, static header auth

pub mod binance;
pub mod celsius;
pub mod ethereum;
pub mod http;
pub mod kucoin;
mod traits;

use std::sync::Arc;

pub use binance::BinanceProvider;
pub use celsius::CelsiusProvider;
pub use ethereum::EthereumProvider;
pub use http::ProviderHttp;
pub use kucoin::KucoinProvider;
pub use traits::{AccessCheck, WalletProvider};

use crate::config::CoreConfig;
use crate::credentials::ProviderKind;

/// The production provider instances built from one configuration.
pub struct ProviderSet {
    pub binance: Arc<BinanceProvider>,
    pub kucoin: Arc<KucoinProvider>,
    pub ethereum: Arc<EthereumProvider>,
    pub celsius: Arc<CelsiusProvider>,
}

impl ProviderSet {
    pub fn from_config(config: &CoreConfig) -> Self {
        let http = |kind: ProviderKind, base_url: &str| {
            ProviderHttp::new(kind, base_url, config.request_timeout, config.retry.clone())
        };
        let endpoints = &config.endpoints;

        Self {
            binance: Arc::new(BinanceProvider::new(http(
                ProviderKind::Binance,
                &endpoints.binance,
            ))),
            kucoin: Arc::new(KucoinProvider::new(http(
                ProviderKind::Kucoin,
                &endpoints.kucoin,
            ))),
            ethereum: Arc::new(EthereumProvider::new(http(
                ProviderKind::Ethereum,
                &endpoints.amberdata,
            ))),
            celsius: Arc::new(CelsiusProvider::new(http(
                ProviderKind::Celsius,
                &endpoints.celsius,
            ))),
        }
    }

    /// All providers as trait objects, in provider order.
    pub fn wallet_providers(&self) -> Vec<Arc<dyn WalletProvider>> {
        let binance: Arc<dyn WalletProvider> = self.binance.clone();
        let kucoin: Arc<dyn WalletProvider> = self.kucoin.clone();
        let ethereum: Arc<dyn WalletProvider> = self.ethereum.clone();
        let celsius: Arc<dyn WalletProvider> = self.celsius.clone();
        vec![binance, kucoin, ethereum, celsius]
    }
}

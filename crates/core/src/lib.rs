//! Coinfolio Core - Credentials, wallet providers and aggregation.
//!
//! This crate turns per-provider credentials into one priced snapshot of
//! every connected crypto wallet. Pricing is delegated to the
//! `coinfolio-market-data` crate.

pub mod config;
pub mod credentials;
pub mod errors;
pub mod health;
pub mod providers;
pub mod wallets;

pub use config::CoreConfig;
pub use credentials::{CredentialSettings, CredentialStatus, CredentialStatusChecker, ProviderKind};
pub use health::{HealthReport, HealthService};
pub use providers::ProviderSet;
pub use wallets::{WalletAggregator, WalletAggregatorTrait, WalletsSnapshot};

// Re-export error types
pub use errors::Error;
pub use errors::Result;

//! Wallet aggregation.
//!
//! ```text
//! CredentialResolver -> WalletProvider -> normalize -> PriceIndex -> QuotedWallet
//!                                                                        |
//!                                            WalletAggregator -> WalletsSnapshot
//! ```
//!
//! - **Models** (`model.rs`) - Balance, Wallet, QuotedWallet, WalletsSnapshot
//! - **Normalizer** (`normalizer.rs`) - Denylist, merge and positivity rules
//! - **Aggregator** (`aggregator.rs`) - Fan-out across providers under one deadline

pub mod aggregator;
pub mod model;
pub mod normalizer;


pub use aggregator::{WalletAggregator, WalletAggregatorTrait};
pub use model::{
    Balance, ProviderFailure, QuotedBalance, QuotedWallet, RawBalance, SkipReason,
    SkippedProvider, Wallet, WalletsSnapshot,
};
pub use normalizer::{from_smallest_unit, normalize, DEFAULT_TOKEN_DECIMALS};

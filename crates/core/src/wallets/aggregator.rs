use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use coinfolio_market_data::PriceQuoteServiceTrait;
use futures::future::join_all;
use log::{debug, info, warn};
use tokio::time::{timeout_at, Instant};

use super::model::{ProviderFailure, SkipReason, SkippedProvider, Wallet, WalletsSnapshot};
use crate::config::AggregationConfig;
use crate::credentials::{CredentialResolver, CredentialSettings};
use crate::errors::Error;
use crate::providers::WalletProvider;

/// Provider fetches stop at (N-1)/N of the deadline; the rest is the
/// price stage's.
const PRICE_STAGE_SHARE: u32 = 4;

/// Trait for wallet aggregation.
#[async_trait]
pub trait WalletAggregatorTrait: Send + Sync {
    /// Fetches, normalizes and prices every provider's wallet in `currency`.
    /// Never fails as a whole; per-provider outcomes are in the snapshot.
    async fn current_wallets(&self, currency: &str) -> WalletsSnapshot;

    fn default_currency(&self) -> &str;
}

/// Per-provider result of the fetch stage.
enum FetchOutcome {
    Fetched(Wallet),
    Skipped(SkipReason),
    Failed(Error),
}

pub struct WalletAggregator {
    providers: Vec<Arc<dyn WalletProvider>>,
    credentials: CredentialSettings,
    quotes: Arc<dyn PriceQuoteServiceTrait>,
    config: AggregationConfig,
}

impl WalletAggregator {
    pub fn new(
        mut providers: Vec<Arc<dyn WalletProvider>>,
        credentials: CredentialSettings,
        quotes: Arc<dyn PriceQuoteServiceTrait>,
        config: AggregationConfig,
    ) -> Self {
        providers.sort_by_key(|p| p.kind());
        Self {
            providers,
            credentials,
            quotes,
            config,
        }
    }

    async fn fetch(&self, provider: &dyn WalletProvider, deadline: Instant) -> FetchOutcome {
        let kind = provider.kind();
        let raw = self.credentials.for_provider(kind);

        let bundle = match CredentialResolver::resolve(kind, &raw) {
            Ok(bundle) => bundle,
            Err(Error::MissingCredentials { missing_fields, .. }) => {
                debug!("Skipping {}: missing {}", kind, missing_fields.join(", "));
                return FetchOutcome::Skipped(SkipReason::MissingCredentials { missing_fields });
            }
            Err(e) => return FetchOutcome::Failed(e),
        };

        match timeout_at(deadline, provider.fetch_balances(&bundle)).await {
            Ok(Ok(balances)) => {
                debug!("{} returned {} balances", kind, balances.len());
                FetchOutcome::Fetched(Wallet::new(kind, Utc::now(), balances))
            }
            Ok(Err(e)) => {
                warn!("Failed to fetch {} wallet: {}", kind, e);
                FetchOutcome::Failed(e)
            }
            Err(_) => {
                warn!("{} did not answer before the aggregation deadline", kind);
                FetchOutcome::Skipped(SkipReason::DeadlineExceeded)
            }
        }
    }
}

#[async_trait]
impl WalletAggregatorTrait for WalletAggregator {
    async fn current_wallets(&self, currency: &str) -> WalletsSnapshot {
        let deadline = Instant::now() + self.config.deadline;
        let fetch_deadline = deadline - self.config.deadline / PRICE_STAGE_SHARE;

        let outcomes = join_all(self.providers.iter().map(|p| async move {
            (p.kind(), self.fetch(p.as_ref(), fetch_deadline).await)
        }))
        .await;

        let mut snapshot = WalletsSnapshot {
            currency: currency.to_string(),
            ..WalletsSnapshot::default()
        };
        let mut fetched: Vec<Wallet> = Vec::new();

        for (provider, outcome) in outcomes {
            match outcome {
                FetchOutcome::Fetched(wallet) => fetched.push(wallet),
                FetchOutcome::Skipped(reason) => {
                    snapshot.skipped.push(SkippedProvider { provider, reason })
                }
                FetchOutcome::Failed(e) => snapshot.errors.push(ProviderFailure::new(provider, &e)),
            }
        }

        if fetched.is_empty() {
            return snapshot;
        }

        // One price index for the union of all symbols.
        let symbols: BTreeSet<String> = fetched
            .iter()
            .flat_map(|w| w.balances.iter().map(|b| b.symbol().to_string()))
            .collect();

        match timeout_at(deadline, self.quotes.price_index(&symbols, currency)).await {
            Ok(Ok(index)) => {
                for wallet in fetched {
                    let provider = wallet.provider;
                    match wallet.quote(&index) {
                        Ok(quoted) => snapshot.data.push(quoted),
                        Err(e) => {
                            warn!("Failed to quote {} wallet: {}", provider, e);
                            snapshot.errors.push(ProviderFailure::new(provider, &e));
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                let error = Error::from(e);
                warn!("Price lookup failed: {}", error);
                for wallet in fetched {
                    snapshot
                        .errors
                        .push(ProviderFailure::new(wallet.provider, &error));
                }
            }
            Err(_) => {
                warn!("Price lookup did not finish before the aggregation deadline");
                for wallet in fetched {
                    snapshot.skipped.push(SkippedProvider {
                        provider: wallet.provider,
                        reason: SkipReason::DeadlineExceeded,
                    });
                }
            }
        }

        snapshot.skipped.sort_by_key(|s| s.provider);
        snapshot.errors.sort_by_key(|f| f.provider);

        info!(
            "Aggregated {} wallets in {} ({} skipped, {} failed)",
            snapshot.data.len(),
            currency,
            snapshot.skipped.len(),
            snapshot.errors.len()
        );
        snapshot
    }

    fn default_currency(&self) -> &str {
        &self.config.default_currency
    }
}
